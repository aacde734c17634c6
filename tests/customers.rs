mod common;

use common::{customer_input, seed_customer, setup_state};
use crm_graphql_api::{
    filters::CustomerFilter,
    services::customer_service,
};
use pretty_assertions::assert_eq;
use sea_orm::ConnectionTrait;

#[tokio::test]
async fn duplicate_email_is_rejected_without_writing() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed_customer(&state, "Alice Johnson", "alice@example.com", Some("+1234567890")).await;

    let payload = customer_service::create_customer(
        &state,
        customer_input("Alice Again", "alice@example.com", None),
    )
    .await;

    assert!(!payload.success);
    assert!(payload.customer.is_none());
    assert_eq!(payload.message, "Email already exists");

    let all = customer_service::list_customers(&state, &CustomerFilter::default(), None).await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Alice Johnson");
    Ok(())
}

#[tokio::test]
async fn phone_formats() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let ok_plus = customer_service::create_customer(
        &state,
        customer_input("Plus", "plus@example.com", Some("+1234567890")),
    )
    .await;
    assert!(ok_plus.success, "{}", ok_plus.message);
    assert_eq!(ok_plus.message, "Customer created successfully");

    let ok_dashed = customer_service::create_customer(
        &state,
        customer_input("Dashed", "dashed@example.com", Some("123-456-7890")),
    )
    .await;
    assert!(ok_dashed.success, "{}", ok_dashed.message);
    assert_eq!(
        ok_dashed.customer.and_then(|c| c.phone).as_deref(),
        Some("123-456-7890")
    );

    let bad = customer_service::create_customer(
        &state,
        customer_input("Bad", "bad@example.com", Some("invalid-format")),
    )
    .await;
    assert!(!bad.success);
    assert_eq!(
        bad.message,
        "Invalid phone format. Use +1234567890 or 123-456-7890"
    );

    let no_phone = customer_service::create_customer(
        &state,
        customer_input("Quiet", "quiet@example.com", Some("")),
    )
    .await;
    assert!(no_phone.success);
    assert_eq!(no_phone.customer.and_then(|c| c.phone), None);

    let all = customer_service::list_customers(&state, &CustomerFilter::default(), None).await?;
    assert_eq!(all.len(), 3);
    Ok(())
}

#[tokio::test]
async fn bulk_create_tolerates_bad_items() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed_customer(&state, "Existing", "taken@example.com", None).await;

    let payload = customer_service::bulk_create_customers(
        &state,
        vec![
            customer_input("Fresh", "fresh@example.com", Some("123-456-7890")),
            customer_input("Dup", "taken@example.com", None),
        ],
    )
    .await;

    assert!(payload.success);
    assert_eq!(payload.customers.len(), 1);
    assert_eq!(payload.customers[0].email, "fresh@example.com");
    assert_eq!(payload.errors.len(), 1);
    assert_eq!(payload.errors[0].email, "taken@example.com");
    assert_eq!(payload.errors[0].message, "Email already exists");

    // The successful item was committed.
    let fresh = customer_service::get_customer(&state, &payload.customers[0].id.to_string()).await?;
    assert!(fresh.is_some());
    Ok(())
}

#[tokio::test]
async fn bulk_create_sees_earlier_items_in_the_same_batch() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let payload = customer_service::bulk_create_customers(
        &state,
        vec![
            customer_input("One", "same@example.com", None),
            customer_input("Two", "same@example.com", None),
            customer_input("Three", "three@example.com", Some("nope")),
        ],
    )
    .await;

    assert!(payload.success);
    assert_eq!(payload.customers.len(), 1);
    assert_eq!(payload.customers[0].name, "One");
    let messages: Vec<&str> = payload.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["Email already exists", "Invalid phone format"]);
    Ok(())
}

#[tokio::test]
async fn bulk_create_with_only_failures_reports_failure() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let payload = customer_service::bulk_create_customers(
        &state,
        vec![customer_input("Bad", "bad@example.com", Some("12"))],
    )
    .await;

    assert!(!payload.success);
    assert!(payload.customers.is_empty());
    assert_eq!(payload.errors.len(), 1);
    Ok(())
}

#[tokio::test]
async fn get_by_id_is_stable_and_absent_ids_are_none() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let customer = seed_customer(&state, "Bob Smith", "bob@example.com", None).await;
    let id = customer.id.to_string();

    let first = customer_service::get_customer(&state, &id).await?;
    let second = customer_service::get_customer(&state, &id).await?;
    assert_eq!(first, second);
    assert_eq!(first.map(|c| c.email), Some("bob@example.com".to_string()));

    assert_eq!(
        customer_service::get_customer(&state, &uuid::Uuid::new_v4().to_string()).await?,
        None
    );
    assert_eq!(customer_service::get_customer(&state, "42").await?, None);
    Ok(())
}

#[tokio::test]
async fn filters_by_name_email_phone_prefix_and_dates() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed_customer(&state, "Alice Johnson", "alice@example.com", Some("+1234567890")).await;
    seed_customer(&state, "Bob Smith", "bob@work.org", Some("123-456-7890")).await;
    seed_customer(&state, "Carol Williams", "carol@example.com", Some("+9876543210")).await;

    let names = |customers: Vec<crm_graphql_api::models::Customer>| {
        let mut names: Vec<String> = customers.into_iter().map(|c| c.name).collect();
        names.sort();
        names
    };

    let by_name = CustomerFilter {
        name: Some("ALI".into()),
        ..Default::default()
    };
    assert_eq!(
        names(customer_service::list_customers(&state, &by_name, None).await?),
        vec!["Alice Johnson"]
    );

    let by_email = CustomerFilter {
        email: Some("Example.COM".into()),
        ..Default::default()
    };
    assert_eq!(
        names(customer_service::list_customers(&state, &by_email, None).await?),
        vec!["Alice Johnson", "Carol Williams"]
    );

    let by_phone = CustomerFilter {
        phone_pattern: Some("+1".into()),
        ..Default::default()
    };
    assert_eq!(
        names(customer_service::list_customers(&state, &by_phone, None).await?),
        vec!["Alice Johnson"]
    );

    let long_ago = chrono::DateTime::parse_from_rfc3339("2000-01-01T00:00:00Z")?.to_utc();
    let since = CustomerFilter {
        created_at_gte: Some(long_ago),
        ..Default::default()
    };
    assert_eq!(
        customer_service::list_customers(&state, &since, None).await?.len(),
        3
    );
    let before = CustomerFilter {
        created_at_lte: Some(long_ago),
        ..Default::default()
    };
    assert!(customer_service::list_customers(&state, &before, None).await?.is_empty());

    let combined = CustomerFilter {
        email: Some("example".into()),
        phone_pattern: Some("+9".into()),
        ..Default::default()
    };
    assert_eq!(
        names(customer_service::list_customers(&state, &combined, None).await?),
        vec!["Carol Williams"]
    );
    Ok(())
}

#[tokio::test]
async fn like_wildcards_match_literally() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed_customer(&state, "100% Real", "real@example.com", None).await;
    seed_customer(&state, "1000 Fake", "fake@example.com", None).await;

    let filter = CustomerFilter {
        name: Some("100%".into()),
        ..Default::default()
    };
    let found = customer_service::list_customers(&state, &filter, None).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "100% Real");
    Ok(())
}

#[tokio::test]
async fn orders_by_name_in_both_directions() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed_customer(&state, "Bob", "bob@example.com", None).await;
    seed_customer(&state, "Carol", "carol@example.com", None).await;
    seed_customer(&state, "Alice", "alice@example.com", None).await;

    let filter = CustomerFilter::default();
    let asc: Vec<String> = customer_service::list_customers(&state, &filter, Some("name"))
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(asc, vec!["Alice", "Bob", "Carol"]);

    let desc: Vec<String> = customer_service::list_customers(&state, &filter, Some("-name"))
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(desc, vec!["Carol", "Bob", "Alice"]);
    Ok(())
}

// Rejects one address inside the store, after the service checks have passed.
const BLOCK_EMAIL_TRIGGER: &str = "CREATE TRIGGER block_email BEFORE INSERT ON customers \
     WHEN NEW.email = 'blocked@example.com' \
     BEGIN SELECT RAISE(ABORT, 'address is blocked'); END";

// The pre-check compares emails exactly; this index also catches case variants.
const CASE_INSENSITIVE_EMAIL_INDEX: &str =
    "CREATE UNIQUE INDEX customers_email_lower ON customers (lower(email))";

async fn stored_emails(state: &crm_graphql_api::state::AppState) -> anyhow::Result<Vec<String>> {
    let mut emails: Vec<String> =
        customer_service::list_customers(state, &CustomerFilter::default(), None)
            .await?
            .into_iter()
            .map(|c| c.email)
            .collect();
    emails.sort();
    Ok(emails)
}

#[tokio::test]
async fn store_failure_on_insert_reports_the_store_message() -> anyhow::Result<()> {
    let state = setup_state().await?;
    state.orm.execute_unprepared(BLOCK_EMAIL_TRIGGER).await?;

    let payload = customer_service::create_customer(
        &state,
        customer_input("Blocked", "blocked@example.com", None),
    )
    .await;
    assert!(!payload.success);
    assert!(payload.customer.is_none());
    assert!(payload.message.contains("address is blocked"), "{}", payload.message);
    assert!(stored_emails(&state).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unique_violation_from_the_store_reads_as_duplicate_email() -> anyhow::Result<()> {
    let state = setup_state().await?;
    state.orm.execute_unprepared(CASE_INSENSITIVE_EMAIL_INDEX).await?;
    seed_customer(&state, "Alice", "alice@example.com", None).await;

    let payload = customer_service::create_customer(
        &state,
        customer_input("Shouting Alice", "ALICE@example.com", None),
    )
    .await;
    assert!(!payload.success);
    assert_eq!(payload.message, "Email already exists");
    assert_eq!(stored_emails(&state).await?, vec!["alice@example.com"]);
    Ok(())
}

#[tokio::test]
async fn bulk_item_failing_in_the_store_rolls_back_alone() -> anyhow::Result<()> {
    let state = setup_state().await?;
    state.orm.execute_unprepared(BLOCK_EMAIL_TRIGGER).await?;
    state.orm.execute_unprepared(CASE_INSENSITIVE_EMAIL_INDEX).await?;
    seed_customer(&state, "Alice", "alice@example.com", None).await;

    let payload = customer_service::bulk_create_customers(
        &state,
        vec![
            customer_input("First", "first@example.com", None),
            customer_input("Blocked", "blocked@example.com", None),
            customer_input("Shouting Alice", "ALICE@example.com", None),
            customer_input("Last", "last@example.com", Some("123-456-7890")),
        ],
    )
    .await;

    assert!(payload.success);
    let created: Vec<&str> = payload.customers.iter().map(|c| c.email.as_str()).collect();
    assert_eq!(created, vec!["first@example.com", "last@example.com"]);

    assert_eq!(payload.errors.len(), 2);
    assert_eq!(payload.errors[0].email, "blocked@example.com");
    assert!(
        payload.errors[0].message.contains("address is blocked"),
        "{}",
        payload.errors[0].message
    );
    assert_eq!(payload.errors[1].email, "ALICE@example.com");
    assert_eq!(payload.errors[1].message, "Email already exists");

    assert_eq!(
        stored_emails(&state).await?,
        vec!["alice@example.com", "first@example.com", "last@example.com"]
    );
    Ok(())
}

#[tokio::test]
async fn name_match_folds_ascii_case() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed_customer(&state, "ALICE JOHNSON", "alice@example.com", None).await;

    let filter = CustomerFilter {
        name: Some("alice j".into()),
        ..Default::default()
    };
    let found = customer_service::list_customers(&state, &filter, None).await?;
    assert_eq!(found.len(), 1);
    Ok(())
}
