use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::customers::{
        BulkCreateCustomersPayload, CreateCustomerPayload, CustomerError, CustomerInput,
    },
    entity::customers::{ActiveModel, Column as CustomerCol, Entity as Customers, Model as CustomerModel},
    error::AppResult,
    filters::{CustomerFilter, FilterSet},
    models::Customer,
    params::{Page, Pagination},
    services::{
        parse_id,
        validation::{
            EMAIL_EXISTS, INVALID_PHONE, INVALID_PHONE_SHORT, customer_write_error, email_exists,
            validate_phone,
        },
    },
    state::AppState,
};

pub async fn list_customers(
    state: &AppState,
    filter: &CustomerFilter,
    order_by: Option<&str>,
) -> AppResult<Vec<Customer>> {
    let items = filter
        .select(order_by)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();
    Ok(items)
}

pub async fn page_customers(
    state: &AppState,
    filter: &CustomerFilter,
    order_by: Option<&str>,
    pagination: &Pagination,
) -> AppResult<Page<Customer>> {
    let (offset, limit) = pagination.normalize()?;
    let finder = filter.select(order_by);
    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(customer_from_entity)
        .collect();

    Ok(Page {
        items,
        offset,
        total,
    })
}

/// Look up by an external id. Malformed ids simply find nothing.
pub async fn get_customer(state: &AppState, id: &str) -> AppResult<Option<Customer>> {
    match parse_id(id) {
        Some(id) => find_customer(state, id).await,
        None => Ok(None),
    }
}

pub async fn find_customer(state: &AppState, id: Uuid) -> AppResult<Option<Customer>> {
    let customer = Customers::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(customer_from_entity);
    Ok(customer)
}

/// Customers by id in one query. Unknown ids are absent from the map.
pub async fn customers_by_ids(
    state: &AppState,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Customer>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let customers = Customers::find()
        .filter(CustomerCol::Id.is_in(ids.iter().copied()))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| (model.id, customer_from_entity(model)))
        .collect();
    Ok(customers)
}

pub async fn create_customer(state: &AppState, input: CustomerInput) -> CreateCustomerPayload {
    let phone = input.phone.filter(|p| !p.is_empty());

    match email_exists(&state.orm, &input.email).await {
        Ok(false) => {}
        Ok(true) => {
            tracing::debug!(email = %input.email, "customer rejected: duplicate email");
            return CreateCustomerPayload::failed(EMAIL_EXISTS);
        }
        Err(err) => {
            tracing::warn!(error = %err, "email lookup failed");
            return CreateCustomerPayload::failed(err.to_string());
        }
    }

    if !validate_phone(phone.as_deref()) {
        tracing::debug!(email = %input.email, "customer rejected: bad phone");
        return CreateCustomerPayload::failed(INVALID_PHONE);
    }

    match insert_customer(&state.orm, input.name, input.email, phone).await {
        Ok(model) => {
            tracing::info!(customer_id = %model.id, "customer created");
            CreateCustomerPayload::created(customer_from_entity(model))
        }
        Err(err) => {
            tracing::warn!(error = %err, "customer insert failed");
            CreateCustomerPayload::failed(customer_write_error(&err))
        }
    }
}

/// Create many customers in one transaction.
///
/// Items are validated independently and each insert runs in its own
/// savepoint, so a bad item is reported in `errors` without undoing the
/// others. The transaction commits whatever succeeded.
pub async fn bulk_create_customers(
    state: &AppState,
    inputs: Vec<CustomerInput>,
) -> BulkCreateCustomersPayload {
    let txn = match state.orm.begin().await {
        Ok(txn) => txn,
        Err(err) => {
            tracing::warn!(error = %err, "bulk create could not start a transaction");
            return bulk_aborted(&inputs, &err);
        }
    };

    let mut created = Vec::new();
    let mut errors = Vec::new();

    for input in &inputs {
        let phone = input.phone.clone().filter(|p| !p.is_empty());

        match email_exists(&txn, &input.email).await {
            Ok(false) => {}
            Ok(true) => {
                errors.push(item_error(input, EMAIL_EXISTS));
                continue;
            }
            Err(err) => {
                errors.push(item_error(input, err.to_string()));
                continue;
            }
        }

        if !validate_phone(phone.as_deref()) {
            errors.push(item_error(input, INVALID_PHONE_SHORT));
            continue;
        }

        let savepoint = match txn.begin().await {
            Ok(sp) => sp,
            Err(err) => {
                errors.push(item_error(input, err.to_string()));
                continue;
            }
        };

        let inserted =
            insert_customer(&savepoint, input.name.clone(), input.email.clone(), phone).await;
        match inserted {
            Ok(model) => match savepoint.commit().await {
                Ok(()) => created.push(customer_from_entity(model)),
                Err(err) => errors.push(item_error(input, err.to_string())),
            },
            Err(err) => {
                if let Err(rollback_err) = savepoint.rollback().await {
                    tracing::warn!(error = %rollback_err, "savepoint rollback failed");
                }
                errors.push(item_error(input, customer_write_error(&err)));
            }
        }
    }

    if let Err(err) = txn.commit().await {
        tracing::warn!(error = %err, "bulk create commit failed");
        return bulk_aborted(&inputs, &err);
    }

    tracing::info!(
        created = created.len(),
        rejected = errors.len(),
        "bulk customer create finished"
    );

    BulkCreateCustomersPayload {
        success: !created.is_empty(),
        customers: created,
        errors,
    }
}

async fn insert_customer<C: ConnectionTrait>(
    conn: &C,
    name: String,
    email: String,
    phone: Option<String>,
) -> Result<CustomerModel, DbErr> {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
}

fn item_error(input: &CustomerInput, message: impl Into<String>) -> CustomerError {
    CustomerError {
        email: input.email.clone(),
        message: message.into(),
    }
}

fn bulk_aborted(inputs: &[CustomerInput], err: &DbErr) -> BulkCreateCustomersPayload {
    BulkCreateCustomersPayload {
        customers: Vec::new(),
        errors: inputs
            .iter()
            .map(|input| item_error(input, err.to_string()))
            .collect(),
        success: false,
    }
}

pub(crate) fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        created_at: model.created_at,
    }
}
