#![allow(dead_code)]

use std::str::FromStr;

use async_graphql::ID;
use crm_graphql_api::{
    db::run_migrations,
    dto::{customers::CustomerInput, orders::OrderInput, products::ProductInput},
    graphql::{CrmSchema, build_schema},
    models::{Customer, Order, Product},
    services::{customer_service, order_service, product_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};

/// Fresh, migrated in-memory database. One connection, so every query sees
/// the same database.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options).await?;
    run_migrations(&orm).await?;
    Ok(AppState { orm })
}

pub fn schema(state: &AppState) -> CrmSchema {
    build_schema(state.clone(), 10)
}

/// Run a document and return its `data` as JSON, failing on GraphQL errors.
pub async fn execute(schema: &CrmSchema, query: &str) -> serde_json::Value {
    let response = schema.execute(query).await;
    assert!(response.errors.is_empty(), "graphql errors: {:?}", response.errors);
    response.data.into_json().expect("response data is JSON")
}

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("valid decimal")
}

pub fn customer_input(name: &str, email: &str, phone: Option<&str>) -> CustomerInput {
    CustomerInput {
        name: name.into(),
        email: email.into(),
        phone: phone.map(str::to_owned),
    }
}

pub async fn seed_customer(state: &AppState, name: &str, email: &str, phone: Option<&str>) -> Customer {
    let payload = customer_service::create_customer(state, customer_input(name, email, phone)).await;
    assert!(payload.success, "seed customer failed: {}", payload.message);
    payload.customer.expect("created customer")
}

pub async fn seed_product(state: &AppState, name: &str, price: &str, stock: i32) -> Product {
    let payload = product_service::create_product(
        state,
        ProductInput {
            name: name.into(),
            price: dec(price),
            stock,
        },
    )
    .await;
    assert!(payload.success, "seed product failed: {}", payload.message);
    payload.product.expect("created product")
}

pub fn order_input(customer: &Customer, products: &[&Product]) -> OrderInput {
    OrderInput {
        customer_id: ID(customer.id.to_string()),
        product_ids: products.iter().map(|p| ID(p.id.to_string())).collect(),
        order_date: None,
    }
}

pub async fn seed_order(state: &AppState, customer: &Customer, products: &[&Product]) -> Order {
    let payload = order_service::create_order(state, order_input(customer, products)).await;
    assert!(payload.success, "seed order failed: {}", payload.message);
    payload.order.expect("created order")
}
