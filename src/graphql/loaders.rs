//! Batch loaders for the relation fields.
//!
//! Each resolver asks its loader for one parent id. Requests made while the
//! same response is being resolved are collected and answered by a single
//! `IN (...)` query, so a list of N orders costs one query per relation
//! instead of one per row.

use std::{collections::HashMap, sync::Arc};

use async_graphql::dataloader::Loader;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Customer, Order, Product},
    services::{customer_service, order_service, product_service},
    state::AppState,
};

/// Customer by id.
pub struct CustomerLoader {
    state: AppState,
}

impl CustomerLoader {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl Loader<Uuid> for CustomerLoader {
    type Value = Customer;
    type Error = Arc<AppError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Customer>, Self::Error> {
        tracing::debug!(count = keys.len(), "batch loading customers");
        customer_service::customers_by_ids(&self.state, keys)
            .await
            .map_err(Arc::new)
    }
}

/// Orders keyed by the customer that placed them.
pub struct CustomerOrdersLoader {
    state: AppState,
}

impl CustomerOrdersLoader {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl Loader<Uuid> for CustomerOrdersLoader {
    type Value = Vec<Order>;
    type Error = Arc<AppError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Vec<Order>>, Self::Error> {
        tracing::debug!(count = keys.len(), "batch loading orders by customer");
        order_service::orders_for_customers(&self.state, keys)
            .await
            .map_err(Arc::new)
    }
}

/// Products keyed by the order that lists them.
pub struct OrderProductsLoader {
    state: AppState,
}

impl OrderProductsLoader {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl Loader<Uuid> for OrderProductsLoader {
    type Value = Vec<Product>;
    type Error = Arc<AppError>;

    async fn load(&self, keys: &[Uuid]) -> Result<HashMap<Uuid, Vec<Product>>, Self::Error> {
        tracing::debug!(count = keys.len(), "batch loading products by order");
        product_service::products_for_orders(&self.state, keys)
            .await
            .map_err(Arc::new)
    }
}
