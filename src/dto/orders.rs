use async_graphql::{ID, InputObject, SimpleObject};
use chrono::{DateTime, Utc};

use crate::models::Order;

#[derive(Debug, Clone, InputObject)]
pub struct OrderInput {
    pub customer_id: ID,
    pub product_ids: Vec<ID>,
    /// Overrides the default of "now".
    pub order_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CreateOrderPayload {
    pub order: Option<Order>,
    pub message: String,
    pub success: bool,
}

impl CreateOrderPayload {
    pub fn created(order: Order) -> Self {
        Self {
            order: Some(order),
            message: "Order created successfully".into(),
            success: true,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            order: None,
            message: message.into(),
            success: false,
        }
    }
}
