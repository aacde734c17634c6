use async_graphql::{InputObject, SimpleObject};
use rust_decimal::Decimal;

use crate::models::Product;

#[derive(Debug, Clone, InputObject)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    #[graphql(default = 0)]
    pub stock: i32,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CreateProductPayload {
    pub product: Option<Product>,
    pub message: String,
    pub success: bool,
}

impl CreateProductPayload {
    pub fn created(product: Product) -> Self {
        Self {
            product: Some(product),
            message: "Product created successfully".into(),
            success: true,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            product: None,
            message: message.into(),
            success: false,
        }
    }
}
