use async_graphql::{ComplexObject, Context, Result, SimpleObject, dataloader::DataLoader};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::graphql::loaders::{CustomerLoader, CustomerOrdersLoader, OrderProductsLoader};

#[derive(Debug, Clone, PartialEq, SimpleObject)]
#[graphql(complex)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[ComplexObject]
impl Customer {
    /// Orders placed by this customer.
    async fn orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        let loader = ctx.data::<DataLoader<CustomerOrdersLoader>>()?;
        Ok(loader.load_one(self.id).await?.unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, SimpleObject)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, PartialEq, SimpleObject)]
#[graphql(complex)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
}

#[ComplexObject]
impl Order {
    async fn customer(&self, ctx: &Context<'_>) -> Result<Option<Customer>> {
        let loader = ctx.data::<DataLoader<CustomerLoader>>()?;
        Ok(loader.load_one(self.customer_id).await?)
    }

    /// Products by name. A product listed twice in the order appears once.
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        let loader = ctx.data::<DataLoader<OrderProductsLoader>>()?;
        Ok(loader.load_one(self.id).await?.unwrap_or_default())
    }
}
