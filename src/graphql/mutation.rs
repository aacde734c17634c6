use async_graphql::{Context, Object, Result};

use crate::{
    dto::{
        customers::{BulkCreateCustomersPayload, CreateCustomerPayload, CustomerInput},
        orders::{CreateOrderPayload, OrderInput},
        products::{CreateProductPayload, ProductInput},
    },
    services::{customer_service, order_service, product_service},
    state::AppState,
};

/// Write operations. Validation problems come back in the payload with
/// `success: false`; only a missing context surfaces as a GraphQL error.
#[derive(Debug, Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_customer(
        &self,
        ctx: &Context<'_>,
        input: CustomerInput,
    ) -> Result<CreateCustomerPayload> {
        let state = ctx.data::<AppState>()?;
        Ok(customer_service::create_customer(state, input).await)
    }

    async fn bulk_create_customers(
        &self,
        ctx: &Context<'_>,
        input: Vec<CustomerInput>,
    ) -> Result<BulkCreateCustomersPayload> {
        let state = ctx.data::<AppState>()?;
        Ok(customer_service::bulk_create_customers(state, input).await)
    }

    async fn create_product(
        &self,
        ctx: &Context<'_>,
        input: ProductInput,
    ) -> Result<CreateProductPayload> {
        let state = ctx.data::<AppState>()?;
        Ok(product_service::create_product(state, input).await)
    }

    async fn create_order(&self, ctx: &Context<'_>, input: OrderInput) -> Result<CreateOrderPayload> {
        let state = ctx.data::<AppState>()?;
        Ok(order_service::create_order(state, input).await)
    }
}
