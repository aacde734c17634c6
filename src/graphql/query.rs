use async_graphql::{Context, ID, Json, Object, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::{
    filters::{CustomerFilter, FilterSet, IdArg, OrderFilter, ProductFilter},
    models::{Customer, Order, Product},
    params::Pagination,
    services::{customer_service, order_service, product_service},
    state::AppState,
};

use super::connection::{CustomerConnection, OrderConnection, ProductConnection};

/// Loosely named filter arguments for the connection queries.
type FilterArgs = Json<Map<String, Value>>;

#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn hello(&self) -> &'static str {
        "Hello, GraphQL!"
    }

    /// Customers matching every given filter. `orderBy` takes a field name,
    /// prefixed with `-` for descending.
    #[allow(clippy::too_many_arguments)]
    async fn all_customers(
        &self,
        ctx: &Context<'_>,
        name: Option<String>,
        email: Option<String>,
        created_at_gte: Option<DateTime<Utc>>,
        created_at_lte: Option<DateTime<Utc>>,
        phone_pattern: Option<String>,
        order_by: Option<String>,
    ) -> Result<Vec<Customer>> {
        let state = ctx.data::<AppState>()?;
        let filter = CustomerFilter {
            name,
            email,
            created_at_gte,
            created_at_lte,
            phone_pattern,
        };
        Ok(customer_service::list_customers(state, &filter, order_by.as_deref()).await?)
    }

    #[allow(clippy::too_many_arguments)]
    async fn all_products(
        &self,
        ctx: &Context<'_>,
        name: Option<String>,
        price_gte: Option<Decimal>,
        price_lte: Option<Decimal>,
        stock_gte: Option<i32>,
        stock_lte: Option<i32>,
        stock: Option<i32>,
        low_stock: Option<bool>,
        order_by: Option<String>,
    ) -> Result<Vec<Product>> {
        let state = ctx.data::<AppState>()?;
        let filter = ProductFilter {
            name,
            price_gte,
            price_lte,
            stock_gte,
            stock_lte,
            stock,
            low_stock,
        };
        Ok(product_service::list_products(state, &filter, order_by.as_deref()).await?)
    }

    #[allow(clippy::too_many_arguments)]
    async fn all_orders(
        &self,
        ctx: &Context<'_>,
        total_amount_gte: Option<Decimal>,
        total_amount_lte: Option<Decimal>,
        order_date_gte: Option<DateTime<Utc>>,
        order_date_lte: Option<DateTime<Utc>>,
        customer_name: Option<String>,
        product_name: Option<String>,
        product_id: Option<ID>,
        order_by: Option<String>,
    ) -> Result<Vec<Order>> {
        let state = ctx.data::<AppState>()?;
        let product_id = product_id.map(|raw| IdArg::parse(&raw));
        let filter = OrderFilter {
            total_amount_gte,
            total_amount_lte,
            order_date_gte,
            order_date_lte,
            customer_name,
            product_name,
            product_id,
        };
        Ok(order_service::list_orders(state, &filter, order_by.as_deref()).await?)
    }

    /// `null` when no customer has this id.
    async fn customer(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Customer>> {
        let state = ctx.data::<AppState>()?;
        Ok(customer_service::get_customer(state, &id).await?)
    }

    async fn product(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Product>> {
        let state = ctx.data::<AppState>()?;
        Ok(product_service::get_product(state, &id).await?)
    }

    async fn order(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Order>> {
        let state = ctx.data::<AppState>()?;
        Ok(order_service::get_order(state, &id).await?)
    }

    /// Paginated customers. `filter` is a flat object of filter arguments;
    /// unrecognised keys are ignored.
    async fn customers(
        &self,
        ctx: &Context<'_>,
        filter: Option<FilterArgs>,
        order_by: Option<String>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<CustomerConnection> {
        let state = ctx.data::<AppState>()?;
        let filter = filter
            .map(|Json(args)| CustomerFilter::from_args(&args))
            .unwrap_or_default();
        let page = customer_service::page_customers(
            state,
            &filter,
            order_by.as_deref(),
            &Pagination { first, after },
        )
        .await?;
        Ok(page.into())
    }

    async fn products(
        &self,
        ctx: &Context<'_>,
        filter: Option<FilterArgs>,
        order_by: Option<String>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<ProductConnection> {
        let state = ctx.data::<AppState>()?;
        let filter = filter
            .map(|Json(args)| ProductFilter::from_args(&args))
            .unwrap_or_default();
        let page = product_service::page_products(
            state,
            &filter,
            order_by.as_deref(),
            &Pagination { first, after },
        )
        .await?;
        Ok(page.into())
    }

    async fn orders(
        &self,
        ctx: &Context<'_>,
        filter: Option<FilterArgs>,
        order_by: Option<String>,
        first: Option<i32>,
        after: Option<String>,
    ) -> Result<OrderConnection> {
        let state = ctx.data::<AppState>()?;
        let filter = filter
            .map(|Json(args)| OrderFilter::from_args(&args))
            .unwrap_or_default();
        let page = order_service::page_orders(
            state,
            &filter,
            order_by.as_deref(),
            &Pagination { first, after },
        )
        .await?;
        Ok(page.into())
    }
}
