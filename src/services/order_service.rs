use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderPayload, OrderInput},
    entity::{
        Customers, OrderProducts, Products,
        order_products::ActiveModel as OrderProductActive,
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Model as ProductModel,
    },
    error::AppResult,
    filters::{FilterSet, OrderFilter},
    models::Order,
    params::{Page, Pagination},
    services::{
        parse_id,
        validation::{NO_PRODUCTS, money},
    },
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    filter: &OrderFilter,
    order_by: Option<&str>,
) -> AppResult<Vec<Order>> {
    let items = filter
        .select(order_by)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();
    Ok(items)
}

pub async fn page_orders(
    state: &AppState,
    filter: &OrderFilter,
    order_by: Option<&str>,
    pagination: &Pagination,
) -> AppResult<Page<Order>> {
    let (offset, limit) = pagination.normalize()?;
    let finder = filter.select(order_by);
    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(Page {
        items,
        offset,
        total,
    })
}

pub async fn get_order(state: &AppState, id: &str) -> AppResult<Option<Order>> {
    let Some(id) = parse_id(id) else {
        return Ok(None);
    };
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(order_from_entity);
    Ok(order)
}

pub async fn orders_for_customer(state: &AppState, customer_id: Uuid) -> AppResult<Vec<Order>> {
    let mut grouped = orders_for_customers(state, &[customer_id]).await?;
    Ok(grouped.remove(&customer_id).unwrap_or_default())
}

/// Orders of many customers in one query, grouped by customer id and sorted
/// by date within each group.
pub async fn orders_for_customers(
    state: &AppState,
    customer_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<Order>>> {
    if customer_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = Orders::find()
        .filter(OrderCol::CustomerId.is_in(customer_ids.iter().copied()))
        .order_by_asc(OrderCol::OrderDate)
        .order_by_asc(OrderCol::Id)
        .all(&state.orm)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<Order>> = HashMap::new();
    for order in rows {
        grouped
            .entry(order.customer_id)
            .or_default()
            .push(order_from_entity(order));
    }
    Ok(grouped)
}

/// Validate and place an order.
///
/// Checks run in order: customer, non-empty product list, then each product
/// id in input order, stopping at the first one that does not exist. The
/// total is the exact decimal sum of the resolved prices.
pub async fn create_order(state: &AppState, input: OrderInput) -> CreateOrderPayload {
    let customer = match parse_id(&input.customer_id) {
        Some(id) => Customers::find_by_id(id).one(&state.orm).await,
        None => Ok(None),
    };
    let customer = match customer {
        Ok(Some(customer)) => customer,
        Ok(None) => {
            tracing::debug!(customer_id = %input.customer_id.as_str(), "order rejected: unknown customer");
            return CreateOrderPayload::failed(format!(
                "Customer with ID {} does not exist",
                input.customer_id.as_str()
            ));
        }
        Err(err) => {
            tracing::warn!(error = %err, "customer lookup failed");
            return CreateOrderPayload::failed(err.to_string());
        }
    };

    if input.product_ids.is_empty() {
        return CreateOrderPayload::failed(NO_PRODUCTS);
    }

    let mut products: Vec<ProductModel> = Vec::with_capacity(input.product_ids.len());
    let mut total_amount = Decimal::ZERO;

    for raw_id in &input.product_ids {
        let found = match parse_id(raw_id) {
            Some(id) => Products::find_by_id(id).one(&state.orm).await,
            None => Ok(None),
        };
        match found {
            Ok(Some(product)) => {
                total_amount += money(product.price);
                products.push(product);
            }
            Ok(None) => {
                tracing::debug!(product_id = %raw_id.as_str(), "order rejected: unknown product");
                return CreateOrderPayload::failed(format!(
                    "Product with ID {} does not exist",
                    raw_id.as_str()
                ));
            }
            Err(err) => {
                tracing::warn!(error = %err, "product lookup failed");
                return CreateOrderPayload::failed(err.to_string());
            }
        }
    }

    let order_date = input.order_date.unwrap_or_else(Utc::now);

    match persist_order(&state.orm, customer.id, total_amount, order_date, &products).await {
        Ok(order) => {
            tracing::info!(order_id = %order.id, total = %order.total_amount, "order created");
            CreateOrderPayload::created(order_from_entity(order))
        }
        Err(err) => {
            tracing::warn!(error = %err, "order insert failed");
            CreateOrderPayload::failed(err.to_string())
        }
    }
}

// The order row, its date and its product links commit together.
async fn persist_order(
    conn: &DatabaseConnection,
    customer_id: Uuid,
    total_amount: Decimal,
    order_date: DateTime<Utc>,
    products: &[ProductModel],
) -> Result<OrderModel, DbErr> {
    let txn = conn.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        total_amount: Set(total_amount),
        order_date: Set(order_date),
    }
    .insert(&txn)
    .await?;

    // A product listed twice is charged twice but linked once.
    let mut linked: Vec<Uuid> = Vec::with_capacity(products.len());
    for product in products {
        if !linked.contains(&product.id) {
            linked.push(product.id);
        }
    }

    OrderProducts::insert_many(linked.into_iter().map(|product_id| OrderProductActive {
        order_id: Set(order.id),
        product_id: Set(product_id),
    }))
    .exec_without_returning(&txn)
    .await?;

    txn.commit().await?;
    Ok(order)
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_id: model.customer_id,
        total_amount: money(model.total_amount),
        order_date: model.order_date,
    }
}
