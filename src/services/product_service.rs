use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::products::{CreateProductPayload, ProductInput},
    entity::{
        OrderProducts,
        order_products::Column as OrderProductCol,
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::AppResult,
    filters::{FilterSet, ProductFilter},
    models::Product,
    params::{Page, Pagination},
    services::{
        parse_id,
        validation::{money, validate_product},
    },
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    filter: &ProductFilter,
    order_by: Option<&str>,
) -> AppResult<Vec<Product>> {
    let items = filter
        .select(order_by)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    Ok(items)
}

pub async fn page_products(
    state: &AppState,
    filter: &ProductFilter,
    order_by: Option<&str>,
    pagination: &Pagination,
) -> AppResult<Page<Product>> {
    let (offset, limit) = pagination.normalize()?;
    let finder = filter.select(order_by);
    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(Page {
        items,
        offset,
        total,
    })
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<Option<Product>> {
    let Some(id) = parse_id(id) else {
        return Ok(None);
    };
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    Ok(product)
}

/// Products attached to an order, by name.
pub async fn products_for_order(state: &AppState, order_id: Uuid) -> AppResult<Vec<Product>> {
    let mut grouped = products_for_orders(state, &[order_id]).await?;
    Ok(grouped.remove(&order_id).unwrap_or_default())
}

/// Products of many orders in one query, grouped by order id. Orders with no
/// products are absent from the map.
pub async fn products_for_orders(
    state: &AppState,
    order_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<Product>>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = OrderProducts::find()
        .filter(OrderProductCol::OrderId.is_in(order_ids.iter().copied()))
        .find_also_related(Products)
        .order_by_asc(Column::Name)
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<Product>> = HashMap::new();
    for (link, product) in rows {
        if let Some(product) = product {
            grouped
                .entry(link.order_id)
                .or_default()
                .push(product_from_entity(product));
        }
    }
    Ok(grouped)
}

pub async fn create_product(state: &AppState, input: ProductInput) -> CreateProductPayload {
    if let Err(message) = validate_product(input.price, input.stock) {
        tracing::debug!(name = %input.name, reason = message, "product rejected");
        return CreateProductPayload::failed(message);
    }

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        price: Set(input.price),
        stock: Set(input.stock),
    };

    match active.insert(&state.orm).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "product created");
            CreateProductPayload::created(product_from_entity(product))
        }
        Err(err) => {
            tracing::warn!(error = %err, "product insert failed");
            CreateProductPayload::failed(err.to_string())
        }
    }
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: money(model.price),
        stock: model.stock,
    }
}
