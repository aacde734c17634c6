//! Translation of flat filter arguments into store predicates.
//!
//! Each entity has an explicit filter struct. Set fields are combined with
//! AND. Filters that traverse the order -> product relation are expressed as
//! `IN (subquery)` so a match on several products never repeats an order row.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::{
    Customers, OrderProducts, Orders, Products, customers, order_products, orders, products,
};
use crate::params::{SortKey, normalize_key};

/// Stock strictly below this counts as low.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// An identity argument as the client sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdArg {
    Valid(Uuid),
    /// Not a UUID, so it names no stored row.
    Malformed,
}

impl IdArg {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => Self::Valid(id),
            Err(_) => Self::Malformed,
        }
    }
}

/// A per-entity filter that can be built from loosely named arguments.
pub trait FilterSet: Default {
    type Entity: EntityTrait;

    /// Apply one argument whose name is already snake_case. Returns `false`
    /// when the name is unknown or the value has the wrong shape.
    fn set(&mut self, key: &str, value: &Value) -> bool;

    fn condition(&self) -> Condition;

    fn sort_column(field: &str) -> Option<<Self::Entity as EntityTrait>::Column>;

    fn id_column() -> <Self::Entity as EntityTrait>::Column;

    /// Build from a flat argument map. Unrecognised names are ignored.
    fn from_args<'a, K, I>(args: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, &'a Value)>,
    {
        let mut filter = Self::default();
        for (key, value) in args {
            if value.is_null() {
                continue;
            }
            let normalized = normalize_key(key.as_ref());
            if !filter.set(&normalized, value) {
                tracing::debug!(argument = key.as_ref(), "ignoring filter argument");
            }
        }
        filter
    }

    /// Filtered select with the optional ordering applied on top.
    fn select(&self, order_by: Option<&str>) -> Select<Self::Entity> {
        let mut finder = Self::Entity::find().filter(self.condition());
        if let Some(key) = order_by.and_then(SortKey::parse) {
            match Self::sort_column(&key.field) {
                Some(column) => {
                    finder = finder
                        .order_by(column, key.order.into())
                        .order_by_asc(Self::id_column());
                }
                None => tracing::debug!(field = %key.field, "ignoring unknown order key"),
            }
        }
        finder
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CustomerFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at_gte: Option<DateTime<Utc>>,
    pub created_at_lte: Option<DateTime<Utc>>,
    pub phone_pattern: Option<String>,
}

impl FilterSet for CustomerFilter {
    type Entity = Customers;

    fn set(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "name" => assign(&mut self.name, as_text(value)),
            "email" => assign(&mut self.email, as_text(value)),
            "created_at_gte" => assign(&mut self.created_at_gte, as_datetime(value)),
            "created_at_lte" => assign(&mut self.created_at_lte, as_datetime(value)),
            "phone_pattern" => assign(&mut self.phone_pattern, as_text(value)),
            _ => false,
        }
    }

    fn condition(&self) -> Condition {
        use customers::Column;

        let mut condition = Condition::all();
        if let Some(name) = &self.name {
            condition = condition.add(icontains(Column::Name, name));
        }
        if let Some(email) = &self.email {
            condition = condition.add(icontains(Column::Email, email));
        }
        if let Some(from) = self.created_at_gte {
            condition = condition.add(Column::CreatedAt.gte(from));
        }
        if let Some(to) = self.created_at_lte {
            condition = condition.add(Column::CreatedAt.lte(to));
        }
        if let Some(prefix) = &self.phone_pattern {
            condition = condition.add(istartswith(Column::Phone, prefix));
        }
        condition
    }

    fn sort_column(field: &str) -> Option<customers::Column> {
        use customers::Column;

        match field {
            "id" => Some(Column::Id),
            "name" => Some(Column::Name),
            "email" => Some(Column::Email),
            "phone" => Some(Column::Phone),
            "created_at" => Some(Column::CreatedAt),
            _ => None,
        }
    }

    fn id_column() -> customers::Column {
        customers::Column::Id
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
    pub stock: Option<i32>,
    /// `Some(false)` adds no constraint.
    pub low_stock: Option<bool>,
}

impl FilterSet for ProductFilter {
    type Entity = Products;

    fn set(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "name" => assign(&mut self.name, as_text(value)),
            "price_gte" => assign(&mut self.price_gte, as_decimal(value)),
            "price_lte" => assign(&mut self.price_lte, as_decimal(value)),
            "stock_gte" => assign(&mut self.stock_gte, as_i32(value)),
            "stock_lte" => assign(&mut self.stock_lte, as_i32(value)),
            "stock" => assign(&mut self.stock, as_i32(value)),
            "low_stock" => assign(&mut self.low_stock, as_bool(value)),
            _ => false,
        }
    }

    fn condition(&self) -> Condition {
        use products::Column;

        let mut condition = Condition::all();
        if let Some(name) = &self.name {
            condition = condition.add(icontains(Column::Name, name));
        }
        if let Some(min) = self.price_gte {
            condition = condition.add(Column::Price.gte(min));
        }
        if let Some(max) = self.price_lte {
            condition = condition.add(Column::Price.lte(max));
        }
        if let Some(min) = self.stock_gte {
            condition = condition.add(Column::Stock.gte(min));
        }
        if let Some(max) = self.stock_lte {
            condition = condition.add(Column::Stock.lte(max));
        }
        if let Some(stock) = self.stock {
            condition = condition.add(Column::Stock.eq(stock));
        }
        if self.low_stock == Some(true) {
            condition = condition.add(Column::Stock.lt(LOW_STOCK_THRESHOLD));
        }
        condition
    }

    fn sort_column(field: &str) -> Option<products::Column> {
        use products::Column;

        match field {
            "id" => Some(Column::Id),
            "name" => Some(Column::Name),
            "price" => Some(Column::Price),
            "stock" => Some(Column::Stock),
            _ => None,
        }
    }

    fn id_column() -> products::Column {
        products::Column::Id
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OrderFilter {
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<DateTime<Utc>>,
    pub order_date_lte: Option<DateTime<Utc>>,
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    pub product_id: Option<IdArg>,
}

impl FilterSet for OrderFilter {
    type Entity = Orders;

    fn set(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "total_amount_gte" => assign(&mut self.total_amount_gte, as_decimal(value)),
            "total_amount_lte" => assign(&mut self.total_amount_lte, as_decimal(value)),
            "order_date_gte" => assign(&mut self.order_date_gte, as_datetime(value)),
            "order_date_lte" => assign(&mut self.order_date_lte, as_datetime(value)),
            "customer_name" => assign(&mut self.customer_name, as_text(value)),
            "product_name" => assign(&mut self.product_name, as_text(value)),
            "product_id" => assign(&mut self.product_id, value.as_str().map(IdArg::parse)),
            _ => false,
        }
    }

    fn condition(&self) -> Condition {
        use orders::Column;

        let mut condition = Condition::all();
        if let Some(min) = self.total_amount_gte {
            condition = condition.add(Column::TotalAmount.gte(min));
        }
        if let Some(max) = self.total_amount_lte {
            condition = condition.add(Column::TotalAmount.lte(max));
        }
        if let Some(from) = self.order_date_gte {
            condition = condition.add(Column::OrderDate.gte(from));
        }
        if let Some(to) = self.order_date_lte {
            condition = condition.add(Column::OrderDate.lte(to));
        }
        if let Some(name) = &self.customer_name {
            let matching_customers = Query::select()
                .column(customers::Column::Id)
                .from(Customers)
                .and_where(icontains(customers::Column::Name, name))
                .to_owned();
            condition = condition.add(Column::CustomerId.in_subquery(matching_customers));
        }
        if let Some(name) = &self.product_name {
            let matching_orders = Query::select()
                .column(order_products::Column::OrderId)
                .from(OrderProducts)
                .inner_join(
                    Products,
                    Expr::col(order_products::Column::ProductId.as_column_ref())
                        .equals(products::Column::Id.as_column_ref()),
                )
                .and_where(icontains(products::Column::Name, name))
                .to_owned();
            condition = condition.add(Column::Id.in_subquery(matching_orders));
        }
        match self.product_id {
            Some(IdArg::Valid(product_id)) => {
                let matching_orders = Query::select()
                    .column(order_products::Column::OrderId)
                    .from(OrderProducts)
                    .and_where(order_products::Column::ProductId.eq(product_id))
                    .to_owned();
                condition = condition.add(Column::Id.in_subquery(matching_orders));
            }
            // A narrowing filter that names nothing matches nothing.
            Some(IdArg::Malformed) => condition = condition.add(SimpleExpr::from(Expr::val(false))),
            None => {}
        }
        condition
    }

    fn sort_column(field: &str) -> Option<orders::Column> {
        use orders::Column;

        match field {
            "id" => Some(Column::Id),
            "total_amount" => Some(Column::TotalAmount),
            "order_date" => Some(Column::OrderDate),
            "customer_id" => Some(Column::CustomerId),
            _ => None,
        }
    }

    fn id_column() -> orders::Column {
        orders::Column::Id
    }
}

/// Case-insensitive substring match.
fn icontains<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    lower_like(column, format!("%{}%", escape_like(&needle.to_lowercase())))
}

/// Case-insensitive prefix match.
fn istartswith<C: ColumnTrait>(column: C, prefix: &str) -> SimpleExpr {
    lower_like(column, format!("{}%", escape_like(&prefix.to_lowercase())))
}

// lower() on both sides keeps the match identical on Postgres and SQLite.
fn lower_like<C: ColumnTrait>(column: C, pattern: String) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn assign<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) => {
            *slot = Some(v);
            true
        }
        None => false,
    }
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        _ => None,
    }
}

fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// RFC 3339 timestamps, or a bare date meaning midnight UTC.
fn as_datetime(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sea_orm::{DbBackend, QueryTrait};
    use serde_json::json;

    fn args(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn product_filter_accepts_every_naming_convention() {
        let map = args(json!({
            "priceGte": 50.0,
            "price_Lte": "1000.00",
            "stock__gte": 5,
            "lowStock": true,
        }));
        let filter = ProductFilter::from_args(&map);
        assert_eq!(
            filter,
            ProductFilter {
                price_gte: Some(Decimal::from_str("50.0").unwrap()),
                price_lte: Some(Decimal::from_str("1000.00").unwrap()),
                stock_gte: Some(5),
                low_stock: Some(true),
                ..Default::default()
            }
        );
    }

    #[test]
    fn unknown_and_malformed_arguments_are_ignored() {
        let map = args(json!({
            "shoeSize": 42,
            "name": 17,
            "email": "ali",
            "createdAtGte": "yesterday",
            "phonePattern": null,
        }));
        let filter = CustomerFilter::from_args(&map);
        assert_eq!(
            filter,
            CustomerFilter {
                email: Some("ali".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn order_filter_parses_dates_and_ids() {
        let id = Uuid::new_v4();
        let map = args(json!({
            "orderDateGte": "2024-01-01",
            "order_date__lte": "2024-02-01T12:30:00+02:00",
            "productId": id.to_string(),
            "customerName": "alice",
        }));
        let filter = OrderFilter::from_args(&map);
        assert_eq!(
            filter.order_date_gte.map(|d| d.to_rfc3339()),
            Some("2024-01-01T00:00:00+00:00".to_string())
        );
        assert_eq!(
            filter.order_date_lte.map(|d| d.to_rfc3339()),
            Some("2024-02-01T10:30:00+00:00".to_string())
        );
        assert_eq!(filter.product_id, Some(IdArg::Valid(id)));
        assert_eq!(filter.customer_name.as_deref(), Some("alice"));
    }

    #[test]
    fn malformed_product_id_matches_nothing() {
        let filter = OrderFilter::from_args(&args(json!({ "productId": "42" })));
        assert_eq!(filter.product_id, Some(IdArg::Malformed));

        let sql = filter.select(None).build(DbBackend::Postgres).to_string();
        assert!(sql.contains("WHERE FALSE"), "{sql}");

        // Non-string ids are the wrong shape and are ignored.
        let filter = OrderFilter::from_args(&args(json!({ "productId": 42 })));
        assert_eq!(filter.product_id, None);
    }

    #[test]
    fn like_wildcards_in_input_are_escaped() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn low_stock_false_adds_no_constraint() {
        let unfiltered = ProductFilter::default()
            .select(None)
            .build(DbBackend::Postgres)
            .to_string();
        let not_low = ProductFilter {
            low_stock: Some(false),
            ..Default::default()
        }
        .select(None)
        .build(DbBackend::Postgres)
        .to_string();
        assert_eq!(unfiltered, not_low);
    }

    #[test]
    fn relational_order_filters_use_subqueries() {
        let sql = OrderFilter {
            customer_name: Some("Alice".into()),
            product_name: Some("lap".into()),
            ..Default::default()
        }
        .select(Some("-totalAmount"))
        .build(DbBackend::Postgres)
        .to_string();

        assert!(sql.contains(r#""orders"."customer_id" IN (SELECT"#), "{sql}");
        assert!(sql.contains(r#""orders"."id" IN (SELECT"#), "{sql}");
        assert!(!sql.contains("JOIN \"customers\""), "{sql}");
        assert!(
            sql.ends_with(r#"ORDER BY "orders"."total_amount" DESC, "orders"."id" ASC"#),
            "{sql}"
        );
    }

    #[test]
    fn unknown_order_key_leaves_order_unspecified() {
        let sql = CustomerFilter::default()
            .select(Some("favouriteColour"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(!sql.contains("ORDER BY"), "{sql}");
    }
}
