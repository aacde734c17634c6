use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, SqlErr};

use crate::entity::{Customers, customers::Column as CustomerCol};

pub const EMAIL_EXISTS: &str = "Email already exists";
pub const INVALID_PHONE: &str = "Invalid phone format. Use +1234567890 or 123-456-7890";
pub const INVALID_PHONE_SHORT: &str = "Invalid phone format";
pub const PRICE_NOT_POSITIVE: &str = "Price must be positive";
pub const NEGATIVE_STOCK: &str = "Stock cannot be negative";
pub const NO_PRODUCTS: &str = "At least one product must be selected";

// Optional `+`, optional leading 1, then 9-15 digits; or strict ###-###-####.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?1?\d{9,15}$|^\d{3}-\d{3}-\d{4}$").expect("phone regex is valid")
});

/// Absent and empty phones are valid.
pub fn validate_phone(phone: Option<&str>) -> bool {
    match phone {
        None | Some("") => true,
        Some(p) => PHONE_RE.is_match(p),
    }
}

pub async fn email_exists<C: ConnectionTrait>(conn: &C, email: &str) -> Result<bool, DbErr> {
    let count = Customers::find()
        .filter(CustomerCol::Email.eq(email))
        .count(conn)
        .await?;
    Ok(count > 0)
}

pub fn validate_product(price: Decimal, stock: i32) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err(PRICE_NOT_POSITIVE);
    }
    if stock < 0 {
        return Err(NEGATIVE_STOCK);
    }
    Ok(())
}

/// Message reported for a failed customer insert. The unique index on
/// `customers.email` is the real uniqueness guarantee, so a violation there
/// reads the same as the pre-check.
pub fn customer_write_error(err: &DbErr) -> String {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EMAIL_EXISTS.to_string(),
        _ => err.to_string(),
    }
}

/// Money columns are NUMERIC(10, 2).
pub fn money(value: Decimal) -> Decimal {
    value.round_dp(2)
}
