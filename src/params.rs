//! Pagination and ordering arguments shared by the list and connection queries.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::{AppError, AppResult};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Forward pagination in the `first` / `after` style.
#[derive(Debug, Default, Clone)]
pub struct Pagination {
    pub first: Option<i32>,
    pub after: Option<String>,
}

impl Pagination {
    /// Resolve to `(offset, limit)`. A cursor points at the last row already seen.
    pub fn normalize(&self) -> AppResult<(u64, u64)> {
        let limit = self
            .first
            .map(|n| u64::try_from(n.max(1)).unwrap_or(1))
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = match self.after.as_deref().filter(|c| !c.is_empty()) {
            Some(cursor) => decode_cursor(cursor)
                .map_err(|e| AppError::BadRequest(format!("invalid cursor: {e}")))?
                .checked_add(1)
                // Stores bind OFFSET as a signed 64-bit integer.
                .filter(|offset| i64::try_from(*offset).is_ok())
                .ok_or_else(|| AppError::BadRequest("invalid cursor value".into()))?,
            None => 0,
        };
        Ok((offset, limit))
    }
}

/// One page of rows plus what is needed to build cursors.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for sea_orm::Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => sea_orm::Order::Asc,
            SortOrder::Desc => sea_orm::Order::Desc,
        }
    }
}

/// A parsed `orderBy` argument: `"name"` sorts ascending, `"-stock"` descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (order, field) = match raw.strip_prefix('-') {
            Some(rest) => (SortOrder::Desc, rest),
            None => (SortOrder::Asc, raw.strip_prefix('+').unwrap_or(raw)),
        };
        let field = normalize_key(field);
        if field.is_empty() {
            return None;
        }
        Some(Self { field, order })
    }
}

/// Map an argument name to snake_case.
///
/// `priceGte`, `price_gte`, `price__gte` and `price_Gte` all become `price_gte`.
pub fn normalize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.trim().chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(ch);
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

pub fn encode_cursor(offset: u64) -> String {
    BASE64.encode(format!("cursor:{offset}"))
}

pub fn decode_cursor(cursor: &str) -> Result<u64, &'static str> {
    let decoded = BASE64.decode(cursor).map_err(|_| "invalid cursor format")?;
    let s = String::from_utf8(decoded).map_err(|_| "invalid cursor encoding")?;
    let value = s.strip_prefix("cursor:").ok_or("invalid cursor prefix")?;
    value.parse().map_err(|_| "invalid cursor value")
}
