pub mod customer_service;
pub mod order_service;
pub mod product_service;
pub mod validation;

/// Parse an externally supplied identity. Anything that is not a UUID
/// cannot name a stored record.
pub(crate) fn parse_id(raw: &str) -> Option<uuid::Uuid> {
    uuid::Uuid::parse_str(raw.trim()).ok()
}
