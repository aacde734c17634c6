//! GraphQL surface: schema, root objects and the axum handlers serving them.

pub mod connection;
pub mod handler;
pub mod loaders;
pub mod mutation;
pub mod query;
mod schema;

pub use handler::router;
pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use schema::{CrmSchema, build_schema};
