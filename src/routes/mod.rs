use axum::{Json, Router, http::{StatusCode, Uri}, routing::get};

use crate::{graphql, response::ApiResponse, state::HttpState};

pub mod doc;
pub mod health;

// Build the full router without binding state; it is provided at the top level.
pub fn create_router() -> Router<HttpState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(graphql::router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success("Not Found", serde_json::json!({ "path": uri.path() }));
    (StatusCode::NOT_FOUND, Json(body))
}
