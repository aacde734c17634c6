use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::ACCEPT},
    response::{Html, IntoResponse},
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::HttpState;

use super::CrmSchema;

/// Request body accepted by `POST /graphql`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequestBody {
    pub query: String,
    pub operation_name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub variables: Option<serde_json::Value>,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct GraphqlResponseBody {
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub errors: Option<Vec<serde_json::Value>>,
}

pub fn router() -> Router<HttpState> {
    Router::new().route("/graphql", get(graphiql).post(graphql_handler))
}

async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

#[utoipa::path(
    post,
    path = "/graphql",
    request_body = GraphqlRequestBody,
    responses(
        (status = 200, description = "GraphQL result; validation failures are reported inside the payload", body = GraphqlResponseBody)
    ),
    tag = "GraphQL"
)]
pub async fn graphql_handler(
    State(schema): State<CrmSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner();
    tracing::debug!(operation = ?request.operation_name, "graphql request");
    schema.execute(request).await.into()
}
