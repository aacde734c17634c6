use axum::{Json, extract::State};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, response::ApiResponse, state::AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
        (status = 500, description = "Database unreachable"),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<ApiResponse<HealthData>>> {
    state.orm.ping().await?;

    let data = HealthData {
        status: "ok".to_string(),
        database: format!("{:?}", state.orm.get_database_backend()).to_lowercase(),
    };

    Ok(Json(ApiResponse::success("Health check", data)))
}
