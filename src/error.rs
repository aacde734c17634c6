use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    OrmError(#[from] sea_orm::DbErr),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::OrmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
