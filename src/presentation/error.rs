use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unknown grouping: {0}")]
    UnknownGroupBy(String),

    #[error("Unknown sort column: {0}")]
    UnknownSortColumn(String),

    #[error("Unknown sort direction: {0}")]
    UnknownDirection(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!("Rejecting request: {}", self);
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
