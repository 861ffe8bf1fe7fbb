use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("{0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Failed to read request body: {0}")]
    RequestBody(#[from] axum::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!(error = %self, "[Proxy Error]");
        let body = json!({"error": "Proxy error", "details": self.to_string()});
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
