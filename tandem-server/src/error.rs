use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value '{value}': {source}")]
    InvalidPort {
        value: String,
        source: ParseIntError,
    },
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay task is no longer running")]
    RelayStopped,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (StatusCode::SERVICE_UNAVAILABLE, self.to_string()).into_response()
    }
}
