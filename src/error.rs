use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::filter::FilterError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),

    #[error("store query failed")]
    Store(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidFilter(err) => {
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            // Store internals go to the log, not the client.
            AppError::Store(err) => {
                error!(error = %err, "student store query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
