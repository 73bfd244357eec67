//! Error types and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::forms::BindError;

/// Library error type
///
/// Handlers return this directly; the [`IntoResponse`] impl maps each
/// variant to a status code with a plain-text body.
#[derive(Debug, Error)]
pub enum CrudError {
    /// Malformed client input (bad id, bad query string, bad form)
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Record or template lookup miss (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// No response capability matched the request's Accept header
    #[error("no response capability for Accept header: {0}")]
    NotAcceptable(String),

    /// Form binding failure
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Template load or render failure
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Filesystem failure while scaffolding or loading templates
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Record (de)serialization failure
    #[error("record error: {0}")]
    Record(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Database error
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) | Self::NotAcceptable(_) | Self::Bind(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Template(_) | Self::Io(_) | Self::Record(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            #[cfg(feature = "postgres")]
            Self::Database(e) => {
                if matches!(e, sqlx::Error::RowNotFound) {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        };
        (status, format!("Error: {self}")).into_response()
    }
}
