use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

use crate::intake::IntakeError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    /// Request body exceeds the configured size ceiling
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Capacity limits reached, client should retry later
    #[error("{message}")]
    TooManyRequests { message: String },

    /// Body rejected by an extractor before reaching the handler
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::Rejected { status, .. } => *status,
            Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message }
            | Error::PayloadTooLarge { message }
            | Error::TooManyRequests { message }
            | Error::Rejected { message, .. } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} {id} not found"),
            Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::TooManyRequests { .. } | Error::PayloadTooLarge { .. } => {
                tracing::warn!("Request rejected: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Rejected { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = ErrorBody { error: self.user_message() };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<IntakeError> for Error {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Storage(e) => Error::Other(anyhow::Error::new(e).context("failed to store uploaded file")),
            client => Error::BadRequest { message: client.to_string() },
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
