//! Typed service errors and their mapping onto the response envelope

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the service layer.
///
/// Services raise these and never log or swallow them; the HTTP boundary
/// maps each kind to a response code via the [`ResponseError`] impl below.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A write could not be performed: an insert/update affected no rows
    /// unexpectedly, or a duplicate-like conflict was detected.
    #[error("{0}")]
    Invariant(String),

    /// The referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller could not be identified.
    #[error("{0}")]
    Authentication(String),

    /// The entity exists but the caller lacks permission.
    #[error("{0}")]
    Authorization(String),

    /// Anything else is a server fault and is never surfaced as the
    /// primary user-facing message.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        // duplicate-like conflicts are client faults, not server faults
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return ServiceError::Invariant(
                    "duplicate entry violates a uniqueness constraint".to_string(),
                );
            }
        }

        ServiceError::Internal(err.into())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Internal(err.into())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Invariant(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Authorization(_) => StatusCode::FORBIDDEN,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                HttpResponse::InternalServerError().json(json!({
                    "status": "error",
                    "message": "something went wrong on our end",
                    "error": err.to_string(),
                }))
            }
            other => HttpResponse::build(other.status_code()).json(json!({
                "status": "fail",
                "message": other.to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::Invariant("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Authentication("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Authorization("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_passthrough() {
        let err = ServiceError::Authorization("you are not authorized to access this resource".into());
        assert_eq!(
            err.to_string(),
            "you are not authorized to access this resource"
        );
    }
}
