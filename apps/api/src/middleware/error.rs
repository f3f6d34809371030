//! Error handling middleware - RFC 7807 compliant responses.

use std::collections::BTreeMap;
use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use yatube_core::error::{DomainError, RepoError, ValidationErrors};
use yatube_core::ports::AuthError;
use yatube_shared::ErrorResponse;

use crate::observability::current_request_id;

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Validation(BTreeMap<String, Vec<String>>),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation errors: {:?}", errors),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Validation(errors) => ErrorResponse::validation(errors.clone()),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized(detail),
            AppError::Forbidden(detail) => ErrorResponse::forbidden(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };
        let error = match current_request_id() {
            Some(request_id) => error.with_request_id(request_id),
            None => error,
        };

        let mut response = HttpResponse::build(self.status_code());
        if let AppError::Unauthorized(_) = self {
            response.insert_header(("WWW-Authenticate", "Bearer realm=\"api\""));
        }
        response.json(error)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors.into_map())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("No {} matches the given query (id {}).", entity_type, id))
            }
            DomainError::Validation(errors) => errors.into(),
            DomainError::MalformedBody(reason) => AppError::BadRequest(reason),
            DomainError::Unauthenticated => AppError::Unauthorized(NOT_AUTHENTICATED.to_string()),
            DomainError::PermissionDenied => AppError::Forbidden(PERMISSION_DENIED.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Not found.".to_string()),
            RepoError::Duplicate(msg) | RepoError::Constraint(msg) => {
                AppError::Validation(ValidationErrors::non_field(msg).into_map())
            }
            RepoError::Connection(msg) => {
                AppError::Internal(format!("Database connection error: {}", msg))
            }
            RepoError::Query(msg) => AppError::Internal(format!("Database query error: {}", msg)),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashingError(msg) => AppError::Internal(msg),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use yatube_core::error::NON_FIELD_ERRORS;

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        let cases = [
            (DomainError::not_found("Post", 9), StatusCode::NOT_FOUND),
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::PermissionDenied, StatusCode::FORBIDDEN),
            (
                DomainError::Validation(ValidationErrors::non_field("nope")),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::MalformedBody("JSON parse error".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_constraint_violation_is_non_field_error() {
        let err = AppError::from(RepoError::Constraint("duplicate".into()));
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors[NON_FIELD_ERRORS], vec!["duplicate".to_string()])
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_token_errors_are_unauthorized() {
        assert_eq!(
            AppError::from(AuthError::TokenExpired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::HashingError("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
