//! REST API handlers

pub mod auth;
pub mod drivers;
pub mod groups;
pub mod health;
pub mod history;
pub mod rides;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::dto::ApiResponse;
use crate::shared::DomainError;

/// The single place a domain error becomes an HTTP status.
pub fn error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::InvalidCredential(_) => StatusCode::BAD_REQUEST,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: DomainError) -> Response {
    let status = error_status(&err);
    (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            error_status(&DomainError::not_found("ride", "id", "x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&DomainError::Conflict("full".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&DomainError::Forbidden("no".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            error_status(&DomainError::InvalidCredential("r1".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
