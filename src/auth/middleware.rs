//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{verify_token, AuthError, Claims, JwtConfig};
use crate::application::CallerContext;

/// Authentication state carried by protected routes
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Authenticated user information extracted from a verified token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Result<Self, AuthError> {
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthError::MalformedSubject)?;
        Ok(Self {
            user_id,
            email: claims.email,
        })
    }

    pub fn context(&self) -> CallerContext {
        CallerContext::new(self.user_id)
    }
}

/// Extract token from Authorization header
fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// JWT authentication middleware - requires valid token
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            if claims.is_expired() {
                return auth_error_response(AuthError::ExpiredToken);
            }
            match AuthenticatedUser::from_claims(claims) {
                Ok(user) => {
                    request.extensions_mut().insert(user);
                    next.run(request).await
                }
                Err(err) => auth_error_response(err),
            }
        }
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

/// Build a 401 response for an authentication failure
pub fn auth_error_response(error: AuthError) -> Response {
    let body = Json(json!({
        "success": false,
        "error": error.to_string(),
    }));
    (StatusCode::UNAUTHORIZED, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_token_requires_bearer_scheme() {
        assert_eq!(extract_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_token("Basic dXNlcjpwYXNz"), None);
    }

    #[test]
    fn claims_with_bad_subject_are_rejected() {
        let config = JwtConfig::default();
        let claims = Claims::new("not-a-uuid", "a@example.com", &config);
        assert!(AuthenticatedUser::from_claims(claims).is_err());
    }

    #[test]
    fn claims_round_trip_to_caller_context() {
        let config = JwtConfig::default();
        let id = Uuid::new_v4();
        let claims = Claims::new(&id.to_string(), "a@example.com", &config);
        let user = AuthenticatedUser::from_claims(claims).unwrap();
        assert_eq!(user.context().user_id, id);
    }
}
