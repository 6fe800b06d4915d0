//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, response::Response, Extension, Json};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::ApiResponse;
use crate::api::validated_json::ValidatedJson;
use crate::application::AccountService;
use crate::auth::{create_token, AuthenticatedUser, JwtConfig};
use crate::domain::User;
use crate::shared::DomainError;

use super::error_response;

/// State for authentication handlers
#[derive(Clone)]
pub struct AuthHandlerState {
    pub accounts: Arc<AccountService>,
    pub jwt_config: JwtConfig,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "email": "ana@example.com",
    "password": "secure_password_123",
    "first_name": "Ana",
    "last_name": "Silva"
}))]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    /// Password (minimum 8 characters)
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Successful login response. Pass the token in the
/// `Authorization: Bearer <token>` header.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserInfo,
}

/// User account information
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub license_validated: bool,
}

impl UserInfo {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            license_validated: user.license_validated,
        }
    }
}

fn login_response(user: &User, jwt_config: &JwtConfig) -> Result<LoginResponse, DomainError> {
    let token = create_token(&user.id.to_string(), &user.email, jwt_config)
        .map_err(|e| DomainError::Storage(format!("token creation failed: {}", e)))?;
    Ok(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.expiration_hours * 3600,
        user: UserInfo::from_user(user),
    })
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, returns a JWT token", body = ApiResponse<LoginResponse>),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Response {
    let result = state
        .accounts
        .register(
            &request.email,
            &request.password,
            &request.first_name,
            &request.last_name,
        )
        .await
        .and_then(|user| login_response(&user, &state.jwt_config));

    match result {
        Ok(response) => Json(ApiResponse::success(response)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated, returns a JWT token", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Response {
    let result = state
        .accounts
        .authenticate(&request.email, &request.password)
        .await
        .and_then(|user| login_response(&user, &state.jwt_config));

    match result {
        Ok(response) => Json(ApiResponse::success(response)).into_response(),
        Err(err) => error_response(err),
    }
}

/// The authenticated user's own account
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserInfo>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Response {
    match state.accounts.get(user.user_id).await {
        Ok(user) => Json(ApiResponse::success(UserInfo::from_user(&user))).into_response(),
        Err(err) => error_response(err),
    }
}
