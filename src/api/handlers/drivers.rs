//! Driver profile API handlers

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::{extract::State, response::Response, Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::ApiResponse;
use crate::api::validated_json::ValidatedJson;
use crate::application::DriverService;
use crate::auth::AuthenticatedUser;
use crate::domain::Driver;

use super::error_response;

/// State for driver profile handlers
#[derive(Clone)]
pub struct DriverAppState {
    pub drivers: Arc<DriverService>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "license_no": "B-1234567",
    "car_name": "Toyota Corolla",
    "seats": 4
}))]
pub struct DriverProfileRequest {
    #[validate(length(min = 1, max = 50))]
    pub license_no: String,
    #[validate(length(min = 1, max = 100))]
    pub car_name: String,
    #[validate(range(min = 1, max = 16))]
    pub seats: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DriverDto {
    pub id: String,
    pub user_id: String,
    pub license_no: String,
    pub car_name: String,
    pub seats: u32,
}

impl DriverDto {
    fn from_domain(driver: Driver) -> Self {
        Self {
            id: driver.id.to_string(),
            user_id: driver.user_id.to_string(),
            license_no: driver.license_no,
            car_name: driver.car_name,
            seats: driver.seats,
        }
    }
}

/// Create the caller's driver profile
#[utoipa::path(
    post,
    path = "/api/v1/drivers",
    tag = "Drivers",
    security(("bearer_auth" = [])),
    request_body = DriverProfileRequest,
    responses(
        (status = 200, description = "Profile created", body = ApiResponse<DriverDto>),
        (status = 409, description = "Profile already exists")
    )
)]
pub async fn create_driver(
    State(state): State<DriverAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<DriverProfileRequest>,
) -> Response {
    match state
        .drivers
        .create_profile(
            user.context(),
            &request.license_no,
            &request.car_name,
            request.seats,
        )
        .await
    {
        Ok(driver) => Json(ApiResponse::success(DriverDto::from_domain(driver))).into_response(),
        Err(err) => error_response(err),
    }
}

/// The caller's driver profile
#[utoipa::path(
    get,
    path = "/api/v1/drivers/me",
    tag = "Drivers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The profile", body = ApiResponse<DriverDto>),
        (status = 404, description = "No driver profile")
    )
)]
pub async fn get_driver(
    State(state): State<DriverAppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Response {
    match state.drivers.get_profile(user.context()).await {
        Ok(driver) => Json(ApiResponse::success(DriverDto::from_domain(driver))).into_response(),
        Err(err) => error_response(err),
    }
}

/// Update the caller's driver profile
#[utoipa::path(
    put,
    path = "/api/v1/drivers/me",
    tag = "Drivers",
    security(("bearer_auth" = [])),
    request_body = DriverProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<DriverDto>),
        (status = 404, description = "No driver profile")
    )
)]
pub async fn update_driver(
    State(state): State<DriverAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<DriverProfileRequest>,
) -> Response {
    match state
        .drivers
        .update_profile(
            user.context(),
            &request.license_no,
            &request.car_name,
            request.seats,
        )
        .await
    {
        Ok(driver) => Json(ApiResponse::success(DriverDto::from_domain(driver))).into_response(),
        Err(err) => error_response(err),
    }
}
