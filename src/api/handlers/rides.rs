//! Ride lifecycle API handlers
//!
//! Passenger boarding codes never appear in the general ride views; the
//! driver reads them from the manifest endpoint and each passenger from
//! their own boarding-code endpoint.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::{
    extract::{Path, State},
    response::Response,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::{ApiResponse, EmptyData};
use crate::api::validated_json::ValidatedJson;
use crate::application::BookingService;
use crate::auth::AuthenticatedUser;
use crate::domain::{RepositoryProvider, Ride};
use crate::shared::DomainResult;

use super::error_response;

/// State for ride handlers
#[derive(Clone)]
pub struct RideAppState {
    pub booking: Arc<BookingService>,
    pub repos: Arc<dyn RepositoryProvider>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "scheduled_at": "2026-09-01T08:30:00Z",
    "seats": 3
}))]
pub struct CreateRideRequest {
    /// Departure time; at least one hour from now
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 16))]
    pub seats: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassengerDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RideDto {
    pub id: String,
    pub driver_id: String,
    pub driver_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub offered_seats: u32,
    pub seats_remaining: u32,
    pub status: String,
    pub passengers: Vec<PassengerDto>,
    pub created_at: DateTime<Utc>,
}

/// Boarding code issued to the caller for one ride
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardingCodeDto {
    pub boarding_code: String,
}

/// One manifest row: passenger plus the code the driver checks
#[derive(Debug, Serialize, ToSchema)]
pub struct ManifestEntryDto {
    pub passenger_id: String,
    pub passenger_name: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ValidateBoardingRequest {
    pub passenger_id: Uuid,
    #[validate(length(equal = 6))]
    pub code: String,
    /// Set on the last check; consumes the credential batch and starts
    /// the ride
    pub all_validated: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateBoardingResponse {
    pub ride_started: bool,
}

async fn display_name(repos: &Arc<dyn RepositoryProvider>, user_id: Uuid) -> String {
    match repos.users().find_by_id(user_id).await {
        Ok(Some(user)) => user.display_name(),
        _ => String::new(),
    }
}

async fn to_dto(repos: &Arc<dyn RepositoryProvider>, ride: Ride) -> RideDto {
    let driver_name = display_name(repos, ride.driver_id).await;
    let mut passengers = Vec::with_capacity(ride.passengers.len());
    for booking in &ride.passengers {
        passengers.push(PassengerDto {
            id: booking.user_id.to_string(),
            name: display_name(repos, booking.user_id).await,
        });
    }
    RideDto {
        id: ride.id.to_string(),
        driver_id: ride.driver_id.to_string(),
        driver_name,
        scheduled_at: ride.scheduled_at,
        offered_seats: ride.offered_seats,
        seats_remaining: ride.seats_remaining,
        status: ride.status.to_string(),
        passengers,
        created_at: ride.created_at,
    }
}

async fn ride_list_response(
    state: &RideAppState,
    rides: DomainResult<Vec<Ride>>,
) -> Response {
    match rides {
        Ok(rides) => {
            let mut dtos = Vec::with_capacity(rides.len());
            for ride in rides {
                dtos.push(to_dto(&state.repos, ride).await);
            }
            Json(ApiResponse::success(dtos)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Schedule a new ride (drivers only)
#[utoipa::path(
    post,
    path = "/api/v1/rides",
    tag = "Rides",
    security(("bearer_auth" = [])),
    request_body = CreateRideRequest,
    responses(
        (status = 200, description = "Ride scheduled", body = ApiResponse<RideDto>),
        (status = 400, description = "Departure too soon or invalid seats"),
        (status = 403, description = "Caller is not a driver")
    )
)]
pub async fn create_ride(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateRideRequest>,
) -> Response {
    match state
        .booking
        .schedule_ride(user.context(), request.scheduled_at, request.seats)
        .await
    {
        Ok(ride) => {
            Json(ApiResponse::success(to_dto(&state.repos, ride).await)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Rides the caller drives or rides in
#[utoipa::path(
    get,
    path = "/api/v1/rides",
    tag = "Rides",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Related rides, newest departure first", body = ApiResponse<Vec<RideDto>>)
    )
)]
pub async fn list_related(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Response {
    let rides = state.booking.list_related(user.context()).await;
    ride_list_response(&state, rides).await
}

/// Open rides the caller could still book
#[utoipa::path(
    get,
    path = "/api/v1/rides/available",
    tag = "Rides",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Bookable rides, newest departure first", body = ApiResponse<Vec<RideDto>>)
    )
)]
pub async fn list_bookable(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Response {
    let rides = state.booking.list_bookable(user.context()).await;
    ride_list_response(&state, rides).await
}

/// One ride with driver and passenger details
#[utoipa::path(
    get,
    path = "/api/v1/rides/{ride_id}",
    tag = "Rides",
    security(("bearer_auth" = [])),
    params(("ride_id" = Uuid, Path, description = "Ride ID")),
    responses(
        (status = 200, description = "The ride", body = ApiResponse<RideDto>),
        (status = 404, description = "Ride not found")
    )
)]
pub async fn get_ride(
    State(state): State<RideAppState>,
    Path(ride_id): Path<Uuid>,
) -> Response {
    match state.booking.get_ride(ride_id).await {
        Ok(ride) => {
            Json(ApiResponse::success(to_dto(&state.repos, ride).await)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Book a seat; returns the caller's one-time boarding code
#[utoipa::path(
    post,
    path = "/api/v1/rides/{ride_id}/book",
    tag = "Rides",
    security(("bearer_auth" = [])),
    params(("ride_id" = Uuid, Path, description = "Ride ID")),
    responses(
        (status = 200, description = "Seat booked, boarding code issued", body = ApiResponse<BoardingCodeDto>),
        (status = 403, description = "Driver booking own ride"),
        (status = 409, description = "Ride full, not pending, or already booked")
    )
)]
pub async fn book_ride(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ride_id): Path<Uuid>,
) -> Response {
    match state.booking.book_seat(user.context(), ride_id).await {
        Ok(code) => Json(ApiResponse::success(BoardingCodeDto {
            boarding_code: code.as_str().to_string(),
        }))
        .into_response(),
        Err(err) => error_response(err),
    }
}

/// Give the caller's seat back
#[utoipa::path(
    post,
    path = "/api/v1/rides/{ride_id}/unbook",
    tag = "Rides",
    security(("bearer_auth" = [])),
    params(("ride_id" = Uuid, Path, description = "Ride ID")),
    responses(
        (status = 200, description = "Seat released", body = ApiResponse<EmptyData>),
        (status = 403, description = "Caller is not a passenger"),
        (status = 409, description = "Ride no longer pending")
    )
)]
pub async fn unbook_ride(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ride_id): Path<Uuid>,
) -> Response {
    match state.booking.release_seat(user.context(), ride_id).await {
        Ok(()) => Json(ApiResponse::success(EmptyData {})).into_response(),
        Err(err) => error_response(err),
    }
}

/// The driver's boarding manifest with every passenger's code
#[utoipa::path(
    get,
    path = "/api/v1/rides/{ride_id}/manifest",
    tag = "Rides",
    security(("bearer_auth" = [])),
    params(("ride_id" = Uuid, Path, description = "Ride ID")),
    responses(
        (status = 200, description = "Passengers and their codes", body = ApiResponse<Vec<ManifestEntryDto>>),
        (status = 403, description = "Caller is not the driver")
    )
)]
pub async fn boarding_manifest(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ride_id): Path<Uuid>,
) -> Response {
    match state.booking.boarding_manifest(user.context(), ride_id).await {
        Ok(bookings) => {
            let mut entries = Vec::with_capacity(bookings.len());
            for booking in bookings {
                entries.push(ManifestEntryDto {
                    passenger_id: booking.user_id.to_string(),
                    passenger_name: display_name(&state.repos, booking.user_id).await,
                    code: booking.code.as_str().to_string(),
                });
            }
            Json(ApiResponse::success(entries)).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// The caller's own boarding code for a pending ride
#[utoipa::path(
    get,
    path = "/api/v1/rides/{ride_id}/boarding-code",
    tag = "Rides",
    security(("bearer_auth" = [])),
    params(("ride_id" = Uuid, Path, description = "Ride ID")),
    responses(
        (status = 200, description = "The caller's code", body = ApiResponse<BoardingCodeDto>),
        (status = 403, description = "Caller is not a passenger"),
        (status = 409, description = "Ride is not pending")
    )
)]
pub async fn my_boarding_code(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ride_id): Path<Uuid>,
) -> Response {
    match state.booking.my_boarding_code(user.context(), ride_id).await {
        Ok(code) => Json(ApiResponse::success(BoardingCodeDto {
            boarding_code: code.as_str().to_string(),
        }))
        .into_response(),
        Err(err) => error_response(err),
    }
}

/// Driver checks one passenger's boarding code
#[utoipa::path(
    post,
    path = "/api/v1/rides/{ride_id}/validate-boarding",
    tag = "Rides",
    security(("bearer_auth" = [])),
    params(("ride_id" = Uuid, Path, description = "Ride ID")),
    request_body = ValidateBoardingRequest,
    responses(
        (status = 200, description = "Code accepted; ride_started reports the transition", body = ApiResponse<ValidateBoardingResponse>),
        (status = 400, description = "Code does not match"),
        (status = 403, description = "Caller is not the driver")
    )
)]
pub async fn validate_boarding(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ride_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ValidateBoardingRequest>,
) -> Response {
    match state
        .booking
        .validate_boarding(
            user.context(),
            ride_id,
            request.passenger_id,
            &request.code,
            request.all_validated,
        )
        .await
    {
        Ok(ride_started) => {
            Json(ApiResponse::success(ValidateBoardingResponse { ride_started }))
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Driver marks an ongoing ride as completed
#[utoipa::path(
    post,
    path = "/api/v1/rides/{ride_id}/complete",
    tag = "Rides",
    security(("bearer_auth" = [])),
    params(("ride_id" = Uuid, Path, description = "Ride ID")),
    responses(
        (status = 200, description = "Ride completed", body = ApiResponse<EmptyData>),
        (status = 403, description = "Caller is not the driver"),
        (status = 409, description = "Ride is not ongoing")
    )
)]
pub async fn complete_ride(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ride_id): Path<Uuid>,
) -> Response {
    match state.booking.complete_ride(user.context(), ride_id).await {
        Ok(()) => Json(ApiResponse::success(EmptyData {})).into_response(),
        Err(err) => error_response(err),
    }
}

/// Driver cancels a pending or ongoing ride
#[utoipa::path(
    post,
    path = "/api/v1/rides/{ride_id}/cancel",
    tag = "Rides",
    security(("bearer_auth" = [])),
    params(("ride_id" = Uuid, Path, description = "Ride ID")),
    responses(
        (status = 200, description = "Ride cancelled", body = ApiResponse<EmptyData>),
        (status = 403, description = "Caller is not the driver"),
        (status = 409, description = "Ride already finished")
    )
)]
pub async fn cancel_ride(
    State(state): State<RideAppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(ride_id): Path<Uuid>,
) -> Response {
    match state.booking.cancel_ride(user.context(), ride_id).await {
        Ok(()) => Json(ApiResponse::success(EmptyData {})).into_response(),
        Err(err) => error_response(err),
    }
}
