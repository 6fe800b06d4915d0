//! Ride history API handlers

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::{extract::State, response::Response, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::ApiResponse;
use crate::application::HistoryService;
use crate::auth::AuthenticatedUser;

use super::error_response;

/// State for history handlers
#[derive(Clone)]
pub struct HistoryAppState {
    pub history: Arc<HistoryService>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntryDto {
    pub id: String,
    pub ride_id: String,
    pub driver_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// The caller's lifecycle feed, newest first
#[utoipa::path(
    get,
    path = "/api/v1/history",
    tag = "History",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "History entries", body = ApiResponse<Vec<HistoryEntryDto>>)
    )
)]
pub async fn get_history(
    State(state): State<HistoryAppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Response {
    match state.history.feed(user.context()).await {
        Ok(records) => {
            let dtos: Vec<HistoryEntryDto> = records
                .into_iter()
                .map(|r| HistoryEntryDto {
                    id: r.id.to_string(),
                    ride_id: r.ride_id.to_string(),
                    driver_name: r.driver_name,
                    message: r.message,
                    created_at: r.created_at,
                })
                .collect();
            Json(ApiResponse::success(dtos)).into_response()
        }
        Err(err) => error_response(err),
    }
}
