//! API router with Swagger UI

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::dto::{ApiResponse, EmptyData};
use crate::api::handlers::{auth, drivers, groups, health, history, rides};
use crate::application::{
    AccountService, BookingService, DriverService, GroupService, HistoryService,
};
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::auth::JwtConfig;
use crate::domain::RepositoryProvider;

/// Unified state for all routes. Axum extracts the specific handler
/// state via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub accounts: Arc<AccountService>,
    pub booking: Arc<BookingService>,
    pub drivers: Arc<DriverService>,
    pub groups: Arc<GroupService>,
    pub history: Arc<HistoryService>,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self {
            accounts: Arc::new(AccountService::new(Arc::clone(&repos))),
            booking: Arc::new(BookingService::new(Arc::clone(&repos))),
            drivers: Arc::new(DriverService::new(Arc::clone(&repos))),
            groups: Arc::new(GroupService::new(Arc::clone(&repos))),
            history: Arc::new(HistoryService::new(Arc::clone(&repos))),
            auth: AuthState { jwt_config },
            repos,
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<AppState> for auth::AuthHandlerState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthHandlerState {
            accounts: Arc::clone(&s.accounts),
            jwt_config: s.auth.jwt_config.clone(),
        }
    }
}

impl FromRef<AppState> for rides::RideAppState {
    fn from_ref(s: &AppState) -> Self {
        rides::RideAppState {
            booking: Arc::clone(&s.booking),
            repos: Arc::clone(&s.repos),
        }
    }
}

impl FromRef<AppState> for drivers::DriverAppState {
    fn from_ref(s: &AppState) -> Self {
        drivers::DriverAppState {
            drivers: Arc::clone(&s.drivers),
        }
    }
}

impl FromRef<AppState> for groups::GroupAppState {
    fn from_ref(s: &AppState) -> Self {
        groups::GroupAppState {
            groups: Arc::clone(&s.groups),
            repos: Arc::clone(&s.repos),
        }
    }
}

impl FromRef<AppState> for history::HistoryAppState {
    fn from_ref(s: &AppState) -> Self {
        history::HistoryAppState {
            history: Arc::clone(&s.history),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::get_current_user,
        // Rides
        rides::create_ride,
        rides::list_related,
        rides::list_bookable,
        rides::get_ride,
        rides::book_ride,
        rides::unbook_ride,
        rides::boarding_manifest,
        rides::my_boarding_code,
        rides::validate_boarding,
        rides::complete_ride,
        rides::cancel_ride,
        // Drivers
        drivers::create_driver,
        drivers::get_driver,
        drivers::update_driver,
        // Groups
        groups::create_group,
        groups::list_groups,
        groups::get_group,
        groups::update_group,
        groups::add_member,
        groups::remove_member,
        groups::delete_group,
        groups::list_notifications,
        groups::mark_notifications_read,
        // History
        history::get_history,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            EmptyData,
            // Health
            health::HealthStatus,
            // Auth
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Rides
            rides::CreateRideRequest,
            rides::RideDto,
            rides::PassengerDto,
            rides::BoardingCodeDto,
            rides::ManifestEntryDto,
            rides::ValidateBoardingRequest,
            rides::ValidateBoardingResponse,
            // Drivers
            drivers::DriverProfileRequest,
            drivers::DriverDto,
            // Groups
            groups::CreateGroupRequest,
            groups::UpdateGroupRequest,
            groups::AddMemberRequest,
            groups::GroupDto,
            groups::GroupOverviewDto,
            groups::MemberDto,
            groups::NotificationDto,
            // History
            history::HistoryEntryDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check."),
        (name = "Authentication", description = "Account registration and login. The JWT is returned in `token` and passed as `Authorization: Bearer <token>`."),
        (name = "Rides", description = "Ride lifecycle: scheduling, seat booking with one-time boarding codes, driver-side boarding validation, completion and cancellation."),
        (name = "Drivers", description = "Driver profile management. A complete profile unlocks ride creation."),
        (name = "Groups", description = "Carpool groups and new-ride notifications. Members of the driver's groups are notified when a ride is scheduled."),
        (name = "History", description = "Per-user ride lifecycle feed."),
    ),
    info(
        title = "RidePool API",
        version = "1.0.0",
        description = "REST API for a carpool booking service: drivers schedule rides, group members book seats and receive one-time boarding codes, and every lifecycle event lands in a per-user history feed."
    )
)]
pub struct ApiDoc;

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth.clone();

    let public = Router::new()
        .route("/api/v1/health", get(health::health_check))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::get_current_user))
        // Rides
        .route(
            "/api/v1/rides",
            post(rides::create_ride).get(rides::list_related),
        )
        .route("/api/v1/rides/available", get(rides::list_bookable))
        .route("/api/v1/rides/{ride_id}", get(rides::get_ride))
        .route("/api/v1/rides/{ride_id}/book", post(rides::book_ride))
        .route("/api/v1/rides/{ride_id}/unbook", post(rides::unbook_ride))
        .route(
            "/api/v1/rides/{ride_id}/manifest",
            get(rides::boarding_manifest),
        )
        .route(
            "/api/v1/rides/{ride_id}/boarding-code",
            get(rides::my_boarding_code),
        )
        .route(
            "/api/v1/rides/{ride_id}/validate-boarding",
            post(rides::validate_boarding),
        )
        .route(
            "/api/v1/rides/{ride_id}/complete",
            post(rides::complete_ride),
        )
        .route("/api/v1/rides/{ride_id}/cancel", post(rides::cancel_ride))
        // Drivers
        .route("/api/v1/drivers", post(drivers::create_driver))
        .route(
            "/api/v1/drivers/me",
            get(drivers::get_driver).put(drivers::update_driver),
        )
        // Groups
        .route(
            "/api/v1/groups",
            post(groups::create_group).get(groups::list_groups),
        )
        .route(
            "/api/v1/groups/{group_id}",
            get(groups::get_group)
                .put(groups::update_group)
                .delete(groups::delete_group),
        )
        .route(
            "/api/v1/groups/{group_id}/members",
            post(groups::add_member),
        )
        .route(
            "/api/v1/groups/{group_id}/members/{user_id}",
            delete(groups::remove_member),
        )
        .route(
            "/api/v1/groups/{group_id}/notifications/read",
            post(groups::mark_notifications_read),
        )
        .route("/api/v1/notifications", get(groups::list_notifications))
        // History
        .route("/api/v1/history", get(history::get_history))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
