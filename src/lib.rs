//! # RidePool
//!
//! Carpool booking service: drivers schedule rides, group members book
//! seats and receive one-time boarding codes, the driver validates codes
//! at boarding, and every lifecycle event lands in a per-user history
//! feed.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities and repository traits
//! - **application**: Business logic (booking engine, groups, accounts)
//! - **infrastructure**: Storage backends (SeaORM, in-memory)
//! - **api**: REST API with Swagger documentation
//! - **auth**: JWT authentication

pub mod api;
pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export the pieces main() wires together
pub use api::{create_router, AppState};
pub use infrastructure::{init_database, MemoryProvider, SeaOrmRepositoryProvider};
