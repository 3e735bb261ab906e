//! FLEETLOG API - REST Layer
//!
//! Axum routes for the trip form workflow and admin review. Submitting a form
//! triggers the mileage audit from `fleetlog-audit`.

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use types::*;
