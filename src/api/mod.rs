//! HTTP API

pub mod handlers;
pub mod routes;

pub use handlers::{error_response, ApiError, AppState};
pub use routes::build_router;
