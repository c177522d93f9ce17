//! API routes module - organizes all route handlers.

pub mod app_state;
pub mod error;
pub mod import;
pub mod openapi;
pub mod projects;

use axum::Router;
use axum::extract::DefaultBodyLimit;
// Re-export AppState from app_state module for convenience
pub use app_state::AppState;

/// Create the main API router combining all route modules
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/projects", projects::projects_router())
        .nest("/import", import::import_router())
        // OpenAPI documentation endpoints
        .merge(openapi::openapi_router())
        .layer(DefaultBodyLimit::max(import::MAX_IMPORT_BYTES))
    // Note: State is applied by callers who need it (e.g., TestServer)
    // For production use, call .with_state(app_state) after creating the router
}
