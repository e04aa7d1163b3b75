//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/admin/*` - Admin site (see [`crate::web::routes`])
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::state::AppState;
use crate::web;
use crate::web::middleware::trace;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// The admin routes with state applied, without path normalization.
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .nest("/admin", web::routes::admin_routes())
        .with_state(state)
        .layer(trace::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(admin_router(state))
}
