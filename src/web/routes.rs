//! Admin route configuration.

use crate::state::AppState;
use crate::web::handlers::{index_handler, model_get_handler, model_post_handler};
use axum::{Router, routing::get};

/// Routes mounted under `/admin`.
///
/// # Endpoints
///
/// - `GET /` - Site index
/// - `GET /{app}/{model}` - Change list (children redirect to their parent)
/// - `GET|POST /{app}/{model}/add` - Add, with type selection for parents
/// - `GET|POST /{app}/{model}/{pk}/change` - Change form
/// - `GET|POST /{app}/{model}/{pk}/delete` - Delete confirmation
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route(
            "/{app}/{model}",
            get(model_get_handler).post(model_post_handler),
        )
        .route(
            "/{app}/{model}/{*rest}",
            get(model_get_handler).post(model_post_handler),
        )
}
