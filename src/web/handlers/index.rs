//! Site index handler.

use crate::admin::IndexEntry;
use crate::state::AppState;
use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::IntoResponse;

/// Renders `templates/admin/index.html`.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub entries: Vec<IndexEntry>,
}

/// Lists every parent admin and the child admins shown in the index.
///
/// # Endpoint
///
/// `GET /admin`
pub async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    IndexTemplate {
        title: "Site administration".to_string(),
        entries: state.site.index(),
    }
}
