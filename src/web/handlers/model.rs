//! Per-model handlers: change list, add, change and delete.

use crate::admin::{AdminRequest, AdminResponse};
use crate::domain::entities::ModelKey;
use crate::error::AppError;
use crate::state::AppState;
use crate::web::handlers::render;
use axum::Form;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;
use std::collections::HashMap;

/// Path parameters of `/admin/{app}/{model}[/{*rest}]`.
#[derive(Debug, Deserialize)]
pub struct ModelPath {
    app: String,
    model: String,
    /// Remainder after the change list URL; empty for the change list.
    #[serde(default)]
    rest: String,
}

impl ModelPath {
    fn key(&self) -> ModelKey {
        ModelKey::new(self.app.as_str(), self.model.as_str())
    }
}

/// Handles `GET` on any admin URL below a model.
///
/// # Errors
///
/// Returns 404 for unknown models, routes and records, 400 for invalid input
/// and 500 when a record's type is not registered.
pub async fn model_get_handler(
    State(state): State<AppState>,
    Path(path): Path<ModelPath>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    handle(&state, &path, AdminRequest::get(query)).await
}

/// Handles `POST` on any admin URL below a model.
///
/// # Errors
///
/// Same as [`model_get_handler`].
pub async fn model_post_handler(
    State(state): State<AppState>,
    Path(path): Path<ModelPath>,
    Query(query): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    handle(&state, &path, AdminRequest::post(query, form)).await
}

async fn handle(
    state: &AppState,
    path: &ModelPath,
    request: AdminRequest,
) -> Result<Response, AppError> {
    let key = path.key();
    let response = state
        .site
        .handle(&key, &path.rest, state.records.as_ref(), &request)
        .await?;

    if let AdminResponse::Redirect(location) = &response {
        tracing::debug!(model = %key, %location, "Redirecting");
    }
    render(&state.site, response)
}
