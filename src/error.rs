//! Crate-wide error type and its HTTP rendering.

use crate::domain::entities::ModelKey;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::{Value, json};

/// Errors raised by registration, resolution and request handling.
///
/// Registration errors (`DuplicateRegistration`, `MissingBaseModel`,
/// `NotASubtype`, `Config`) occur only while the site is being built and are
/// fatal. The rest are per-request and become error pages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{concrete} is already registered under {base}")]
    DuplicateRegistration { base: ModelKey, concrete: ModelKey },

    #[error("child admin for {concrete} was constructed without a base model")]
    MissingBaseModel { concrete: ModelKey },

    #[error("{concrete} is not a subtype of {base}")]
    NotASubtype { base: ModelKey, concrete: ModelKey },

    #[error("no {base} record with primary key {pk}")]
    UnknownRecord { base: ModelKey, pk: String },

    #[error("record {pk} under {base} has type {ctype}, which is not registered")]
    UnregisteredType {
        base: ModelKey,
        pk: String,
        ctype: ModelKey,
    },

    #[error("no admin page at {path:?}")]
    RouteNotFound { path: String },

    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status and a stable machine-readable code.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::UnknownRecord { .. } => (StatusCode::NOT_FOUND, "unknown_record"),
            Self::RouteNotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::UnregisteredType { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "unregistered_type")
            }
            Self::DuplicateRegistration { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "duplicate_registration")
            }
            Self::MissingBaseModel { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "missing_base_model")
            }
            Self::NotASubtype { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "not_a_subtype"),
            Self::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    fn details(&self) -> Value {
        match self {
            Self::Validation { details, .. } | Self::Internal { details, .. } => details.clone(),
            Self::UnknownRecord { base, pk } => json!({"model": base, "pk": pk}),
            Self::UnregisteredType { base, pk, ctype } => {
                json!({"model": base, "pk": pk, "discriminator": ctype})
            }
            _ => Value::Null,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/error.html")]
struct ErrorTemplate {
    status: u16,
    code: &'static str,
    message: String,
    details: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        let details = match self.details() {
            Value::Null => String::new(),
            v => serde_json::to_string_pretty(&v).unwrap_or_default(),
        };

        // Storage internals stay in the log.
        let message = match &self {
            Self::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let page = ErrorTemplate {
            status: status.as_u16(),
            code,
            message,
            details,
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (status, code).into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", e);
        AppError::internal("Database error", json!({}))
    }
}
