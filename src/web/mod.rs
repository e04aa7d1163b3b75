//! Browser-facing admin pages.
//!
//! Translates HTTP requests into [`crate::admin::AdminRequest`]s and renders
//! the resulting pages with Askama templates.
//!
//! # Modules
//!
//! - [`handlers`] - Request extraction and page rendering
//! - [`middleware`] - HTTP tracing
//! - [`routes`] - Admin route configuration

pub mod handlers;
pub mod middleware;
pub mod routes;
