//! Routing of admin sub-paths to handler views.
//!
//! Paths are matched relative to a model's change list, with leading and
//! trailing slashes ignored:
//!
//! - `""`             - change list
//! - `add`            - add view
//! - `{pk}/change`    - change view (`{pk}` alone is accepted too)
//! - `{pk}/delete`    - delete view
//!
//! `{pk}` must match the configured primary key pattern in full, so the
//! pattern needs no anchors of its own; a leading `^` and trailing `$` are
//! ignored. It must not define a group named `pk`. The default
//! pattern accepts decimal integers only; deployments with other key formats
//! (UUIDs, slugs) must configure a matching pattern or their records become
//! unreachable.

use crate::admin::parent::ParentAdmin;
use crate::admin::view::{AdminRequest, AdminResponse};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;
use regex::Regex;

/// Default primary key pattern: decimal integers.
pub const DEFAULT_PK_PATTERN: &str = r"\d+";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRoute {
    ChangeList,
    Add,
    Change(String),
    Delete(String),
}

/// Maps sub-paths to [`AdminRoute`]s. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    record_route: Regex,
}

impl Dispatcher {
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if `pk_pattern` is not a valid regex or
    /// defines its own `pk` group.
    pub fn new(pk_pattern: &str) -> Result<Self, AppError> {
        if pk_pattern.contains("?P<pk>") || pk_pattern.contains("?<pk>") {
            return Err(AppError::Config(format!(
                "invalid pk_pattern {pk_pattern:?}: the `pk` group is reserved"
            )));
        }
        let pk_pattern = strip_anchors(pk_pattern);
        let record_route = Regex::new(&format!(
            r"^(?P<pk>(?:{pk_pattern}))(?:/(?P<action>change|delete))?$"
        ))
        .map_err(|e| AppError::Config(format!("invalid pk_pattern {pk_pattern:?}: {e}")))?;

        Ok(Self { record_route })
    }

    pub fn route(&self, path: &str) -> Option<AdminRoute> {
        let path = path.trim_matches('/');
        match path {
            "" => return Some(AdminRoute::ChangeList),
            "add" => return Some(AdminRoute::Add),
            _ => {}
        }

        let captures = self.record_route.captures(path)?;
        let pk = captures.name("pk")?.as_str().to_string();
        match captures.name("action").map(|m| m.as_str()) {
            Some("delete") => Some(AdminRoute::Delete(pk)),
            _ => Some(AdminRoute::Change(pk)),
        }
    }

    /// Routes `path` to the parent admin's views.
    ///
    /// Handler errors propagate unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RouteNotFound`] if `path` matches no route.
    pub async fn dispatch(
        &self,
        parent: &ParentAdmin,
        repository: &dyn RecordRepository,
        path: &str,
        request: &AdminRequest,
    ) -> Result<AdminResponse, AppError> {
        let route = self.route(path).ok_or_else(|| AppError::RouteNotFound {
            path: path.to_string(),
        })?;
        tracing::debug!(model = %parent.model().key, ?route, "Dispatching");

        match route {
            AdminRoute::ChangeList => parent.changelist_view(repository, request).await,
            AdminRoute::Add => parent.add_view(request).await,
            AdminRoute::Change(pk) => parent.change_view(repository, &pk, request).await,
            AdminRoute::Delete(pk) => parent.delete_view(repository, &pk, request).await,
        }
    }
}

/// Drops a leading `^` and an unescaped trailing `$`.
fn strip_anchors(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    match pattern.strip_suffix('$') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => pattern,
    }
}
