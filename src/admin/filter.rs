//! Change list filter narrowing a base listing to one concrete type.

use crate::admin::registry::TypeRegistry;
use crate::admin::view::{AdminRequest, FilterOption};
use crate::domain::entities::ModelKey;
use crate::error::AppError;
use serde_json::json;

/// Query parameter carrying the selected concrete type.
pub const TYPE_FILTER_PARAM: &str = "ctype";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilterChoice {
    pub ctype: ModelKey,
    pub label: String,
}

/// Filter over the concrete types registered for one base type.
#[derive(Debug, Clone)]
pub struct TypeFilter {
    changelist_url: String,
    choices: Vec<TypeFilterChoice>,
}

impl TypeFilter {
    /// Options follow the registry's registration order.
    pub fn from_registry(registry: &TypeRegistry) -> Self {
        Self {
            changelist_url: registry.base().key.changelist_url(),
            choices: registry
                .list_types()
                .map(|d| TypeFilterChoice {
                    ctype: d.model.clone(),
                    label: d.label().to_string(),
                })
                .collect(),
        }
    }

    pub fn choices(&self) -> &[TypeFilterChoice] {
        &self.choices
    }

    /// The concrete type selected by the request, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the parameter names a type that is
    /// not one of the choices.
    pub fn selected(&self, request: &AdminRequest) -> Result<Option<ModelKey>, AppError> {
        let Some(raw) = request.query.get(TYPE_FILTER_PARAM).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        let ctype: ModelKey = raw.parse()?;
        if self.choices.iter().any(|c| c.ctype == ctype) {
            Ok(Some(ctype))
        } else {
            Err(AppError::bad_request(
                "Unknown type filter",
                json!({TYPE_FILTER_PARAM: raw}),
            ))
        }
    }

    /// Sidebar entries: "All" followed by one entry per type.
    pub fn options(&self, selected: Option<&ModelKey>) -> Vec<FilterOption> {
        let mut options = Vec::with_capacity(self.choices.len() + 1);
        options.push(FilterOption {
            label: "All".to_string(),
            url: self.changelist_url.clone(),
            selected: selected.is_none(),
        });
        options.extend(self.choices.iter().map(|choice| FilterOption {
            label: choice.label.clone(),
            url: format!("{}?{}={}", self.changelist_url, TYPE_FILTER_PARAM, choice.ctype),
            selected: selected == Some(&choice.ctype),
        }));
        options
    }
}
