//! Framework-neutral request and response types for admin views.
//!
//! Handlers in [`crate::admin`] consume an [`AdminRequest`] and produce an
//! [`AdminResponse`]; the web layer turns pages into HTML.

use crate::domain::entities::{BreadcrumbTrail, ModelKey};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An admin request: method, query string and submitted form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRequest {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
}

impl AdminRequest {
    pub fn get(query: HashMap<String, String>) -> Self {
        Self {
            method: Method::Get,
            query,
            form: HashMap::new(),
        }
    }

    pub fn post(query: HashMap<String, String>, form: HashMap<String, String>) -> Self {
        Self {
            method: Method::Post,
            query,
            form,
        }
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::Post
    }

    /// Looks a parameter up in the form first, then the query string.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.form
            .get(name)
            .or_else(|| self.query.get(name))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminResponse {
    Page(Page),
    /// See-other redirect to the given path.
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    ChangeList(ChangeListPage),
    SelectType(SelectTypePage),
    ChangeForm(ChangeFormPage),
    DeleteConfirmation(DeletePage),
}

/// Base type listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeListPage {
    pub title: String,
    pub model: ModelKey,
    pub breadcrumbs: BreadcrumbTrail,
    pub columns: Vec<String>,
    pub rows: Vec<ChangeListRow>,
    pub filter: Vec<FilterOption>,
    pub add_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeListRow {
    pub pk: String,
    pub type_label: String,
    pub cells: Vec<String>,
    pub change_url: String,
    pub delete_url: String,
}

/// One entry of the type filter sidebar.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub label: String,
    pub url: String,
    pub selected: bool,
}

/// First step of adding a record: choosing its concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectTypePage {
    pub title: String,
    pub breadcrumbs: BreadcrumbTrail,
    pub action_url: String,
    pub choices: Vec<TypeChoice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeChoice {
    pub label: String,
    pub value: String,
    pub url: String,
}

/// Add or change form for one concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeFormPage {
    pub title: String,
    pub form_name: String,
    pub breadcrumbs: BreadcrumbTrail,
    /// Template paths to try, most specific first.
    pub templates: Vec<String>,
    pub action_url: String,
    pub delete_url: Option<String>,
    pub fieldsets: Vec<FieldsetView>,
    pub has_errors: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldsetView {
    pub name: String,
    pub collapsible: bool,
    pub rows: Vec<FieldRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub name: String,
    pub label: String,
    pub input_type: &'static str,
    pub value: String,
    pub checked: bool,
    pub required: bool,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletePage {
    pub title: String,
    pub breadcrumbs: BreadcrumbTrail,
    pub templates: Vec<String>,
    pub object_label: String,
    pub type_label: String,
    pub action_url: String,
    pub cancel_url: String,
}
