//! Template candidate lists and path-based template resolution.

use crate::domain::entities::ModelKey;
use indexmap::IndexMap;
use serde::Deserialize;

/// Change form template action name.
pub const CHANGE_FORM: &str = "change_form";

/// Delete confirmation template action name.
pub const DELETE_CONFIRMATION: &str = "delete_confirmation";

/// Ordered template paths for `action` on a concrete type under `base`.
///
/// The concrete type's own path always comes before the base type's, so a
/// template shared by every subtype can live at the base path while any one
/// subtype may still override it. Generic fallbacks follow.
pub fn candidate_templates(action: &str, concrete: &ModelKey, base: &ModelKey) -> Vec<String> {
    let mut candidates = vec![
        format!("admin/{}/{}/{action}.html", concrete.app_label, concrete.model_name),
        format!("admin/{}/{}/{action}.html", base.app_label, base.model_name),
        format!("admin/{}/{action}.html", concrete.app_label),
    ];
    if base.app_label != concrete.app_label {
        candidates.push(format!("admin/{}/{action}.html", base.app_label));
    }
    candidates.push(format!("admin/polymorphic/{action}.html"));
    candidates.push(format!("admin/{action}.html"));
    candidates
}

/// Compiled page layout a template path maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One labelled input per line.
    #[default]
    Stacked,
    /// Fields laid out as table rows.
    Tabular,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub path: String,
    pub layout: Layout,
}

/// Resolves the first available template from an ordered candidate list.
pub trait TemplateResolver: Send + Sync {
    fn resolve(&self, candidates: &[String]) -> Option<ResolvedTemplate>;
}

/// The set of template paths this deployment provides.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    entries: IndexMap<String, Layout>,
}

impl TemplateSet {
    /// An empty set; nothing resolves.
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_template(mut self, path: impl Into<String>, layout: Layout) -> Self {
        self.insert(path, layout);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, layout: Layout) {
        self.entries.insert(path.into(), layout);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }
}

impl Default for TemplateSet {
    /// The generic templates every site ships with.
    fn default() -> Self {
        Self::empty()
            .with_template(format!("admin/{CHANGE_FORM}.html"), Layout::Stacked)
            .with_template(format!("admin/{DELETE_CONFIRMATION}.html"), Layout::Stacked)
    }
}

impl TemplateResolver for TemplateSet {
    fn resolve(&self, candidates: &[String]) -> Option<ResolvedTemplate> {
        candidates.iter().find_map(|path| {
            self.entries.get(path).map(|layout| ResolvedTemplate {
                path: path.clone(),
                layout: *layout,
            })
        })
    }
}
