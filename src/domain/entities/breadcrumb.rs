//! Navigation breadcrumbs shown above admin pages.

use super::model::{ADMIN_ROOT, ModelMeta};

/// One `(label, link)` segment. An empty link marks the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub link: String,
}

impl Breadcrumb {
    pub fn new(label: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            link: link.into(),
        }
    }

    pub fn current(label: impl Into<String>) -> Self {
        Self::new(label, "")
    }
}

/// Ordered breadcrumb segments for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BreadcrumbTrail(pub Vec<Breadcrumb>);

impl BreadcrumbTrail {
    /// The trail the site builds for any model page:
    /// `Home › <model plural> › <current>`.
    pub fn default_for(meta: &ModelMeta, current: impl Into<String>) -> Self {
        Self(vec![
            Breadcrumb::new("Home", ADMIN_ROOT),
            Breadcrumb::new(meta.verbose_name_plural.clone(), meta.key.changelist_url()),
            Breadcrumb::current(current),
        ])
    }

    pub fn segments(&self) -> &[Breadcrumb] {
        &self.0
    }

    /// Replaces every segment whose link points at `from`'s change list with
    /// one naming `to`.
    pub fn replace_model(&mut self, from: &ModelMeta, to: &ModelMeta) {
        let from_link = from.key.changelist_url();
        for crumb in self.0.iter_mut().filter(|c| c.link == from_link) {
            *crumb = Breadcrumb::new(to.verbose_name_plural.clone(), to.key.changelist_url());
        }
    }
}
