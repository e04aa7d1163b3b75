//! The admin site: registration at startup, read-only request handling after.
//!
//! # Lifetime of registry state
//!
//! All registration goes through [`AdminSiteBuilder`], which is owned by the
//! startup code and mutated on one thread. [`AdminSiteBuilder::build`]
//! consumes the builder and returns an `Arc<AdminSite>` that exposes no
//! mutating method. Request handlers share that `Arc` across tasks and read
//! registries without any locking: the only mutation happens before the
//! first request is served.

use crate::admin::child::{ChildAdmin, ChildAdminConfig};
use crate::admin::dispatcher::{AdminRoute, Dispatcher};
use crate::admin::parent::{ParentAdmin, ParentAdminConfig};
use crate::admin::templates::TemplateSet;
use crate::admin::view::{AdminRequest, AdminResponse};
use crate::domain::entities::{ModelKey, ModelMeta};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;
use indexmap::IndexMap;
use std::sync::Arc;

/// The child types attached to a parent at registration.
pub enum ChildTypes {
    /// Concrete types, in the order they are offered to users.
    Listed(Vec<ModelKey>),
    /// Evaluated once, when the parent is registered.
    Provider(Box<dyn FnOnce() -> Vec<ModelKey> + Send>),
}

impl ChildTypes {
    fn into_keys(self) -> Vec<ModelKey> {
        match self {
            Self::Listed(keys) => keys,
            Self::Provider(provide) => provide(),
        }
    }
}

impl From<Vec<ModelKey>> for ChildTypes {
    fn from(keys: Vec<ModelKey>) -> Self {
        Self::Listed(keys)
    }
}

/// A child admin and the dispatcher its URLs are routed with.
#[derive(Debug)]
struct ChildEntry {
    admin: Arc<ChildAdmin>,
    dispatcher: Dispatcher,
}

/// Entry on the site index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub model: ModelKey,
    pub label: String,
    pub url: String,
    /// Whether this entry is a base type listing.
    pub is_parent: bool,
}

/// What a model key is registered as.
#[derive(Debug, Clone, Copy)]
pub enum AdminEntry<'a> {
    Parent(&'a ParentAdmin),
    Child(&'a ChildAdmin),
}

/// Collects registrations during startup.
pub struct AdminSiteBuilder {
    defaults: ParentAdminConfig,
    templates: TemplateSet,
    children: IndexMap<ModelKey, Arc<ChildAdmin>>,
    parents: IndexMap<ModelKey, ParentAdmin>,
}

impl Default for AdminSiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminSiteBuilder {
    pub fn new() -> Self {
        Self {
            defaults: ParentAdminConfig::default(),
            templates: TemplateSet::default(),
            children: IndexMap::new(),
            parents: IndexMap::new(),
        }
    }

    /// Parent options applied when a registration passes none.
    pub fn with_defaults(mut self, defaults: ParentAdminConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = templates;
        self
    }

    /// Registers the admin for one concrete type.
    ///
    /// Children must be registered before the parent that lists them.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::MissingBaseModel`] if `base` is `None` and
    /// [`AppError::DuplicateRegistration`] if `concrete` already has an admin.
    pub fn register_child(
        &mut self,
        concrete: ModelMeta,
        base: Option<Arc<ModelMeta>>,
        config: ChildAdminConfig,
    ) -> Result<Arc<ChildAdmin>, AppError> {
        let key = concrete.key.clone();
        let admin = Arc::new(ChildAdmin::new(concrete, base, config)?);

        if self.children.contains_key(&key) {
            return Err(AppError::DuplicateRegistration {
                base: admin.base_model().key.clone(),
                concrete: key,
            });
        }

        tracing::info!(model = %key, base = %admin.base_model().key, "Registered child admin");
        self.children.insert(key, admin.clone());
        Ok(admin)
    }

    /// Registers the admin for a base type and attaches its child types.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the base type is already registered,
    /// a listed child has no registered admin, or the pk pattern is invalid.
    /// Registry errors ([`AppError::DuplicateRegistration`],
    /// [`AppError::NotASubtype`]) propagate.
    pub fn register_parent(
        &mut self,
        base: Arc<ModelMeta>,
        child_types: impl Into<ChildTypes>,
        config: Option<ParentAdminConfig>,
    ) -> Result<(), AppError> {
        let key = base.key.clone();
        if self.parents.contains_key(&key) {
            return Err(AppError::Config(format!("parent admin for {key} registered twice")));
        }

        let mut parent = ParentAdmin::new(base, config.unwrap_or_else(|| self.defaults.clone()))?;
        for child_key in child_types.into().into_keys() {
            let child = self.children.get(&child_key).ok_or_else(|| {
                AppError::Config(format!(
                    "{child_key} is listed under {key} but has no child admin"
                ))
            })?;
            parent.register_child(child.clone())?;
        }

        tracing::info!(
            model = %key,
            children = parent.registry().len(),
            "Registered parent admin"
        );
        self.parents.insert(key, parent);
        Ok(())
    }

    /// Freezes the registrations.
    ///
    /// A child's URLs use its parent's pk pattern, or the default options'
    /// pattern when no parent lists it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if that default pattern is invalid.
    pub fn build(self) -> Result<Arc<AdminSite>, AppError> {
        let mut children = IndexMap::with_capacity(self.children.len());
        for (key, admin) in self.children {
            let dispatcher = match self.parents.get(&admin.base_model().key) {
                Some(parent) => parent.dispatcher().clone(),
                None => Dispatcher::new(&self.defaults.pk_pattern)?,
            };
            children.insert(key, ChildEntry { admin, dispatcher });
        }

        Ok(Arc::new(AdminSite {
            parents: self.parents,
            children,
            templates: self.templates,
        }))
    }
}

/// A fully built admin site. Immutable; see the module docs.
#[derive(Debug)]
pub struct AdminSite {
    parents: IndexMap<ModelKey, ParentAdmin>,
    children: IndexMap<ModelKey, ChildEntry>,
    templates: TemplateSet,
}

impl AdminSite {
    pub fn builder() -> AdminSiteBuilder {
        AdminSiteBuilder::new()
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn parents(&self) -> impl Iterator<Item = &ParentAdmin> {
        self.parents.values()
    }

    pub fn parent(&self, key: &ModelKey) -> Option<&ParentAdmin> {
        self.parents.get(key)
    }

    pub fn child(&self, key: &ModelKey) -> Option<&ChildAdmin> {
        self.children.get(key).map(|entry| entry.admin.as_ref())
    }

    pub fn lookup(&self, key: &ModelKey) -> Option<AdminEntry<'_>> {
        self.parent(key)
            .map(AdminEntry::Parent)
            .or_else(|| self.child(key).map(AdminEntry::Child))
    }

    /// Navigation entries: every parent, followed by its children that opted
    /// into the index. Hidden children stay routable.
    pub fn index(&self) -> Vec<IndexEntry> {
        let mut entries = Vec::new();
        for parent in self.parents.values() {
            let meta = parent.model();
            entries.push(IndexEntry {
                model: meta.key.clone(),
                label: meta.verbose_name_plural.clone(),
                url: meta.key.changelist_url(),
                is_parent: true,
            });
            entries.extend(
                parent
                    .registry()
                    .list_types()
                    .filter(|d| d.show_in_index)
                    .map(|d| IndexEntry {
                        model: d.model.clone(),
                        label: d.meta().verbose_name_plural.clone(),
                        url: d.model.changelist_url(),
                        is_parent: false,
                    }),
            );
        }
        entries
    }

    /// Handles `path` relative to the change list URL of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::RouteNotFound`] if `key` has no admin or `path`
    /// matches no route. Handler errors propagate.
    pub async fn handle(
        &self,
        key: &ModelKey,
        path: &str,
        repository: &dyn RecordRepository,
        request: &AdminRequest,
    ) -> Result<AdminResponse, AppError> {
        if let Some(parent) = self.parents.get(key) {
            return parent.dispatch(repository, path, request).await;
        }

        let entry = self.children.get(key).ok_or_else(|| AppError::RouteNotFound {
            path: format!("{}/{}", key.changelist_url(), path.trim_matches('/')),
        })?;
        let child = &entry.admin;

        let route = entry.dispatcher.route(path).ok_or_else(|| AppError::RouteNotFound {
            path: path.to_string(),
        })?;
        tracing::debug!(model = %key, ?route, "Dispatching to child admin");

        match route {
            AdminRoute::ChangeList => Ok(AdminResponse::Redirect(
                child.base_model().key.changelist_url(),
            )),
            AdminRoute::Add => child.add_view(repository, request).await,
            AdminRoute::Change(pk) => child.change_view(repository, &pk, request).await,
            AdminRoute::Delete(pk) => child.delete_view(repository, &pk, request).await,
        }
    }
}
