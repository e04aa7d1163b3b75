//! Polymorphic admin core.
//!
//! One [`ParentAdmin`] owns the listing of a base type and a
//! [`TypeRegistry`] of concrete child types. Per-record operations are
//! resolved through the record's stored discriminator and forwarded to the
//! [`ChildAdmin`] of its concrete type, whose form and fieldsets are
//! reconciled against that type's fields.
//!
//! # Modules
//!
//! - [`site`] - Registration and the frozen [`AdminSite`]
//! - [`registry`] - Discriminator to child handler lookup
//! - [`reconciler`] - Effective form and fieldsets for a concrete type
//! - [`child`] / [`parent`] - Handlers
//! - [`dispatcher`] - Sub-path routing
//! - [`filter`] - Change list type filter
//! - [`templates`] - Template candidates and resolution
//! - [`manifest`] - JSON site declarations

pub mod child;
pub mod dispatcher;
pub mod filter;
pub mod manifest;
pub mod parent;
pub mod reconciler;
pub mod registry;
pub mod site;
pub mod templates;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use child::{ChildAdmin, ChildAdminConfig};
pub use dispatcher::{AdminRoute, Dispatcher};
pub use filter::TypeFilter;
pub use manifest::{LoadedSite, SiteManifest};
pub use parent::{ParentAdmin, ParentAdminConfig};
pub use reconciler::reconcile;
pub use registry::{ChildTypeDescriptor, TypeRegistry};
pub use site::{AdminEntry, AdminSite, AdminSiteBuilder, ChildTypes, IndexEntry};
pub use templates::{Layout, TemplateResolver, TemplateSet};
pub use view::{AdminRequest, AdminResponse, Page};
