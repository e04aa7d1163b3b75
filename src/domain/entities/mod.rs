//! Core domain entities describing polymorphic models and their records.
//!
//! Entities are plain data structures; the admin machinery in
//! [`crate::admin`] interprets them.
//!
//! # Entity Types
//!
//! - [`ModelKey`] / [`ModelMeta`] - Type identifiers and field declarations
//! - [`Record`] - A stored record tagged with its concrete type
//! - [`Fieldset`] / [`FormSpec`] - Form layout declarations
//! - [`BreadcrumbTrail`] - Per-request navigation context
//!
//! Creation and updates use separate structs: [`NewRecord`] and [`RecordPatch`].

pub mod breadcrumb;
pub mod layout;
pub mod model;
pub mod record;

pub use breadcrumb::{Breadcrumb, BreadcrumbTrail};
pub use layout::{Fieldset, FormSpec};
pub use model::{ADMIN_ROOT, FieldDef, FieldKind, ModelKey, ModelMeta};
pub use record::{NewRecord, Record, RecordPatch, RecordQuery};
