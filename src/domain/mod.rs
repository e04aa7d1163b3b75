//! Domain layer: model metadata, records and the storage contract.
//!
//! # Architecture
//!
//! - [`entities`] - Model descriptions, records, form layouts, breadcrumbs
//! - [`repositories`] - Storage trait implemented by the infrastructure layer
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers.

pub mod entities;
pub mod repositories;
