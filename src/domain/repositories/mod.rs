//! Repository trait definitions for the domain layer.
//!
//! The admin core treats storage as an external collaborator: it only sees
//! the [`RecordRepository`] trait. Implementations live in
//! `crate::infrastructure::persistence`; mocks are generated via `mockall`
//! for unit tests.

pub mod record_repository;

pub use record_repository::RecordRepository;

#[cfg(test)]
pub use record_repository::MockRecordRepository;
