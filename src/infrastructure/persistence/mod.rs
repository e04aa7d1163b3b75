//! Record repository implementations.
//!
//! # Repositories
//!
//! - [`PgRecordRepository`] - PostgreSQL storage, one JSONB document per record
//! - [`InMemoryRecordRepository`] - Process-local storage for demos and tests

pub mod memory_record_repository;
pub mod pg_record_repository;

pub use memory_record_repository::InMemoryRecordRepository;
pub use pg_record_repository::PgRecordRepository;
