//! Repository trait for polymorphic record storage.

use crate::domain::entities::{ModelKey, NewRecord, Record, RecordPatch, RecordQuery};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage collaborator for polymorphic records.
///
/// Every record carries an immutable discriminator (`ctype`) naming its
/// concrete type. The admin core only relies on two capabilities beyond
/// plain CRUD: looking up that discriminator by primary key, and listing a
/// base type's records without materializing each concrete type.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRecordRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryRecordRepository`] - Process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Returns the concrete type of the record `pk` stored under `base`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ModelKey))` if the record exists
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn fetch_discriminator(
        &self,
        base: &ModelKey,
        pk: &str,
    ) -> Result<Option<ModelKey>, AppError>;

    /// Lists records under `query.base`, in primary key order.
    ///
    /// With `query.polymorphic == false` only `query.base_fields` are
    /// returned for every record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn query(&self, query: &RecordQuery) -> Result<Vec<Record>, AppError>;

    /// Fetches a record with all of its concrete type's fields.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn get(&self, base: &ModelKey, pk: &str) -> Result<Option<Record>, AppError>;

    /// Creates a record; its discriminator is `new_record.ctype`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_record: NewRecord) -> Result<Record, AppError>;

    /// Overwrites the given field values. The discriminator never changes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownRecord`] if no record matches.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn update(
        &self,
        base: &ModelKey,
        pk: &str,
        patch: RecordPatch,
    ) -> Result<Record, AppError>;

    /// Deletes a record. Returns `Ok(false)` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn delete(&self, base: &ModelKey, pk: &str) -> Result<bool, AppError>;
}
