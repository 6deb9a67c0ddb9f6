//! Storage backend contract.
//!
//! The narrow interface every storage technology satisfies. Backends own
//! connection acquisition and release; every method is a single bounded
//! round trip, and read methods must not mutate backend state.

use async_trait::async_trait;
use biblio_core::{BiblioResult, EntitySchema, Operator, Predicate};
use serde_json::Value;

/// Backend-native row/record representation: field name to JSON value.
pub type Record = serde_json::Map<String, Value>;

/// Narrow contract between the generic DAO and a storage technology.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Backend name, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this backend can express the given operator.
    fn supports(&self, operator: Operator) -> bool;

    /// Returns all records of `schema` satisfying `predicate`.
    async fn select(
        &self,
        schema: &'static EntitySchema,
        predicate: &Predicate,
    ) -> BiblioResult<Vec<Record>>;

    /// Returns the record with the given identifier, if present.
    async fn fetch(
        &self,
        schema: &'static EntitySchema,
        id: &Value,
    ) -> BiblioResult<Option<Record>>;

    /// Persists a new record. Fails with `Persistence` on a duplicate
    /// identifier.
    async fn insert(&self, schema: &'static EntitySchema, record: Record) -> BiblioResult<()>;

    /// Replaces the record with the given identifier. Fails with `NotFound`
    /// if absent.
    async fn update(
        &self,
        schema: &'static EntitySchema,
        id: &Value,
        record: Record,
    ) -> BiblioResult<()>;

    /// Removes the record with the given identifier. Fails with `NotFound`
    /// if absent.
    async fn delete(&self, schema: &'static EntitySchema, id: &Value) -> BiblioResult<()>;

    /// Counts records satisfying `predicate`.
    async fn count(
        &self,
        schema: &'static EntitySchema,
        predicate: &Predicate,
    ) -> BiblioResult<u64>;
}
