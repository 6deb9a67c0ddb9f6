//! Generic repository contract.

use async_trait::async_trait;

use crate::filter::FilterMap;
use crate::BiblioResult;

/// Base repository trait: uniform CRUD and filtered reads over one entity
/// type, independent of storage technology.
#[async_trait]
pub trait Repository<T, Id>: Send + Sync
where
    T: Send + Sync,
    Id: Send + Sync,
{
    /// Produces a fresh, unpersisted entity instance.
    fn create_entity(&self) -> T;

    /// Persists a new entity and returns its identifier.
    async fn create(&self, entity: &T) -> BiblioResult<Id>;

    /// Finds an entity by its identifier. A miss is `None`, not an error.
    async fn find_by_id(&self, id: &Id) -> BiblioResult<Option<T>>;

    /// Returns every persisted entity of this type.
    async fn find_all(&self) -> BiblioResult<Vec<T>>;

    /// Returns all entities satisfying the conjunction of filters.
    async fn find_by_filter(&self, filters: &FilterMap) -> BiblioResult<Vec<T>>;

    /// Returns one entity satisfying the filters, or `None`. With several
    /// matches the backend decides which is returned.
    async fn find_one_by_filter(&self, filters: &FilterMap) -> BiblioResult<Option<T>>;

    /// Updates an existing entity. Fails with `NotFound` if absent.
    async fn update(&self, entity: &T) -> BiblioResult<()>;

    /// Deletes an entity by identifier. Fails with `NotFound` if absent.
    async fn delete(&self, id: &Id) -> BiblioResult<()>;

    /// Counts all persisted entities of this type.
    async fn count(&self) -> BiblioResult<u64>;
}
