//! Generic DAO engine.
//!
//! [`Dao<E>`] gives any entity type a uniform create/read/update/delete and
//! find-by-filter surface, independent of the storage technology behind it.
//! It holds no entity state — only the backend handle it was bound to at
//! construction — so one instance is safe to share across tasks.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use biblio_core::{
    translate, BiblioError, BiblioResult, FilterMap, Predicate, Repository, StoredEntity,
};
use tracing::debug;

use crate::backend::StorageBackend;
use crate::record;

/// Generic data access object, bound to one entity type and one backend.
pub struct Dao<E: StoredEntity> {
    backend: Arc<dyn StorageBackend>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: StoredEntity> Dao<E> {
    /// Creates a DAO over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    /// Produces a fresh, unpersisted entity instance.
    #[must_use]
    pub fn create_entity(&self) -> E {
        E::default()
    }

    /// Persists a new entity and returns its identifier.
    pub async fn create(&self, entity: &E) -> BiblioResult<E::Id> {
        debug!("dao[{}]: create {}", E::schema().entity, entity.id());
        let rec = record::encode(entity)?;
        self.backend.insert(E::schema(), rec).await?;
        Ok(entity.id().clone())
    }

    /// Finds an entity by its identifier. A miss is `None`, not an error.
    pub async fn find_by_id(&self, id: &E::Id) -> BiblioResult<Option<E>> {
        debug!("dao[{}]: find_by_id {}", E::schema().entity, id);
        let id_value = record::id_value::<E>(id)?;
        match self.backend.fetch(E::schema(), &id_value).await? {
            Some(rec) => Ok(Some(record::decode(rec)?)),
            None => Ok(None),
        }
    }

    /// Updates an existing entity. Fails with `NotFound` if its identifier
    /// is not present in the backend.
    pub async fn update(&self, entity: &E) -> BiblioResult<()> {
        debug!("dao[{}]: update {}", E::schema().entity, entity.id());
        let id_value = record::id_value::<E>(entity.id())?;
        let rec = record::encode(entity)?;
        self.backend.update(E::schema(), &id_value, rec).await
    }

    /// Deletes an entity by identifier. Fails with `NotFound` if absent;
    /// deleting the same identifier twice errors the second time.
    pub async fn delete(&self, id: &E::Id) -> BiblioResult<()> {
        debug!("dao[{}]: delete {}", E::schema().entity, id);
        let id_value = record::id_value::<E>(id)?;
        self.backend.delete(E::schema(), &id_value).await
    }

    /// Returns all entities satisfying the conjunction of filters. No match
    /// is an empty vector, never an error.
    pub async fn find_by_filter(&self, filters: &FilterMap) -> BiblioResult<Vec<E>> {
        let predicate = self.translate_checked(filters)?;
        let records = self.backend.select(E::schema(), &predicate).await?;
        records.into_iter().map(record::decode).collect()
    }

    /// Returns one entity satisfying the filters, or `None`. When several
    /// entities match, the backend decides which one is returned — no
    /// ordering is guaranteed.
    pub async fn find_one_by_filter(&self, filters: &FilterMap) -> BiblioResult<Option<E>> {
        Ok(self.find_by_filter(filters).await?.into_iter().next())
    }

    /// Returns every persisted entity of the bound type.
    pub async fn find_all(&self) -> BiblioResult<Vec<E>> {
        self.find_by_filter(&FilterMap::new()).await
    }

    /// Counts all persisted entities of the bound type.
    pub async fn count(&self) -> BiblioResult<u64> {
        self.backend
            .count(E::schema(), &Predicate::match_all())
            .await
    }

    /// Translates the filter map and gates on backend operator support
    /// before anything is dispatched.
    fn translate_checked(&self, filters: &FilterMap) -> BiblioResult<Predicate> {
        let predicate = translate(E::schema(), filters)?;
        for clause in predicate.clauses() {
            if !self.backend.supports(clause.operator) {
                return Err(BiblioError::UnsupportedOperator {
                    backend: self.backend.name(),
                    operator: clause.operator,
                });
            }
        }
        Ok(predicate)
    }
}

impl<E: StoredEntity> Clone for Dao<E> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _entity: PhantomData,
        }
    }
}

impl<E: StoredEntity> std::fmt::Debug for Dao<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dao")
            .field("entity", &E::schema().entity)
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<E: StoredEntity> Repository<E, E::Id> for Dao<E> {
    fn create_entity(&self) -> E {
        Self::create_entity(self)
    }

    async fn create(&self, entity: &E) -> BiblioResult<E::Id> {
        Self::create(self, entity).await
    }

    async fn find_by_id(&self, id: &E::Id) -> BiblioResult<Option<E>> {
        Self::find_by_id(self, id).await
    }

    async fn find_all(&self) -> BiblioResult<Vec<E>> {
        Self::find_all(self).await
    }

    async fn find_by_filter(&self, filters: &FilterMap) -> BiblioResult<Vec<E>> {
        Self::find_by_filter(self, filters).await
    }

    async fn find_one_by_filter(&self, filters: &FilterMap) -> BiblioResult<Option<E>> {
        Self::find_one_by_filter(self, filters).await
    }

    async fn update(&self, entity: &E) -> BiblioResult<()> {
        Self::update(self, entity).await
    }

    async fn delete(&self, id: &E::Id) -> BiblioResult<()> {
        Self::delete(self, id).await
    }

    async fn count(&self) -> BiblioResult<u64> {
        Self::count(self).await
    }
}
