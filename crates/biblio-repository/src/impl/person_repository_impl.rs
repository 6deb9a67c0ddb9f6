//! `PersonRepositoryImpl` — binds the generic DAO to the Person entity.

use std::sync::Arc;

use async_trait::async_trait;
use biblio_core::{BiblioError, BiblioResult, Filter, FilterMap, Person, Repository};
use tracing::debug;
use validator::Validate;

use crate::backend::StorageBackend;
use crate::dao::Dao;
use crate::traits::PersonRepository;

/// Person repository over any storage backend.
pub struct PersonRepositoryImpl {
    dao: Dao<Person>,
}

impl PersonRepositoryImpl {
    /// Creates a new person repository over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            dao: Dao::new(backend),
        }
    }

    fn validated(person: &Person) -> BiblioResult<()> {
        person
            .validate()
            .map_err(|e| BiblioError::validation(e.to_string()))
    }
}

#[async_trait]
impl Repository<Person, String> for PersonRepositoryImpl {
    fn create_entity(&self) -> Person {
        self.dao.create_entity()
    }

    async fn create(&self, entity: &Person) -> BiblioResult<String> {
        debug!("Repository: create person {}", entity.id);
        Self::validated(entity)?;
        self.dao.create(entity).await
    }

    async fn find_by_id(&self, id: &String) -> BiblioResult<Option<Person>> {
        self.dao.find_by_id(id).await
    }

    async fn find_all(&self) -> BiblioResult<Vec<Person>> {
        self.dao.find_all().await
    }

    async fn find_by_filter(&self, filters: &FilterMap) -> BiblioResult<Vec<Person>> {
        self.dao.find_by_filter(filters).await
    }

    async fn find_one_by_filter(&self, filters: &FilterMap) -> BiblioResult<Option<Person>> {
        self.dao.find_one_by_filter(filters).await
    }

    async fn update(&self, entity: &Person) -> BiblioResult<()> {
        debug!("Repository: update person {}", entity.id);
        Self::validated(entity)?;
        self.dao.update(entity).await
    }

    async fn delete(&self, id: &String) -> BiblioResult<()> {
        debug!("Repository: delete person {}", id);
        self.dao.delete(id).await
    }

    async fn count(&self) -> BiblioResult<u64> {
        self.dao.count().await
    }
}

#[async_trait]
impl PersonRepository for PersonRepositoryImpl {
    async fn find_one_by_name(&self, name: &str) -> BiblioResult<Option<Person>> {
        debug!("Repository: find_one_by_name {}", name);
        let mut filters = FilterMap::new();
        filters.insert("name".to_string(), Filter::equal(name)?);
        self.dao.find_one_by_filter(&filters).await
    }

    async fn find_by_name_like(&self, pattern: &str) -> BiblioResult<Vec<Person>> {
        debug!("Repository: find_by_name_like {}", pattern);
        let mut filters = FilterMap::new();
        filters.insert("name".to_string(), Filter::like(pattern)?);
        self.dao.find_by_filter(&filters).await
    }
}

impl std::fmt::Debug for PersonRepositoryImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonRepositoryImpl").finish_non_exhaustive()
    }
}
