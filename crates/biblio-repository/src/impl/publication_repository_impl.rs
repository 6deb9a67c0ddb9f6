//! `PublicationRepositoryImpl` — binds the generic DAO to the Publication
//! entity.

use std::sync::Arc;

use async_trait::async_trait;
use biblio_core::{BiblioError, BiblioResult, Filter, FilterMap, Publication, Repository};
use tracing::debug;
use validator::Validate;

use crate::backend::StorageBackend;
use crate::dao::Dao;
use crate::traits::PublicationRepository;

/// Publication repository over any storage backend.
pub struct PublicationRepositoryImpl {
    dao: Dao<Publication>,
}

impl PublicationRepositoryImpl {
    /// Creates a new publication repository over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            dao: Dao::new(backend),
        }
    }

    fn validated(publication: &Publication) -> BiblioResult<()> {
        publication
            .validate()
            .map_err(|e| BiblioError::validation(e.to_string()))
    }
}

#[async_trait]
impl Repository<Publication, String> for PublicationRepositoryImpl {
    fn create_entity(&self) -> Publication {
        self.dao.create_entity()
    }

    async fn create(&self, entity: &Publication) -> BiblioResult<String> {
        debug!("Repository: create publication {}", entity.id);
        Self::validated(entity)?;
        self.dao.create(entity).await
    }

    async fn find_by_id(&self, id: &String) -> BiblioResult<Option<Publication>> {
        self.dao.find_by_id(id).await
    }

    async fn find_all(&self) -> BiblioResult<Vec<Publication>> {
        self.dao.find_all().await
    }

    async fn find_by_filter(&self, filters: &FilterMap) -> BiblioResult<Vec<Publication>> {
        self.dao.find_by_filter(filters).await
    }

    async fn find_one_by_filter(
        &self,
        filters: &FilterMap,
    ) -> BiblioResult<Option<Publication>> {
        self.dao.find_one_by_filter(filters).await
    }

    async fn update(&self, entity: &Publication) -> BiblioResult<()> {
        debug!("Repository: update publication {}", entity.id);
        Self::validated(entity)?;
        self.dao.update(entity).await
    }

    async fn delete(&self, id: &String) -> BiblioResult<()> {
        debug!("Repository: delete publication {}", id);
        self.dao.delete(id).await
    }

    async fn count(&self) -> BiblioResult<u64> {
        self.dao.count().await
    }
}

#[async_trait]
impl PublicationRepository for PublicationRepositoryImpl {
    async fn find_by_title_like(&self, pattern: &str) -> BiblioResult<Vec<Publication>> {
        debug!("Repository: find_by_title_like {}", pattern);
        let mut filters = FilterMap::new();
        filters.insert("title".to_string(), Filter::like(pattern)?);
        self.dao.find_by_filter(&filters).await
    }

    async fn find_by_year(&self, year: i32) -> BiblioResult<Vec<Publication>> {
        debug!("Repository: find_by_year {}", year);
        let mut filters = FilterMap::new();
        filters.insert("year".to_string(), Filter::equal(year)?);
        self.dao.find_by_filter(&filters).await
    }

    async fn find_published_since(&self, year: i32) -> BiblioResult<Vec<Publication>> {
        debug!("Repository: find_published_since {}", year);
        let mut filters = FilterMap::new();
        filters.insert("year".to_string(), Filter::greater_or_equal(year)?);
        self.dao.find_by_filter(&filters).await
    }
}

impl std::fmt::Debug for PublicationRepositoryImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicationRepositoryImpl")
            .finish_non_exhaustive()
    }
}
