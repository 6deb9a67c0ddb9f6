//! Explicit construction of the persistence layer.
//!
//! No container-managed wiring: the caller hands in an [`AppConfig`] and
//! receives fully constructed repositories sharing one backend. Schema
//! migrations run here, before any repository is handed out.

use std::sync::Arc;

use biblio_config::{AppConfig, StorageDriver};
use biblio_core::BiblioResult;
use tracing::info;

use crate::backend::StorageBackend;
use crate::memory::MemoryBackend;
use crate::mysql::MySqlBackend;
use crate::pool::DatabasePool;
use crate::r#impl::{PersonRepositoryImpl, PublicationRepositoryImpl};

/// The wired repository set.
pub struct Repositories {
    /// Person repository.
    pub persons: Arc<PersonRepositoryImpl>,
    /// Publication repository.
    pub publications: Arc<PublicationRepositoryImpl>,
}

/// Builds the configured storage backend and wires every repository to it.
pub async fn bootstrap(config: &AppConfig) -> BiblioResult<Repositories> {
    let backend = build_backend(config).await?;
    Ok(Repositories {
        persons: Arc::new(PersonRepositoryImpl::new(Arc::clone(&backend))),
        publications: Arc::new(PublicationRepositoryImpl::new(backend)),
    })
}

/// Constructs the storage backend selected by the configuration.
pub async fn build_backend(config: &AppConfig) -> BiblioResult<Arc<dyn StorageBackend>> {
    match config.database.driver {
        StorageDriver::Memory => {
            info!("Using in-memory storage backend");
            Ok(Arc::new(MemoryBackend::new()))
        }
        StorageDriver::MySql => {
            let pool = Arc::new(DatabasePool::new(&config.database).await?);
            if config.database.migrate_on_start {
                pool.run_migrations().await?;
            }
            Ok(Arc::new(MySqlBackend::new(pool)))
        }
    }
}
