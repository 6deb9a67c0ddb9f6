//! # Biblio Repository
//!
//! Data access layer: a generic, filterable DAO over pluggable storage
//! backends.
//!
//! ```text
//! caller
//!   ↓ Arc<dyn PersonRepository>     (entity-level interface)
//! PersonRepositoryImpl              (binds entity type + convenience queries)
//!   ↓ Dao<Person>                   (generic CRUD + filter engine)
//!   ↓ Arc<dyn StorageBackend>       (narrow backend contract)
//! MemoryBackend / MySqlBackend
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   backend.rs                      ← StorageBackend trait + Record
//!   record.rs                       ← entity ⇄ record codec
//!   dao/                            ← Dao<E> generic engine
//!   memory/                         ← in-memory backend
//!   mysql/                          ← MySQL backend
//!   pool.rs                         ← connection pool + migrations
//!   traits.rs                       ← PersonRepository, PublicationRepository
//!   impl/                           ← repository implementations
//!   bootstrap.rs                    ← explicit wiring
//! ```

pub mod backend;
pub mod bootstrap;
pub mod dao;
pub mod r#impl;
pub mod memory;
pub mod mysql;
pub mod pool;
pub mod record;
pub mod traits;

pub use backend::{Record, StorageBackend};
pub use bootstrap::{bootstrap, build_backend, Repositories};
pub use dao::Dao;
pub use memory::MemoryBackend;
pub use mysql::MySqlBackend;
pub use pool::DatabasePool;
pub use r#impl::{PersonRepositoryImpl, PublicationRepositoryImpl};
pub use traits::*;
