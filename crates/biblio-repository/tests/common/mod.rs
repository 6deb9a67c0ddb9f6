//! Common infrastructure for repository integration tests.

use biblio_repository::{MemoryBackend, StorageBackend};
use std::sync::Arc;

/// Fresh, empty in-memory backend.
pub fn memory_backend() -> Arc<dyn StorageBackend> {
    Arc::new(MemoryBackend::new())
}

/// Initializes the tracing subscriber for test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}
