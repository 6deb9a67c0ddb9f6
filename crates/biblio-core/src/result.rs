//! Result type alias for Biblio operations.

use crate::BiblioError;

/// A specialized `Result` type for Biblio operations.
pub type BiblioResult<T> = Result<T, BiblioError>;
