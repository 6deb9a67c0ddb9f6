//! # Biblio Core
//!
//! Core types for the Biblio persistence layer: the unified error taxonomy,
//! the filter/operator model, entity schemas, and the query translator
//! shared by every storage backend.

pub mod domain;
pub mod error;
pub mod filter;
pub mod query;
pub mod result;
pub mod schema;
pub mod traits;

pub use domain::*;
pub use error::*;
pub use filter::*;
pub use query::*;
pub use result::*;
pub use schema::*;
pub use traits::*;
