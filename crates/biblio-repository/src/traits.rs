//! Repository trait definitions.

use async_trait::async_trait;
use biblio_core::{BiblioResult, Person, Publication, Repository};

/// Person repository: generic CRUD plus named convenience queries.
#[async_trait]
pub trait PersonRepository: Repository<Person, String> {
    /// Finds one person by exact name. With several same-named persons the
    /// backend decides which one is returned.
    async fn find_one_by_name(&self, name: &str) -> BiblioResult<Option<Person>>;

    /// Finds persons whose name matches a pattern (`%`, `_` wildcards).
    async fn find_by_name_like(&self, pattern: &str) -> BiblioResult<Vec<Person>>;
}

/// Publication repository: generic CRUD plus named convenience queries.
#[async_trait]
pub trait PublicationRepository: Repository<Publication, String> {
    /// Finds publications whose title matches a pattern (`%`, `_` wildcards).
    async fn find_by_title_like(&self, pattern: &str) -> BiblioResult<Vec<Publication>>;

    /// Finds publications from one year.
    async fn find_by_year(&self, year: i32) -> BiblioResult<Vec<Publication>>;

    /// Finds publications from `year` onwards, inclusive.
    async fn find_published_since(&self, year: i32) -> BiblioResult<Vec<Publication>>;
}
