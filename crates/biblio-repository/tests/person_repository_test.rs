//! Integration tests for the person repository over the in-memory backend.

mod common;

use biblio_core::{Filter, FilterMap, Person, Repository};
use biblio_repository::{PersonRepository, PersonRepositoryImpl};
use common::{init_tracing, memory_backend};
use std::sync::Arc;

fn repo() -> PersonRepositoryImpl {
    PersonRepositoryImpl::new(memory_backend())
}

fn name_filter(filter: Filter) -> FilterMap {
    let mut filters = FilterMap::new();
    filters.insert("name".to_string(), filter);
    filters
}

#[tokio::test]
async fn test_create_and_find_by_id_round_trip() {
    init_tracing();
    let repo = repo();

    let person = Person::new("Alice");
    let id = repo.create(&person).await.expect("Failed to create person");
    assert_eq!(id, person.id);

    let found = repo
        .find_by_id(&id)
        .await
        .expect("Query failed")
        .expect("Person not found");
    assert_eq!(found, person);
}

#[tokio::test]
async fn test_find_by_id_miss_is_none_not_an_error() {
    let repo = repo();
    let result = repo.find_by_id(&"missing".to_string()).await.expect("Query failed");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_duplicate_identifier_is_a_persistence_error() {
    let repo = repo();

    let person = Person::new("Alice");
    repo.create(&person).await.expect("Failed to create person");

    let mut twin = Person::new("Alice again");
    twin.id = person.id.clone();
    let err = repo.create(&twin).await.unwrap_err();
    assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
}

#[tokio::test]
async fn test_create_entity_is_fresh_and_unpersisted() {
    let repo = repo();

    let a = repo.create_entity();
    let b = repo.create_entity();
    assert_ne!(a.id, b.id);
    assert!(a.name.is_empty());
    assert_eq!(repo.count().await.expect("Query failed"), 0);
}

#[tokio::test]
async fn test_create_validates_the_entity() {
    let repo = repo();
    // A fresh entity has no name yet.
    let blank = repo.create_entity();
    let err = repo.create(&blank).await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert_eq!(repo.count().await.expect("Query failed"), 0);
}

#[tokio::test]
async fn test_update_persists_changes() {
    let repo = repo();

    let mut person = Person::new("Alice");
    repo.create(&person).await.expect("Failed to create person");

    person.rename("Alice B.");
    repo.update(&person).await.expect("Failed to update person");

    let found = repo
        .find_by_id(&person.id)
        .await
        .expect("Query failed")
        .expect("Person not found");
    assert_eq!(found.name, "Alice B.");
}

#[tokio::test]
async fn test_update_missing_is_not_found_and_leaves_state_unchanged() {
    let repo = repo();

    let person = Person::new("Alice");
    repo.create(&person).await.expect("Failed to create person");

    let ghost = Person::new("Ghost");
    let err = repo.update(&ghost).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");

    let all = repo.find_all().await.expect("Query failed");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Alice");
}

#[tokio::test]
async fn test_delete_then_find_is_none_and_second_delete_fails() {
    let repo = repo();

    let person = Person::new("Alice");
    repo.create(&person).await.expect("Failed to create person");

    repo.delete(&person.id).await.expect("Failed to delete person");
    assert!(repo
        .find_by_id(&person.id)
        .await
        .expect("Query failed")
        .is_none());

    let err = repo.delete(&person.id).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_empty_filter_map_returns_every_person() {
    let repo = repo();

    for name in ["Alice", "Bob", "Carol"] {
        repo.create(&Person::new(name)).await.expect("Failed to create person");
    }

    let all = repo.find_by_filter(&FilterMap::new()).await.expect("Query failed");
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_find_one_by_name() {
    let repo = repo();

    repo.create(&Person::new("Alice")).await.expect("Failed to create person");

    let found = repo
        .find_one_by_name("Alice")
        .await
        .expect("Query failed")
        .expect("Person not found");
    assert_eq!(found.name, "Alice");
}

#[tokio::test]
async fn test_two_same_named_persons() {
    let repo = repo();

    repo.create(&Person::new("Bob")).await.expect("Failed to create person");
    repo.create(&Person::new("Bob")).await.expect("Failed to create person");
    repo.create(&Person::new("Carol")).await.expect("Failed to create person");

    let bobs = repo
        .find_by_filter(&name_filter(Filter::equal("Bob").unwrap()))
        .await
        .expect("Query failed");
    assert_eq!(bobs.len(), 2);

    // Which of the two comes back is backend-defined, but one must.
    let one = repo
        .find_one_by_name("Bob")
        .await
        .expect("Query failed")
        .expect("Person not found");
    assert_eq!(one.name, "Bob");
}

#[tokio::test]
async fn test_find_one_by_name_on_empty_store_is_none() {
    let repo = repo();
    let result = repo.find_one_by_name("Nobody").await.expect("Query failed");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_find_by_name_like() {
    let repo = repo();

    for name in ["Bob Dylan", "Bob Marley", "Alice"] {
        repo.create(&Person::new(name)).await.expect("Failed to create person");
    }

    let bobs = repo.find_by_name_like("Bob%").await.expect("Query failed");
    assert_eq!(bobs.len(), 2);

    let dylan = repo.find_by_name_like("%Dylan").await.expect("Query failed");
    assert_eq!(dylan.len(), 1);
    assert_eq!(dylan[0].name, "Bob Dylan");
}

#[tokio::test]
async fn test_filter_on_unknown_field_is_invalid() {
    let repo = repo();

    let mut filters = FilterMap::new();
    filters.insert("age".to_string(), Filter::equal(30).unwrap());
    let err = repo.find_by_filter(&filters).await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_FILTER");
}

#[tokio::test]
async fn test_concurrent_creates_against_one_repository() {
    let repo = Arc::new(repo());

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                repo.create(&Person::new(format!("person-{}", i)))
                    .await
                    .expect("Failed to create person");
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("Task panicked");
    }

    assert_eq!(repo.count().await.expect("Query failed"), 5);
}
