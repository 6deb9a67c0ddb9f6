//! In-memory storage backend.
//!
//! Keeps every table in process memory behind a `parking_lot` lock and
//! evaluates predicates directly against records. Supports the full
//! operator set; predicate semantics mirror MySQL (three-valued logic for
//! null fields, `%`/`_` wildcards for `LIKE`) so the test suites agree
//! across backends.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use biblio_core::{
    BiblioError, BiblioResult, Clause, EntitySchema, FieldKind, Operator, Predicate,
};
use chrono::DateTime;
use parking_lot::RwLock;
use serde_json::Value;

use crate::backend::{Record, StorageBackend};

type Table = BTreeMap<String, Record>;

/// In-process storage backend; data lives for the process lifetime.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(id: &Value) -> String {
        match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn supports(&self, _operator: Operator) -> bool {
        true
    }

    async fn select(
        &self,
        schema: &'static EntitySchema,
        predicate: &Predicate,
    ) -> BiblioResult<Vec<Record>> {
        let tables = self.tables.read();
        let Some(table) = tables.get(schema.table) else {
            return Ok(Vec::new());
        };
        Ok(table
            .values()
            .filter(|record| matches(predicate, record))
            .cloned()
            .collect())
    }

    async fn fetch(
        &self,
        schema: &'static EntitySchema,
        id: &Value,
    ) -> BiblioResult<Option<Record>> {
        let tables = self.tables.read();
        Ok(tables
            .get(schema.table)
            .and_then(|table| table.get(&Self::key(id)))
            .cloned())
    }

    async fn insert(&self, schema: &'static EntitySchema, record: Record) -> BiblioResult<()> {
        let id = record
            .get(schema.id_field)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| {
                BiblioError::persistence(format!(
                    "record for '{}' is missing its identifier",
                    schema.entity
                ))
            })?;
        let key = Self::key(&id);

        let mut tables = self.tables.write();
        let table = tables.entry(schema.table).or_default();
        if table.contains_key(&key) {
            return Err(BiblioError::persistence(format!(
                "duplicate identifier '{}' for '{}'",
                key, schema.entity
            )));
        }
        table.insert(key, record);
        Ok(())
    }

    async fn update(
        &self,
        schema: &'static EntitySchema,
        id: &Value,
        record: Record,
    ) -> BiblioResult<()> {
        let key = Self::key(id);
        let mut tables = self.tables.write();
        let slot = tables
            .get_mut(schema.table)
            .and_then(|table| table.get_mut(&key));
        match slot {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(BiblioError::not_found(schema.entity, key)),
        }
    }

    async fn delete(&self, schema: &'static EntitySchema, id: &Value) -> BiblioResult<()> {
        let key = Self::key(id);
        let mut tables = self.tables.write();
        let removed = tables
            .get_mut(schema.table)
            .and_then(|table| table.remove(&key));
        match removed {
            Some(_) => Ok(()),
            None => Err(BiblioError::not_found(schema.entity, key)),
        }
    }

    async fn count(
        &self,
        schema: &'static EntitySchema,
        predicate: &Predicate,
    ) -> BiblioResult<u64> {
        let tables = self.tables.read();
        let Some(table) = tables.get(schema.table) else {
            return Ok(0);
        };
        Ok(table
            .values()
            .filter(|record| matches(predicate, record))
            .count() as u64)
    }
}

fn matches(predicate: &Predicate, record: &Record) -> bool {
    predicate
        .clauses()
        .iter()
        .all(|clause| clause_matches(clause, record))
}

fn clause_matches(clause: &Clause, record: &Record) -> bool {
    let Some(field) = record.get(clause.field) else {
        return false;
    };
    // Three-valued logic: a null field satisfies no clause, NotEqual included.
    if field.is_null() {
        return false;
    }
    match clause.operator {
        Operator::Equal => compare(clause.kind, field, &clause.value) == Some(Ordering::Equal),
        Operator::NotEqual => {
            matches!(compare(clause.kind, field, &clause.value), Some(o) if o != Ordering::Equal)
        }
        Operator::GreaterThan => {
            compare(clause.kind, field, &clause.value) == Some(Ordering::Greater)
        }
        Operator::GreaterOrEqual => matches!(
            compare(clause.kind, field, &clause.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::LessThan => compare(clause.kind, field, &clause.value) == Some(Ordering::Less),
        Operator::LessOrEqual => matches!(
            compare(clause.kind, field, &clause.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Like => match (field.as_str(), clause.value.as_str()) {
            (Some(text), Some(pattern)) => like_match(text, pattern),
            _ => false,
        },
        Operator::In => clause
            .value
            .as_array()
            .into_iter()
            .flatten()
            .any(|item| compare(clause.kind, field, item) == Some(Ordering::Equal)),
    }
}

/// Kind-aware comparison of a record field against a filter value.
fn compare(kind: FieldKind, field: &Value, value: &Value) -> Option<Ordering> {
    match kind {
        FieldKind::Text => Some(field.as_str()?.cmp(value.as_str()?)),
        FieldKind::Integer => Some(field.as_i64()?.cmp(&value.as_i64()?)),
        FieldKind::Float => field.as_f64()?.partial_cmp(&value.as_f64()?),
        // Booleans only ever reach the equality operators; translation
        // rejects ordering on them.
        FieldKind::Boolean => {
            if field.as_bool()? == value.as_bool()? {
                Some(Ordering::Equal)
            } else {
                Some(Ordering::Less)
            }
        }
        FieldKind::Timestamp => {
            let field = DateTime::parse_from_rfc3339(field.as_str()?).ok()?;
            let value = DateTime::parse_from_rfc3339(value.as_str()?).ok()?;
            Some(field.cmp(&value))
        }
    }
}

/// SQL `LIKE` over chars: `%` matches any sequence, `_` any single char.
/// Case-sensitive, no escape sequence.
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let mut table = vec![vec![false; pattern.len() + 1]; text.len() + 1];
    table[0][0] = true;
    for j in 1..=pattern.len() {
        if pattern[j - 1] == '%' {
            table[0][j] = table[0][j - 1];
        }
    }
    for i in 1..=text.len() {
        for j in 1..=pattern.len() {
            table[i][j] = match pattern[j - 1] {
                '%' => table[i][j - 1] || table[i - 1][j],
                '_' => table[i - 1][j - 1],
                c => table[i - 1][j - 1] && text[i - 1] == c,
            };
        }
    }
    table[text.len()][pattern.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_core::{translate, Filter, FilterMap, Person, StoredEntity};
    use serde_json::json;

    fn record(id: &str, name: &str) -> Record {
        let Value::Object(map) = json!({
            "id": id,
            "name": name,
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z",
        }) else {
            unreachable!()
        };
        map
    }

    fn name_filter(filter: Filter) -> Predicate {
        let mut filters = FilterMap::new();
        filters.insert("name".to_string(), filter);
        translate(Person::schema(), &filters).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let backend = MemoryBackend::new();
        backend
            .insert(Person::schema(), record("p1", "Alice"))
            .await
            .unwrap();

        let found = backend
            .fetch(Person::schema(), &json!("p1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get("name").unwrap(), "Alice");

        assert!(backend
            .fetch(Person::schema(), &json!("p2"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_a_persistence_error() {
        let backend = MemoryBackend::new();
        backend
            .insert(Person::schema(), record("p1", "Alice"))
            .await
            .unwrap();
        let err = backend
            .insert(Person::schema(), record("p1", "Alice again"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
    }

    #[tokio::test]
    async fn test_update_and_delete_absent_are_not_found() {
        let backend = MemoryBackend::new();
        let err = backend
            .update(Person::schema(), &json!("ghost"), record("ghost", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");

        let err = backend
            .delete(Person::schema(), &json!("ghost"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_select_applies_conjunction() {
        let backend = MemoryBackend::new();
        backend
            .insert(Person::schema(), record("p1", "Alice"))
            .await
            .unwrap();
        backend
            .insert(Person::schema(), record("p2", "Bob"))
            .await
            .unwrap();

        let matched = backend
            .select(
                Person::schema(),
                &name_filter(Filter::equal("Bob").unwrap()),
            )
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].get("id").unwrap(), "p2");

        let all = backend
            .select(Person::schema(), &Predicate::match_all())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_select_with_in_membership() {
        let backend = MemoryBackend::new();
        for (id, name) in [("p1", "Alice"), ("p2", "Bob"), ("p3", "Carol")] {
            backend
                .insert(Person::schema(), record(id, name))
                .await
                .unwrap();
        }

        let matched = backend
            .select(
                Person::schema(),
                &name_filter(Filter::is_in(vec!["Alice", "Carol"]).unwrap()),
            )
            .await
            .unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[tokio::test]
    async fn test_null_field_satisfies_no_clause() {
        let backend = MemoryBackend::new();
        let mut rec = record("p1", "Alice");
        rec.insert("name".to_string(), Value::Null);
        backend.insert(Person::schema(), rec).await.unwrap();

        let equal = backend
            .select(
                Person::schema(),
                &name_filter(Filter::equal("Alice").unwrap()),
            )
            .await
            .unwrap();
        assert!(equal.is_empty());

        let not_equal = backend
            .select(
                Person::schema(),
                &name_filter(Filter::not_equal("Alice").unwrap()),
            )
            .await
            .unwrap();
        assert!(not_equal.is_empty());
    }

    #[test]
    fn test_like_match_wildcards() {
        assert!(like_match("Bob Dylan", "Bob%"));
        assert!(like_match("Bob", "Bob%"));
        assert!(like_match("Bob Dylan", "%Dylan"));
        assert!(like_match("Bob Dylan", "%b D%"));
        assert!(like_match("Bob", "B_b"));
        assert!(like_match("", "%"));

        assert!(!like_match("Bob", "bob"));
        assert!(!like_match("Bob", "B_"));
        assert!(!like_match("Alice", "%Dylan%"));
        assert!(!like_match("", "_"));
    }

    #[test]
    fn test_compare_timestamps_by_instant() {
        // Same instant, different offsets.
        assert_eq!(
            compare(
                FieldKind::Timestamp,
                &json!("2024-03-01T10:00:00+01:00"),
                &json!("2024-03-01T09:00:00Z"),
            ),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare(
                FieldKind::Timestamp,
                &json!("2024-03-01T10:00:00Z"),
                &json!("2024-03-01T09:00:00Z"),
            ),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_compare_numbers() {
        assert_eq!(
            compare(FieldKind::Integer, &json!(2020), &json!(2021)),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare(FieldKind::Float, &json!(1.5), &json!(1.5)),
            Some(Ordering::Equal)
        );
        // Kind mismatch yields no ordering, hence no match.
        assert_eq!(compare(FieldKind::Integer, &json!("x"), &json!(1)), None);
    }
}
