//! Entity schemas: the field registry backing filter validation.
//!
//! Every entity type declares a static [`EntitySchema`] listing its fields
//! and their comparison-compatible kinds. The query translator consults the
//! schema to validate filter maps before anything reaches a backend.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Declared type of an entity field, as seen by the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 text.
    Text,
    /// Signed integer.
    Integer,
    /// Floating-point number.
    Float,
    /// Boolean flag.
    Boolean,
    /// Point in time, carried as an RFC 3339 string at the record level.
    Timestamp,
}

impl FieldKind {
    /// Whether ordering comparisons are defined for this kind.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        !matches!(self, Self::Boolean)
    }

    /// Whether a JSON value is acceptable as a comparison value for this kind.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Integer => value.as_i64().is_some(),
            Self::Float => value.as_f64().is_some(),
            Self::Boolean => value.is_boolean(),
            Self::Timestamp => value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A single declared entity field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Field name, matching both the serde field and the backend column.
    pub name: &'static str,
    /// Comparison-compatible kind.
    pub kind: FieldKind,
}

/// Static descriptor for one entity type: its logical name, its backend
/// table, its identifier field, and the full field registry.
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    /// Logical entity name used in diagnostics.
    pub entity: &'static str,
    /// Backend table or collection name.
    pub table: &'static str,
    /// Name of the identifier field; must appear in `fields`.
    pub id_field: &'static str,
    /// All declared fields, including the identifier.
    pub fields: &'static [FieldDef],
}

impl EntitySchema {
    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A domain entity managed through the generic DAO.
///
/// `Default` acts as the entity factory: it produces a fresh, unpersisted
/// instance with a generated identifier and empty payload fields.
pub trait StoredEntity:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    /// Identifier type for this entity.
    type Id: Serialize + DeserializeOwned + Clone + fmt::Display + Send + Sync + 'static;

    /// The static schema describing this entity's fields.
    fn schema() -> &'static EntitySchema;

    /// The entity's identifier.
    fn id(&self) -> &Self::Id;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_kind_accepts() {
        assert!(FieldKind::Text.accepts(&json!("Alice")));
        assert!(!FieldKind::Text.accepts(&json!(42)));

        assert!(FieldKind::Integer.accepts(&json!(2020)));
        assert!(!FieldKind::Integer.accepts(&json!(1.5)));
        assert!(!FieldKind::Integer.accepts(&json!("2020")));

        assert!(FieldKind::Float.accepts(&json!(1.5)));
        assert!(FieldKind::Float.accepts(&json!(3)));

        assert!(FieldKind::Boolean.accepts(&json!(true)));
        assert!(!FieldKind::Boolean.accepts(&json!(0)));

        assert!(FieldKind::Timestamp.accepts(&json!("2020-01-01T00:00:00Z")));
        assert!(!FieldKind::Timestamp.accepts(&json!("yesterday")));
        assert!(!FieldKind::Timestamp.accepts(&json!(1_577_836_800)));
    }

    #[test]
    fn test_field_kind_ordering() {
        assert!(FieldKind::Text.is_ordered());
        assert!(FieldKind::Integer.is_ordered());
        assert!(FieldKind::Timestamp.is_ordered());
        assert!(!FieldKind::Boolean.is_ordered());
    }

    #[test]
    fn test_schema_field_lookup() {
        static SCHEMA: EntitySchema = EntitySchema {
            entity: "sample",
            table: "samples",
            id_field: "id",
            fields: &[
                FieldDef {
                    name: "id",
                    kind: FieldKind::Text,
                },
                FieldDef {
                    name: "weight",
                    kind: FieldKind::Float,
                },
            ],
        };

        assert_eq!(SCHEMA.field("weight").unwrap().kind, FieldKind::Float);
        assert!(SCHEMA.field("missing").is_none());
    }
}
