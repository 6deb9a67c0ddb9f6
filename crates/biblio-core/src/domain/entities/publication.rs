//! Publication entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{EntitySchema, FieldDef, FieldKind, StoredEntity};

static PUBLICATION_SCHEMA: EntitySchema = EntitySchema {
    entity: "publication",
    table: "publications",
    id_field: "id",
    fields: &[
        FieldDef {
            name: "id",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "title",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "year",
            kind: FieldKind::Integer,
        },
        FieldDef {
            name: "created_at",
            kind: FieldKind::Timestamp,
        },
        FieldDef {
            name: "updated_at",
            kind: FieldKind::Timestamp,
        },
    ],
};

/// A published work in the bibliography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Publication {
    /// Stable assigned identifier.
    pub id: String,

    /// Publication title.
    #[validate(length(min = 1, max = 512))]
    pub title: String,

    /// Year of publication.
    pub year: i32,

    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Publication {
    /// Creates a publication with a generated identifier.
    #[must_use]
    pub fn new(title: impl Into<String>, year: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            year,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for Publication {
    fn default() -> Self {
        Self::new(String::new(), 0)
    }
}

impl StoredEntity for Publication {
    type Id = String;

    fn schema() -> &'static EntitySchema {
        &PUBLICATION_SCHEMA
    }

    fn id(&self) -> &String {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_declares_year_as_integer() {
        let field = Publication::schema().field("year").unwrap();
        assert_eq!(field.kind, FieldKind::Integer);
    }

    #[test]
    fn test_validation_rejects_empty_title() {
        assert!(Publication::default().validate().is_err());
        assert!(Publication::new("On Sieves", 1979).validate().is_ok());
    }
}
