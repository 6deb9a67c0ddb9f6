//! Person entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{EntitySchema, FieldDef, FieldKind, StoredEntity};

static PERSON_SCHEMA: EntitySchema = EntitySchema {
    entity: "person",
    table: "persons",
    id_field: "id",
    fields: &[
        FieldDef {
            name: "id",
            kind: FieldKind::Text,
        },
        FieldDef {
            name: "name",
            kind: FieldKind::Text,
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

/// A person known to the bibliography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Person {
    /// Stable assigned identifier.
    pub id: String,

    /// Full display name.
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Creates a person with a generated identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Renames the person, refreshing the update timestamp.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }
}

impl Default for Person {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl StoredEntity for Person {
    type Id = String;

    fn schema() -> &'static EntitySchema {
        &PERSON_SCHEMA
    }

    fn id(&self) -> &String {
        &self.id
    }
}
