//! Entity ⇄ record codec.
//!
//! Entities are plain serde data holders; the mapping to the backend's
//! record representation lives here, on the storage side of the boundary.

use biblio_core::{BiblioError, BiblioResult, StoredEntity};
use serde_json::Value;

use crate::backend::Record;

/// Encodes an entity into its backend record representation.
pub fn encode<E: StoredEntity>(entity: &E) -> BiblioResult<Record> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(BiblioError::internal(format!(
            "entity '{}' did not serialize to an object",
            E::schema().entity
        ))),
        Err(e) => Err(BiblioError::internal(format!(
            "failed to encode '{}': {}",
            E::schema().entity,
            e
        ))),
    }
}

/// Decodes a backend record into an entity.
pub fn decode<E: StoredEntity>(record: Record) -> BiblioResult<E> {
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        BiblioError::internal(format!(
            "failed to decode '{}' record: {}",
            E::schema().entity,
            e
        ))
    })
}

/// JSON form of an identifier, as passed to backend by-id operations.
pub fn id_value<E: StoredEntity>(id: &E::Id) -> BiblioResult<Value> {
    serde_json::to_value(id).map_err(|e| {
        BiblioError::internal(format!(
            "failed to encode '{}' identifier: {}",
            E::schema().entity,
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_core::Person;

    #[test]
    fn test_encode_decode_round_trip() {
        let person = Person::new("Ada Lovelace");
        let record = encode(&person).unwrap();
        assert_eq!(record.get("name").unwrap(), "Ada Lovelace");

        let decoded: Person = decode(record).unwrap();
        assert_eq!(decoded, person);
    }

    #[test]
    fn test_decode_rejects_malformed_record() {
        let mut record = Record::new();
        record.insert("id".to_string(), Value::String("p1".to_string()));
        // name missing, timestamps missing
        let err = decode::<Person>(record).unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_id_value_is_plain_string() {
        let person = Person::new("Ada Lovelace");
        let id = id_value::<Person>(&person.id).unwrap();
        assert_eq!(id, Value::String(person.id));
    }
}
