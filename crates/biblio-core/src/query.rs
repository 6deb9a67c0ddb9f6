//! Translation of filter maps into backend-neutral predicates.
//!
//! [`translate`] validates every filter against the entity schema and
//! produces a [`Predicate`] — an ordered conjunction of clauses that each
//! backend lowers to its native query form. Validation failures are raised
//! here, before any backend round trip.

use serde_json::Value;

use crate::filter::{Filter, FilterMap, Operator};
use crate::schema::{EntitySchema, FieldDef, FieldKind};
use crate::{BiblioError, BiblioResult};

/// One validated per-field predicate clause.
#[derive(Debug, Clone)]
pub struct Clause {
    /// Schema field the clause applies to.
    pub field: &'static str,
    /// Declared kind of that field.
    pub kind: FieldKind,
    /// Comparison operator.
    pub operator: Operator,
    /// Comparison value (a list for `In`, a scalar otherwise).
    pub value: Value,
}

/// A validated conjunction of clauses. The empty predicate matches all
/// records of the entity type.
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// The predicate matching every record.
    #[must_use]
    pub fn match_all() -> Self {
        Self::default()
    }

    /// The clauses of the conjunction, in field-name order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether this predicate matches every record.
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Translates a filter map into a predicate over `schema`.
///
/// Filter maps iterate in field-name order, so equal maps always translate
/// to identical predicates. Fails with `InvalidFilter` when a field is
/// unknown or its declared kind cannot support the operator or value.
pub fn translate(schema: &EntitySchema, filters: &FilterMap) -> BiblioResult<Predicate> {
    let mut clauses = Vec::with_capacity(filters.len());
    for (name, filter) in filters {
        let field = schema.field(name).ok_or_else(|| {
            BiblioError::invalid_filter(format!(
                "unknown field '{}' on entity '{}'",
                name, schema.entity
            ))
        })?;
        check_operator(schema, field, filter.operator())?;
        check_value(schema, field, filter)?;
        clauses.push(Clause {
            field: field.name,
            kind: field.kind,
            operator: filter.operator(),
            value: filter.value().clone(),
        });
    }
    Ok(Predicate { clauses })
}

fn check_operator(schema: &EntitySchema, field: &FieldDef, operator: Operator) -> BiblioResult<()> {
    if operator == Operator::Like && field.kind != FieldKind::Text {
        return Err(BiblioError::invalid_filter(format!(
            "operator 'like' requires a text field, but '{}.{}' is {}",
            schema.entity, field.name, field.kind
        )));
    }
    if operator.is_ordering() && !field.kind.is_ordered() {
        return Err(BiblioError::invalid_filter(format!(
            "operator '{}' is not defined for {} field '{}.{}'",
            operator, field.kind, schema.entity, field.name
        )));
    }
    Ok(())
}

fn check_value(schema: &EntitySchema, field: &FieldDef, filter: &Filter) -> BiblioResult<()> {
    let mismatch = |value: &Value| {
        BiblioError::invalid_filter(format!(
            "value {} is not comparable with {} field '{}.{}'",
            value, field.kind, schema.entity, field.name
        ))
    };
    match filter.operator() {
        // Filter construction guarantees the list shape.
        Operator::In => {
            for item in filter.value().as_array().into_iter().flatten() {
                if !field.kind.accepts(item) {
                    return Err(mismatch(item));
                }
            }
        }
        _ => {
            if !field.kind.accepts(filter.value()) {
                return Err(mismatch(filter.value()));
            }
        }
    }
    Ok(())
}
