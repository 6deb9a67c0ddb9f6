//! Filter predicates for repository queries.
//!
//! A [`Filter`] pairs an [`Operator`] with a comparison value; the field it
//! applies to is supplied externally by the [`FilterMap`] key. A filter map
//! is a conjunction: an entity matches when every per-field predicate holds.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{BiblioError, BiblioResult};

/// Comparison operator for a single field predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    /// Equal to.
    Equal,
    /// Not equal to.
    NotEqual,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal.
    LessOrEqual,
    /// Pattern match with `%` and `_` wildcards.
    Like,
    /// Membership in a list of values.
    In,
}

impl Operator {
    /// Whether this operator compares by ordering rather than identity.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterOrEqual | Self::LessThan | Self::LessOrEqual
        )
    }

    /// Stable lowercase name, used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not-equal",
            Self::GreaterThan => "greater-than",
            Self::GreaterOrEqual => "greater-or-equal",
            Self::LessThan => "less-than",
            Self::LessOrEqual => "less-or-equal",
            Self::Like => "like",
            Self::In => "in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable field predicate: operator plus comparison value.
///
/// Construction validates operator/value compatibility; once built, a
/// filter cannot be modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    operator: Operator,
    value: Value,
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

impl Filter {
    /// Creates a filter, validating that `value` fits `operator`.
    ///
    /// `In` expects a non-empty list of scalars, `Like` a string pattern,
    /// every other operator a single scalar.
    pub fn new(operator: Operator, value: Value) -> BiblioResult<Self> {
        match operator {
            Operator::In => {
                let Value::Array(items) = &value else {
                    return Err(BiblioError::invalid_filter(
                        "operator 'in' expects a list of values",
                    ));
                };
                if items.is_empty() {
                    return Err(BiblioError::invalid_filter(
                        "operator 'in' expects a non-empty list of values",
                    ));
                }
                if !items.iter().all(is_scalar) {
                    return Err(BiblioError::invalid_filter(
                        "operator 'in' expects scalar list entries",
                    ));
                }
            }
            Operator::Like => {
                if !value.is_string() {
                    return Err(BiblioError::invalid_filter(
                        "operator 'like' expects a string pattern",
                    ));
                }
            }
            _ => {
                if !is_scalar(&value) {
                    return Err(BiblioError::invalid_filter(format!(
                        "operator '{operator}' expects a single scalar value"
                    )));
                }
            }
        }
        Ok(Self { operator, value })
    }

    /// Equality filter.
    pub fn equal(value: impl Into<Value>) -> BiblioResult<Self> {
        Self::new(Operator::Equal, value.into())
    }

    /// Inequality filter.
    pub fn not_equal(value: impl Into<Value>) -> BiblioResult<Self> {
        Self::new(Operator::NotEqual, value.into())
    }

    /// Strict greater-than filter.
    pub fn greater_than(value: impl Into<Value>) -> BiblioResult<Self> {
        Self::new(Operator::GreaterThan, value.into())
    }

    /// Greater-or-equal filter.
    pub fn greater_or_equal(value: impl Into<Value>) -> BiblioResult<Self> {
        Self::new(Operator::GreaterOrEqual, value.into())
    }

    /// Strict less-than filter.
    pub fn less_than(value: impl Into<Value>) -> BiblioResult<Self> {
        Self::new(Operator::LessThan, value.into())
    }

    /// Less-or-equal filter.
    pub fn less_or_equal(value: impl Into<Value>) -> BiblioResult<Self> {
        Self::new(Operator::LessOrEqual, value.into())
    }

    /// Pattern-match filter (`%` and `_` wildcards).
    pub fn like(pattern: impl Into<String>) -> BiblioResult<Self> {
        Self::new(Operator::Like, Value::String(pattern.into()))
    }

    /// Membership filter.
    pub fn is_in<I, V>(values: I) -> BiblioResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::new(Operator::In, Value::Array(items))
    }

    /// The comparison operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// The comparison value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

/// Mapping from field name to filter; represents a conjunction of per-field
/// predicates. The empty map matches every entity.
pub type FilterMap = BTreeMap<String, Filter>;
