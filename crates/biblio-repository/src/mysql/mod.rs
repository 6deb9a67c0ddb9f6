//! MySQL storage backend.
//!
//! Lowers predicates to parameterized `WHERE` clauses through a
//! per-operator mapping table and decodes rows back into records per the
//! schema's field kinds. Each entity field maps to one column of the same
//! name.

use std::sync::Arc;

use async_trait::async_trait;
use biblio_core::{BiblioError, BiblioResult, EntitySchema, FieldKind, Operator, Predicate};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{query::Query, MySql, Row};
use tracing::debug;

use crate::backend::{Record, StorageBackend};
use crate::pool::DatabasePool;

/// MySQL-backed storage.
pub struct MySqlBackend {
    pool: Arc<DatabasePool>,
}

impl MySqlBackend {
    /// Creates a backend over the given pool.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

/// Operator mapping table. Extending [`Operator`] requires exactly one new
/// arm here.
const fn sql_operator(operator: Operator) -> &'static str {
    match operator {
        Operator::Equal => "=",
        Operator::NotEqual => "<>",
        Operator::GreaterThan => ">",
        Operator::GreaterOrEqual => ">=",
        Operator::LessThan => "<",
        Operator::LessOrEqual => "<=",
        Operator::Like => "LIKE",
        Operator::In => "IN",
    }
}

fn column_list(schema: &EntitySchema) -> String {
    schema
        .fields
        .iter()
        .map(|f| format!("`{}`", f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(predicate: &Predicate) -> String {
    if predicate.is_match_all() {
        return String::new();
    }
    let parts: Vec<String> = predicate
        .clauses()
        .iter()
        .map(|clause| match clause.operator {
            Operator::In => {
                let n = clause.value.as_array().map_or(0, Vec::len);
                let marks = vec!["?"; n].join(", ");
                format!("`{}` IN ({})", clause.field, marks)
            }
            op => format!("`{}` {} ?", clause.field, sql_operator(op)),
        })
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}

/// Binds one scalar value according to its declared kind. Translation has
/// already validated compatibility; a mismatch here is an internal error.
fn bind_scalar<'q>(
    query: MySqlQuery<'q>,
    kind: FieldKind,
    value: &Value,
) -> BiblioResult<MySqlQuery<'q>> {
    let mismatch = || {
        BiblioError::internal(format!(
            "value {} cannot be bound as {}",
            value, kind
        ))
    };
    let query = match kind {
        FieldKind::Text => query.bind(value.as_str().ok_or_else(mismatch)?.to_owned()),
        FieldKind::Integer => query.bind(value.as_i64().ok_or_else(mismatch)?),
        FieldKind::Float => query.bind(value.as_f64().ok_or_else(mismatch)?),
        FieldKind::Boolean => query.bind(value.as_bool().ok_or_else(mismatch)?),
        FieldKind::Timestamp => {
            let instant = DateTime::parse_from_rfc3339(value.as_str().ok_or_else(mismatch)?)
                .map_err(|_| mismatch())?
                .with_timezone(&Utc);
            query.bind(instant)
        }
    };
    Ok(query)
}

/// Binds a possibly-null record value for insert/update statements.
fn bind_field<'q>(
    query: MySqlQuery<'q>,
    kind: FieldKind,
    value: Option<&Value>,
) -> BiblioResult<MySqlQuery<'q>> {
    match value.filter(|v| !v.is_null()) {
        Some(value) => bind_scalar(query, kind, value),
        None => Ok(match kind {
            FieldKind::Text => query.bind(None::<String>),
            FieldKind::Integer => query.bind(None::<i64>),
            FieldKind::Float => query.bind(None::<f64>),
            FieldKind::Boolean => query.bind(None::<bool>),
            FieldKind::Timestamp => query.bind(None::<DateTime<Utc>>),
        }),
    }
}

fn bind_predicate<'q>(
    mut query: MySqlQuery<'q>,
    predicate: &Predicate,
) -> BiblioResult<MySqlQuery<'q>> {
    for clause in predicate.clauses() {
        match clause.operator {
            Operator::In => {
                for item in clause.value.as_array().into_iter().flatten() {
                    query = bind_scalar(query, clause.kind, item)?;
                }
            }
            _ => query = bind_scalar(query, clause.kind, &clause.value)?,
        }
    }
    Ok(query)
}

fn id_kind(schema: &EntitySchema) -> BiblioResult<FieldKind> {
    schema
        .field(schema.id_field)
        .map(|field| field.kind)
        .ok_or_else(|| {
            BiblioError::internal(format!(
                "schema for '{}' does not declare its identifier field",
                schema.entity
            ))
        })
}

fn row_to_record(schema: &EntitySchema, row: &MySqlRow) -> BiblioResult<Record> {
    let mut record = Record::new();
    for field in schema.fields {
        let value = match field.kind {
            FieldKind::Text => row
                .try_get::<Option<String>, _>(field.name)?
                .map(Value::from),
            FieldKind::Integer => row.try_get::<Option<i64>, _>(field.name)?.map(Value::from),
            FieldKind::Float => row.try_get::<Option<f64>, _>(field.name)?.map(Value::from),
            FieldKind::Boolean => row.try_get::<Option<bool>, _>(field.name)?.map(Value::from),
            FieldKind::Timestamp => row
                .try_get::<Option<DateTime<Utc>>, _>(field.name)?
                .map(|instant| Value::String(instant.to_rfc3339())),
        };
        record.insert(field.name.to_string(), value.unwrap_or(Value::Null));
    }
    Ok(record)
}

fn id_label(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl StorageBackend for MySqlBackend {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn supports(&self, _operator: Operator) -> bool {
        true
    }

    async fn select(
        &self,
        schema: &'static EntitySchema,
        predicate: &Predicate,
    ) -> BiblioResult<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM `{}`{}",
            column_list(schema),
            schema.table,
            where_clause(predicate)
        );
        debug!("mysql: {}", sql);

        let query = bind_predicate(sqlx::query(&sql), predicate)?;
        let rows = query.fetch_all(self.pool.inner()).await?;
        rows.iter().map(|row| row_to_record(schema, row)).collect()
    }

    async fn fetch(
        &self,
        schema: &'static EntitySchema,
        id: &Value,
    ) -> BiblioResult<Option<Record>> {
        let id_kind = id_kind(schema)?;
        let sql = format!(
            "SELECT {} FROM `{}` WHERE `{}` = ?",
            column_list(schema),
            schema.table,
            schema.id_field
        );

        let query = bind_scalar(sqlx::query(&sql), id_kind, id)?;
        let row = query.fetch_optional(self.pool.inner()).await?;
        row.map(|row| row_to_record(schema, &row)).transpose()
    }

    async fn insert(&self, schema: &'static EntitySchema, record: Record) -> BiblioResult<()> {
        let marks = vec!["?"; schema.fields.len()].join(", ");
        let sql = format!(
            "INSERT INTO `{}` ({}) VALUES ({})",
            schema.table,
            column_list(schema),
            marks
        );
        debug!("mysql: {}", sql);

        let mut query = sqlx::query(&sql);
        for field in schema.fields {
            query = bind_field(query, field.kind, record.get(field.name))?;
        }
        query.execute(self.pool.inner()).await?;
        Ok(())
    }

    async fn update(
        &self,
        schema: &'static EntitySchema,
        id: &Value,
        record: Record,
    ) -> BiblioResult<()> {
        let id_kind = id_kind(schema)?;

        // Existence probe first: MySQL reports zero affected rows for no-op
        // updates, which would be indistinguishable from a missing row.
        if self.fetch(schema, id).await?.is_none() {
            return Err(BiblioError::not_found(schema.entity, id_label(id)));
        }

        let assignments: Vec<String> = schema
            .fields
            .iter()
            .filter(|f| f.name != schema.id_field)
            .map(|f| format!("`{}` = ?", f.name))
            .collect();
        let sql = format!(
            "UPDATE `{}` SET {} WHERE `{}` = ?",
            schema.table,
            assignments.join(", "),
            schema.id_field
        );
        debug!("mysql: {}", sql);

        let mut query = sqlx::query(&sql);
        for field in schema.fields.iter().filter(|f| f.name != schema.id_field) {
            query = bind_field(query, field.kind, record.get(field.name))?;
        }
        query = bind_scalar(query, id_kind, id)?;
        query.execute(self.pool.inner()).await?;
        Ok(())
    }

    async fn delete(&self, schema: &'static EntitySchema, id: &Value) -> BiblioResult<()> {
        let id_kind = id_kind(schema)?;
        let sql = format!(
            "DELETE FROM `{}` WHERE `{}` = ?",
            schema.table, schema.id_field
        );
        debug!("mysql: {}", sql);

        let query = bind_scalar(sqlx::query(&sql), id_kind, id)?;
        let result = query.execute(self.pool.inner()).await?;
        if result.rows_affected() == 0 {
            return Err(BiblioError::not_found(schema.entity, id_label(id)));
        }
        Ok(())
    }

    async fn count(
        &self,
        schema: &'static EntitySchema,
        predicate: &Predicate,
    ) -> BiblioResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM `{}`{}",
            schema.table,
            where_clause(predicate)
        );

        let query = bind_predicate(sqlx::query(&sql), predicate)?;
        let row = query.fetch_one(self.pool.inner()).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.unsigned_abs())
    }
}
