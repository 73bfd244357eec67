//! PostgreSQL store
//!
//! SQL is generated from the schema: one table per model named after the
//! slug, one column per field, plus a `BIGSERIAL` id. Values travel as
//! [`serde_json::Value`] and are bound through [`PgBind`], which maps each
//! field kind onto the matching Postgres wire encoding.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::encode::IsNull;
use sqlx::postgres::{PgRow, PgTypeInfo, Postgres};
use sqlx::{Database, Encode, PgPool, Row};
use tracing::debug;

use crate::error::CrudError;
use crate::schema::{FieldKind, FieldSpec, ModelSchema};

use super::{ModelStore, SearchArgs};

/// [`ModelStore`] backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A JSON value staged for binding to a Postgres query
#[derive(Debug, Clone)]
enum PgBind {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(Value),
}

impl PgBind {
    /// Convert a record value according to its field kind
    fn from_field(field: &FieldSpec, value: &Value) -> Result<Self, CrudError> {
        if value.is_null() {
            return Ok(Self::Null);
        }
        let mismatch = || {
            CrudError::BadRequest(format!(
                "field '{}' does not hold a {} value",
                field.name, field.kind
            ))
        };
        Ok(match field.kind {
            FieldKind::Text => Self::Text(value.as_str().ok_or_else(mismatch)?.to_string()),
            FieldKind::Int => Self::Int(value.as_i64().ok_or_else(mismatch)?),
            FieldKind::UInt => {
                let n = value.as_u64().ok_or_else(mismatch)?;
                Self::Int(i64::try_from(n).map_err(|_| {
                    CrudError::BadRequest(format!("field '{}' is out of range", field.name))
                })?)
            }
            FieldKind::Float32 | FieldKind::Float64 => {
                Self::Float(value.as_f64().ok_or_else(mismatch)?)
            }
            FieldKind::Bool => Self::Bool(value.as_bool().ok_or_else(mismatch)?),
            FieldKind::Json => Self::Json(value.clone()),
        })
    }
}

impl<'q> Encode<'q, Postgres> for PgBind {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            Self::Null => <Option<i64> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            Self::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            Self::Int(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            Self::Float(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            Self::Text(s) => {
                let s: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s, buf)?
            }
            Self::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }
}

impl sqlx::Type<Postgres> for PgBind {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn list_sql(schema: &ModelSchema, with_term: bool) -> String {
    let table = quote(&schema.slug());
    let mut sql = format!("SELECT * FROM {table}");
    if with_term {
        let clauses: Vec<String> = schema
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Text)
            .map(|f| format!("{} ILIKE $1", quote(&f.name)))
            .collect();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" OR "));
        }
    }
    sql.push_str(" ORDER BY id LIMIT ");
    sql.push_str(if with_term { "$2 OFFSET $3" } else { "$1 OFFSET $2" });
    sql
}

fn insert_sql(schema: &ModelSchema) -> String {
    let cols: Vec<String> = schema.fields.iter().map(|f| quote(&f.name)).collect();
    let params: Vec<String> = (1..=cols.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
        quote(&schema.slug()),
        cols.join(", "),
        params.join(", ")
    )
}

fn update_sql(schema: &ModelSchema) -> String {
    let sets: Vec<String> = schema
        .fields
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{} = ${}", quote(&f.name), i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING id",
        quote(&schema.slug()),
        sets.join(", "),
        schema.fields.len() + 1
    )
}

fn row_to_json(schema: &ModelSchema, row: &PgRow) -> Result<Value, CrudError> {
    let mut obj = serde_json::Map::new();
    let id: i64 = row.try_get("id")?;
    obj.insert("id".to_string(), Value::from(id));
    for field in &schema.fields {
        let name = field.name.as_str();
        let value = match field.kind {
            FieldKind::Text => row
                .try_get::<Option<String>, _>(name)?
                .map_or(Value::Null, Value::String),
            FieldKind::Int | FieldKind::UInt => row
                .try_get::<Option<i64>, _>(name)?
                .map_or(Value::Null, Value::from),
            FieldKind::Float32 => row
                .try_get::<Option<f32>, _>(name)?
                .map_or(Value::Null, |v| Value::from(f64::from(v))),
            FieldKind::Float64 => row
                .try_get::<Option<f64>, _>(name)?
                .map_or(Value::Null, Value::from),
            FieldKind::Bool => row
                .try_get::<Option<bool>, _>(name)?
                .map_or(Value::Null, Value::Bool),
            FieldKind::Json => row
                .try_get::<Option<Value>, _>(name)?
                .unwrap_or(Value::Null),
        };
        obj.insert(field.name.clone(), value);
    }
    Ok(Value::Object(obj))
}

fn field_binds(schema: &ModelSchema, record: &Value) -> Result<Vec<PgBind>, CrudError> {
    schema
        .fields
        .iter()
        .map(|f| {
            record
                .get(&f.name)
                .map_or(Ok(PgBind::Null), |v| PgBind::from_field(f, v))
        })
        .collect()
}

#[async_trait]
impl ModelStore for PgStore {
    async fn list(
        &self,
        schema: &ModelSchema,
        args: &SearchArgs,
    ) -> Result<Vec<Value>, CrudError> {
        let term = args.term();
        let sql = list_sql(schema, term.is_some());
        debug!(model = %schema.name, %sql, "listing records");
        let mut query = sqlx::query(&sql);
        if let Some(term) = term {
            query = query.bind(format!("%{term}%"));
        }
        let limit = i64::from(args.limit());
        let offset = i64::try_from(args.offset()).unwrap_or(i64::MAX);
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| row_to_json(schema, row)).collect()
    }

    async fn find(&self, schema: &ModelSchema, id: i64) -> Result<Option<Value>, CrudError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", quote(&schema.slug()));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| row_to_json(schema, &r)).transpose()
    }

    async fn save(&self, schema: &ModelSchema, record: Value) -> Result<i64, CrudError> {
        let binds = field_binds(schema, &record)?;
        let id = record.get("id").and_then(Value::as_i64);
        let sql = if id.is_some() {
            update_sql(schema)
        } else {
            insert_sql(schema)
        };
        debug!(model = %schema.name, %sql, "saving record");
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        if let Some(id) = id {
            query = query.bind(id);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn delete(&self, schema: &ModelSchema, id: i64) -> Result<(), CrudError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", quote(&schema.slug()));
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde_json::json;

    fn schema() -> ModelSchema {
        ModelSchema::new("Car")
            .field(FieldSpec::text("name"))
            .field(FieldSpec::int("year"))
            .field(FieldSpec::bool("electric"))
    }

    #[test]
    fn list_sql_without_term() {
        assert_eq!(
            list_sql(&schema(), false),
            "SELECT * FROM \"car\" ORDER BY id LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn list_sql_with_term_searches_text_fields() {
        assert_eq!(
            list_sql(&schema(), true),
            "SELECT * FROM \"car\" WHERE \"name\" ILIKE $1 ORDER BY id LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn insert_and_update_sql() {
        assert_eq!(
            insert_sql(&schema()),
            "INSERT INTO \"car\" (\"name\", \"year\", \"electric\") VALUES ($1, $2, $3) RETURNING id"
        );
        assert_eq!(
            update_sql(&schema()),
            "UPDATE \"car\" SET \"name\" = $1, \"year\" = $2, \"electric\" = $3 WHERE id = $4 RETURNING id"
        );
    }

    #[test]
    fn bind_conversion_respects_kinds() {
        let s = schema();
        let rec = json!({"name": "Tesla", "year": 2020, "electric": true});
        let binds = field_binds(&s, &rec).unwrap();
        assert!(matches!(&binds[0], PgBind::Text(t) if t == "Tesla"));
        assert!(matches!(binds[1], PgBind::Int(2020)));
        assert!(matches!(binds[2], PgBind::Bool(true)));
    }

    #[test]
    fn missing_field_binds_null() {
        let binds = field_binds(&schema(), &json!({"name": "X"})).unwrap();
        assert!(matches!(binds[1], PgBind::Null));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let err = field_binds(&schema(), &json!({"year": "twenty"})).unwrap_err();
        assert!(matches!(err, CrudError::BadRequest(_)));
    }

    #[test]
    fn uint_overflow_is_rejected() {
        let s = ModelSchema::new("M").field(FieldSpec::uint("n"));
        let err = field_binds(&s, &json!({"n": u64::MAX})).unwrap_err();
        assert!(matches!(err, CrudError::BadRequest(_)));
    }
}
