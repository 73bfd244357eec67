//! In-memory store for tests and demos

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::CrudError;
use crate::schema::{FieldKind, ModelSchema};

use super::{ModelStore, SearchArgs};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Value>,
    next_id: i64,
}

/// Thread-safe in-memory [`ModelStore`]
///
/// Rows live in per-model tables keyed by the schema slug. Ids are assigned
/// from a per-table counter and never reused within a process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, Table>>,
}

impl MemoryStore {
    /// An empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(schema: &ModelSchema, row: &Value, term: &str) -> bool {
        let needle = term.to_lowercase();
        schema
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Text)
            .any(|f| {
                row.get(&f.name)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
    }
}

#[async_trait]
impl ModelStore for MemoryStore {
    async fn list(
        &self,
        schema: &ModelSchema,
        args: &SearchArgs,
    ) -> Result<Vec<Value>, CrudError> {
        let tables = self.tables.read();
        let Some(table) = tables.get(&schema.slug()) else {
            return Ok(Vec::new());
        };
        let rows = table
            .rows
            .values()
            .filter(|row| {
                args.term()
                    .is_none_or(|term| Self::matches(schema, row, term))
            })
            .skip(usize::try_from(args.offset()).unwrap_or(usize::MAX))
            .take(args.limit() as usize)
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn find(&self, schema: &ModelSchema, id: i64) -> Result<Option<Value>, CrudError> {
        Ok(self
            .tables
            .read()
            .get(&schema.slug())
            .and_then(|t| t.rows.get(&id))
            .cloned())
    }

    async fn save(&self, schema: &ModelSchema, mut record: Value) -> Result<i64, CrudError> {
        let mut tables = self.tables.write();
        let table = tables.entry(schema.slug()).or_default();
        let id = match record.get("id").and_then(Value::as_i64) {
            Some(id) => id,
            None => {
                table.next_id += 1;
                table.next_id
            }
        };
        if let Some(obj) = record.as_object_mut() {
            obj.insert("id".to_string(), Value::from(id));
        }
        table.next_id = table.next_id.max(id);
        table.rows.insert(id, record);
        Ok(id)
    }

    async fn delete(&self, schema: &ModelSchema, id: i64) -> Result<(), CrudError> {
        if let Some(table) = self.tables.write().get_mut(&schema.slug()) {
            table.rows.remove(&id);
        }
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
    }

    #[tokio::test]
    async fn save_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let s = schema();
        let a = store.save(&s, json!({"name": "One"})).await.unwrap();
        let b = store.save(&s, json!({"name": "Two"})).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        let found = store.find(&s, a).await.unwrap().unwrap();
        assert_eq!(found["id"], 1);
        assert_eq!(found["name"], "One");
    }

    #[tokio::test]
    async fn save_with_id_updates_in_place() {
        let store = MemoryStore::new();
        let s = schema();
        let id = store.save(&s, json!({"name": "Old"})).await.unwrap();
        store
            .save(&s, json!({"id": id, "name": "New"}))
            .await
            .unwrap();
        let rows = store.list(&s, &SearchArgs::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "New");
    }

    #[tokio::test]
    async fn search_filters_text_fields_case_insensitively() {
        let store = MemoryStore::new();
        let s = schema();
        store.save(&s, json!({"name": "Tesla Model 3", "year": 2020})).await.unwrap();
        store.save(&s, json!({"name": "Fiat Panda", "year": 2005})).await.unwrap();
        let args = SearchArgs {
            search: Some("tesla".into()),
            ..SearchArgs::default()
        };
        let rows = store.list(&s, &args).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Tesla Model 3");
    }

    #[tokio::test]
    async fn pagination_windows_rows() {
        let store = MemoryStore::new();
        let s = schema();
        for i in 0..5 {
            store.save(&s, json!({"name": format!("Car {i}")})).await.unwrap();
        }
        let args = SearchArgs {
            page: 2,
            limit: 2,
            ..SearchArgs::default()
        };
        let rows = store.list(&s, &args).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], 3);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let s = schema();
        let id = store.save(&s, json!({"name": "Gone"})).await.unwrap();
        store.delete(&s, id).await.unwrap();
        store.delete(&s, id).await.unwrap();
        assert!(store.find(&s, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tables_are_isolated_per_model() {
        let store = MemoryStore::new();
        let cars = schema();
        let planes = ModelSchema::new("Plane").field(FieldSpec::text("name"));
        store.save(&cars, json!({"name": "Car"})).await.unwrap();
        store.save(&planes, json!({"name": "Plane"})).await.unwrap();
        assert_eq!(store.list(&cars, &SearchArgs::default()).await.unwrap().len(), 1);
        assert_eq!(store.list(&planes, &SearchArgs::default()).await.unwrap().len(), 1);
    }
}
