//! Record store capability and an in-memory reference store.
//!
//! The verifier only needs `list(query) -> records`. Real backends translate the
//! [`ExistenceQuery`] (see [`ExistenceQuery::to_sql`]) and run it; [`MemoryStore`]
//! evaluates it directly over JSON rows so the contract can be exercised without a
//! database.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::query::{Collation, EqFilter, ExistenceQuery};

/// Something that can answer an [`ExistenceQuery`] with records of type `E`.
pub trait RecordStore<E> {
    fn list(&self, query: &ExistenceQuery) -> Result<Vec<E>>;
}

impl<E, S: RecordStore<E> + ?Sized> RecordStore<E> for &S {
    fn list(&self, query: &ExistenceQuery) -> Result<Vec<E>> { (**self).list(query) }
}

impl<E, S: RecordStore<E> + ?Sized> RecordStore<E> for Arc<S> {
    fn list(&self, query: &ExistenceQuery) -> Result<Vec<E>> { (**self).list(query) }
}

/// A record as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Map<String, JsonValue>);

impl Row {
    pub fn new() -> Self { Self::default() }

    /// Build from a JSON object; any other JSON value yields an empty row.
    pub fn from_json(v: JsonValue) -> Self {
        match v {
            JsonValue::Object(m) => Row(m),
            _ => Row::default(),
        }
    }

    pub fn with(mut self, column: &str, value: impl Into<JsonValue>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&JsonValue> { self.0.get(bare_column(column)) }

    /// Column value as text: strings as-is, numbers and booleans via their JSON text.
    /// Null, missing and nested values have no text form.
    pub fn get_str(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

// `qualifier.column` addresses `column` in a single-table store.
fn bare_column(column: &str) -> &str { column.rsplit('.').next().unwrap_or(column) }

fn filter_matches(row: &Row, f: &EqFilter) -> bool {
    let Some(v) = row.get_str(&f.column) else { return false };
    match f.collation {
        Collation::Binary => v == f.value,
        Collation::Default => v.eq_ignore_ascii_case(&f.value),
    }
}

/// In-memory table of [`Row`]s. `Collation::Default` compares ASCII
/// case-insensitively, like the common `_ci` collations of SQL stores.
#[derive(Clone, Default)]
pub struct MemoryStore {
    name: String,
    rows: Arc<RwLock<Vec<Row>>>,
    queries: Arc<AtomicU64>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_rows(name: impl Into<String>, rows: impl IntoIterator<Item = Row>) -> Self {
        let s = Self::new(name);
        s.rows.write().extend(rows);
        s
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn insert(&self, row: Row) { self.rows.write().push(row); }

    pub fn len(&self) -> usize { self.rows.read().len() }

    pub fn is_empty(&self) -> bool { self.rows.read().is_empty() }

    /// Number of queries answered (or failed) so far.
    pub fn query_count(&self) -> u64 { self.queries.load(Ordering::Relaxed) }

    /// Make every subsequent query fail with `message`; `None` restores normal service.
    pub fn fail_with(&self, message: Option<&str>) { *self.failure.lock() = message.map(str::to_string); }
}

impl RecordStore<Row> for MemoryStore {
    fn list(&self, query: &ExistenceQuery) -> Result<Vec<Row>> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if let Some(msg) = self.failure.lock().clone() {
            return Err(anyhow!("store '{}' unavailable: {}", self.name, msg));
        }
        let rows = self.rows.read();
        let out: Vec<Row> = rows
            .iter()
            .filter(|r| query.filters.iter().all(|f| filter_matches(r, f)))
            .map(|r| project(r, &query.select))
            .collect();
        debug!(target: "recordkit::store", "store={} filters={} matched={}", self.name, query.filters.len(), out.len());
        Ok(out)
    }
}

fn project(row: &Row, select: &[String]) -> Row {
    if select.is_empty() { return row.clone(); }
    let mut out = Row::new();
    for col in select {
        if let Some(v) = row.get(col) { out.0.insert(bare_column(col).to_string(), v.clone()); }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemoryStore {
        MemoryStore::with_rows("users", [
            Row::from_json(json!({"id": "7", "name": "Alice", "deleted": "0"})),
            Row::from_json(json!({"id": 8, "name": "alice", "deleted": 1})),
            Row::from_json(json!({"id": "9", "name": null, "deleted": "0"})),
        ])
    }

    #[test]
    fn binary_and_default_collation() {
        let s = store();
        let q = ExistenceQuery::new().select("id").eq_binary("name", "Alice");
        assert_eq!(s.list(&q).unwrap().len(), 1);
        let q = ExistenceQuery::new().select("id").eq("name", "ALICE");
        assert_eq!(s.list(&q).unwrap().len(), 2);
    }

    #[test]
    fn numbers_compare_by_text_and_nulls_never_match() {
        let s = store();
        let q = ExistenceQuery::new().eq("deleted", "1");
        let rows = s.list(&q).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("id").as_deref(), Some("8"));
        let q = ExistenceQuery::new().eq("name", "null");
        assert!(s.list(&q).unwrap().is_empty());
    }

    #[test]
    fn select_projects_columns() {
        let s = store();
        let q = ExistenceQuery::new().select("users.id").eq_binary("name", "Alice");
        let rows = s.list(&q).unwrap();
        assert_eq!(rows[0], Row::new().with("id", "7"));
    }

    #[test]
    fn counts_queries_and_injects_failures() {
        let s = store();
        let q = ExistenceQuery::new();
        assert_eq!(s.list(&q).unwrap().len(), 3);
        s.fail_with(Some("timeout"));
        let err = s.list(&q).unwrap_err();
        assert!(err.to_string().contains("timeout"));
        s.fail_with(None);
        assert!(s.list(&q).is_ok());
        assert_eq!(s.query_count(), 3);
    }

    #[test]
    fn clones_share_rows() {
        let s = MemoryStore::new("t");
        let c = s.clone();
        c.insert(Row::new().with("id", "1"));
        assert_eq!(s.len(), 1);
        assert!(!s.is_empty());
    }
}
