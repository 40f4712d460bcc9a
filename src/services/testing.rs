//! In-memory backend used by the service tests.

use super::remote::RemoteStore;
use crate::error::{FoodnsapError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct FakeRemote {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    omit_ids: AtomicBool,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rows come back without an `id` column from now on.
    pub fn omit_ids(&self) {
        self.omit_ids.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn stamp(&self, mut row: Value) -> Value {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(obj) = row.as_object_mut() {
            if !self.omit_ids.load(Ordering::SeqCst) {
                obj.entry("id").or_insert(json!(format!("row-{}", n)));
            }
            obj.entry("user_id").or_insert(json!("user-1"));
            obj.entry("created_at").or_insert(json!("2025-04-28T12:00:00.000Z"));
        }
        row
    }
}

fn merge(target: &mut Value, changes: &Value) {
    if let (Some(t), Some(c)) = (target.as_object_mut(), changes.as_object()) {
        for (k, v) in c {
            t.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        self.record(format!("insert {}", table));
        let row = self.stamp(row);
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn insert_many(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        self.record(format!("insert_many {}", table));
        let stamped: Vec<Value> = rows.into_iter().map(|r| self.stamp(r)).collect();
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(stamped);
        Ok(())
    }

    async fn update(&self, table: &str, id: &str, changes: Value) -> Result<Value> {
        self.record(format!("update {}/{}", table, id));
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id))
            .ok_or_else(|| FoodnsapError::Remote {
                status: 404,
                message: format!("{}/{} not found", table, id),
            })?;
        merge(row, &changes);
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<()> {
        self.record(format!("delete {}/{}", table, id));
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.retain(|r| r["id"] != id);
        }
        Ok(())
    }

    async fn upsert(&self, table: &str, row: Value) -> Result<()> {
        self.record(format!("upsert {}", table));
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let existing = match row.get("id") {
            Some(id) => rows.iter_mut().find(|r| r.get("id") == Some(id)),
            None => None,
        };
        match existing {
            Some(current) => merge(current, &row),
            None => rows.push(row),
        }
        Ok(())
    }

    async fn fetch(&self, table: &str, id: &str) -> Result<Option<Value>> {
        self.record(format!("fetch {}/{}", table, id));
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|rows| rows.iter().find(|r| r["id"] == id).cloned()))
    }
}
