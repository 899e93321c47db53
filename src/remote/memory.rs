//! In-memory implementation of the record store contract.
//!
//! Backs tests and offline sessions. Assigns sequential identifiers,
//! applies filters/ordering/pagination, and counts calls per table so
//! tests can observe which tables an operation touched. Can be armed to
//! reject the next call.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{self, AtomicU64};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::remote::store::{ListQuery, Record, RecordStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    calls: RwLock<HashMap<String, usize>>,
    next_id: AtomicU64,
    fail_message: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of calls made against `table` so far, across all operations.
    pub async fn calls(&self, table: &str) -> usize {
        self.calls.read().await.get(table).copied().unwrap_or(0)
    }

    /// Arm the store to reject the next call with `message`.
    pub async fn fail_next(&self, message: &str) {
        *self.fail_message.write().await = Some(message.to_string());
    }

    /// Record the call and consume any armed failure.
    async fn begin(&self, table: &str) -> Result<(), StoreError> {
        *self.calls.write().await.entry(table.to_string()).or_insert(0) += 1;
        match self.fail_message.write().await.take() {
            Some(message) => Err(StoreError(message)),
            None => Ok(()),
        }
    }

    fn assign_id(&self) -> String {
        let n = self.next_id.fetch_add(1, atomic::Ordering::SeqCst) + 1;
        n.to_string()
    }
}

/// Total order over JSON values for `order_by`: null < bool < number <
/// string; ISO dates and timestamps sort correctly as strings.
fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (x, y) => rank(x).cmp(&rank(y)),
    }
}

fn rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn apply_query(rows: &[Record], query: &ListQuery) -> Vec<Record> {
    let mut matched: Vec<Record> = rows
        .iter()
        .filter(|rec| query.filters.iter().all(|f| f.matches(rec)))
        .cloned()
        .collect();

    for order in query.order_by.iter().rev() {
        matched.sort_by(|a, b| {
            let left = a.get(order.field).unwrap_or(&Value::Null);
            let right = b.get(order.field).unwrap_or(&Value::Null);
            match order.direction {
                crate::remote::store::Direction::Asc => cmp_values(left, right),
                crate::remote::store::Direction::Desc => cmp_values(right, left),
            }
        });
    }

    let matched = matched.into_iter().skip(query.offset);
    let matched: Vec<Record> = match query.limit {
        Some(limit) => matched.take(limit).collect(),
        None => matched.collect(),
    };

    if query.fields.is_empty() {
        return matched;
    }
    matched
        .into_iter()
        .map(|rec| {
            rec.into_iter()
                .filter(|(name, _)| query.fields.iter().any(|f| f == name))
                .collect()
        })
        .collect()
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, table: &str, query: &ListQuery) -> Result<Vec<Record>, StoreError> {
        self.begin(table).await?;
        let tables = self.tables.read().await;
        let rows = tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        Ok(apply_query(rows, query))
    }

    async fn get_one(&self, table: &str, query: &ListQuery) -> Result<Option<Record>, StoreError> {
        self.begin(table).await?;
        let tables = self.tables.read().await;
        let rows = tables.get(table).map(Vec::as_slice).unwrap_or(&[]);
        Ok(apply_query(rows, query).into_iter().next())
    }

    async fn create(&self, table: &str, record: Record) -> Result<Record, StoreError> {
        self.begin(table).await?;
        let mut stored = Record::new();
        stored.insert("id".to_string(), Value::String(self.assign_id()));
        stored.extend(record);
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, table: &str, id: &str, record: Record) -> Result<Record, StoreError> {
        self.begin(table).await?;
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::new(format!("no such table: {}", table)))?;
        let row = rows
            .iter_mut()
            .find(|rec| rec.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| StoreError::new(format!("no {} record with id {}", table, id)))?;
        for (field, value) in record {
            row.insert(field, value);
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        self.begin(table).await?;
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::new(format!("no such table: {}", table)))?;
        let before = rows.len();
        rows.retain(|rec| rec.get("id").and_then(Value::as_str) != Some(id));
        if rows.len() == before {
            return Err(StoreError::new(format!(
                "no {} record with id {}",
                table, id
            )));
        }
        Ok(())
    }
}
