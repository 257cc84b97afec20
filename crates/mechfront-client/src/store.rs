//! Data store collaborator.
//!
//! The backend is a document store with three collections. Records are
//! JSON objects keyed by a string `id`; every call may fail. The core
//! only ever needs equality filters, a single sort key, and a limit.

use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// One stored document.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Pilots,
    Mechs,
    Missions,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pilots => "pilots",
            Self::Mechs => "mechs",
            Self::Missions => "missions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Equality filter, sort key, and limit for `list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Vec<(String, Value)>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filter.push((field.to_string(), value.into()));
        self
    }

    pub fn order_asc(mut self, field: &str) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction: Direction::Asc,
        });
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction: Direction::Desc,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `record` passes every equality clause.
    pub fn matches(&self, record: &Record) -> bool {
        self.filter
            .iter()
            .all(|(field, expected)| record.get(field).is_some_and(|v| values_equal(v, expected)))
    }

    /// Sort and truncate already-filtered records. The sort is stable.
    pub fn arrange(&self, records: &mut Vec<Record>) {
        if let Some(order) = &self.order_by {
            records.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.field), b.get(&order.field));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
    }
}

/// Numbers compare by value, so `1` and `1.0` are equal.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Missing sorts first, then numbers, then strings, then anything else.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(_) => 3,
        }
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Any failed read or write against the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{collection}: record {id} not found")]
    NotFound { collection: Collection, id: String },
    #[error("{collection}: record {id} already exists")]
    DuplicateId { collection: Collection, id: String },
    #[error("{collection}: record has no string id")]
    MissingId { collection: Collection },
    #[error("{collection}: record {id} is malformed: {reason}")]
    Malformed {
        collection: Collection,
        id: String,
        reason: String,
    },
    #[error("{collection}: backend failure: {message}")]
    Backend {
        collection: Collection,
        message: String,
    },
}

/// The three operations the core needs from a backend.
pub trait DataStore {
    fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Record>, StoreError>;

    /// Insert `record`, which must carry a unique string `id`.
    fn create(&mut self, collection: Collection, record: Record) -> Result<Record, StoreError>;

    /// Merge `patch` into the record with `id` and return the result.
    fn update(
        &mut self,
        collection: Collection,
        id: &str,
        patch: Record,
    ) -> Result<Record, StoreError>;
}

/// The string `id` of a record, if present.
pub fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}
