//! In-memory [`DataStore`] used by tests and the simtest harness.
//!
//! Records are kept per collection in insertion order. Two knobs make it
//! behave like the awkward backends the client has to survive:
//!
//! - [`BoolEncoding::Integer`] rewrites every boolean field to `0`/`1` on
//!   write, the way SQL-backed document stores return flags.
//! - [`MemoryStore::fail_next`] makes the next call of one operation on one
//!   collection fail with a backend error, then clears itself.
//!   [`MemoryStore::fail_after`] lets a number of calls through first.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::store::{record_id, Collection, DataStore, Query, Record, StoreError};

/// How booleans are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolEncoding {
    #[default]
    Native,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Create,
    Update,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: BTreeMap<Collection, Vec<Record>>,
    encoding: BoolEncoding,
    failures: RefCell<HashMap<(Collection, StoreOp), usize>>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(encoding: BoolEncoding) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    pub fn encoding(&self) -> BoolEncoding {
        self.encoding
    }

    /// Fail the next `op` on `collection` once.
    pub fn fail_next(&mut self, collection: Collection, op: StoreOp) {
        self.fail_after(collection, op, 0);
    }

    /// Let `skip` calls of `op` on `collection` succeed, then fail one.
    pub fn fail_after(&mut self, collection: Collection, op: StoreOp, skip: usize) {
        self.failures.borrow_mut().insert((collection, op), skip);
    }

    /// Number of records currently held in `collection`.
    pub fn len(&self, collection: Collection) -> usize {
        self.collections.get(&collection).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    /// Successful create and update calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Raw record lookup, bypassing failure injection.
    pub fn get(&self, collection: Collection, id: &str) -> Option<&Record> {
        self.collections
            .get(&collection)?
            .iter()
            .find(|r| record_id(r) == Some(id))
    }

    /// Snapshot of every collection, keyed by collection name.
    pub fn dump(&self) -> Value {
        let mut out = serde_json::Map::new();
        for (collection, records) in &self.collections {
            let rows = records.iter().cloned().map(Value::Object).collect();
            out.insert(collection.name().to_string(), Value::Array(rows));
        }
        Value::Object(out)
    }

    fn take_failure(&self, collection: Collection, op: StoreOp) -> Result<(), StoreError> {
        let mut failures = self.failures.borrow_mut();
        let Some(skip) = failures.get_mut(&(collection, op)) else {
            return Ok(());
        };
        if *skip > 0 {
            *skip -= 1;
            return Ok(());
        }
        failures.remove(&(collection, op));
        log::debug!("memory store: injected {:?} failure on {}", op, collection);
        Err(StoreError::Backend {
            collection,
            message: format!("injected {:?} failure", op),
        })
    }

    fn encode(&self, record: &mut Record) {
        if self.encoding == BoolEncoding::Integer {
            for value in record.values_mut() {
                if let Value::Bool(b) = value {
                    *value = Value::from(u8::from(*b));
                }
            }
        }
    }
}

impl DataStore for MemoryStore {
    fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.take_failure(collection, StoreOp::List)?;
        let mut rows: Vec<Record> = self
            .collections
            .get(&collection)
            .map(|records| records.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();
        query.arrange(&mut rows);
        Ok(rows)
    }

    fn create(&mut self, collection: Collection, mut record: Record) -> Result<Record, StoreError> {
        self.take_failure(collection, StoreOp::Create)?;
        let id = record_id(&record)
            .ok_or(StoreError::MissingId { collection })?
            .to_string();
        if self.get(collection, &id).is_some() {
            return Err(StoreError::DuplicateId { collection, id });
        }
        self.encode(&mut record);
        self.collections
            .entry(collection)
            .or_default()
            .push(record.clone());
        self.writes += 1;
        Ok(record)
    }

    fn update(
        &mut self,
        collection: Collection,
        id: &str,
        mut patch: Record,
    ) -> Result<Record, StoreError> {
        self.take_failure(collection, StoreOp::Update)?;
        self.encode(&mut patch);
        let record = self
            .collections
            .get_mut(&collection)
            .and_then(|records| records.iter_mut().find(|r| record_id(r) == Some(id)))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;
        // The id is immutable.
        patch.remove("id");
        for (key, value) in patch {
            record.insert(key, value);
        }
        let updated = record.clone();
        self.writes += 1;
        Ok(updated)
    }
}
