//! Process-local record store.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::domain::entities::model::DEFAULT_PK_FIELD;
use crate::domain::entities::{ModelKey, NewRecord, Record, RecordPatch, RecordQuery};
use crate::domain::repositories::RecordRepository;
use crate::error::AppError;

#[derive(Debug, Clone)]
struct StoredRecord {
    ctype: ModelKey,
    data: Map<String, Value>,
}

impl StoredRecord {
    fn to_record(&self, id: i64) -> Record {
        let mut values = self.data.clone();
        values.insert(DEFAULT_PK_FIELD.to_string(), Value::from(id));
        Record::new(id.to_string(), self.ctype.clone(), values)
    }
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    /// Records per base type, in primary key order.
    by_base: HashMap<ModelKey, BTreeMap<i64, StoredRecord>>,
}

/// In-memory [`RecordRepository`], used when no database is configured.
///
/// Primary keys are positive integers from a single sequence shared by every
/// base type. Data is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts records in order, for startup seeding.
    pub fn seeded(records: impl IntoIterator<Item = NewRecord>) -> Self {
        let repository = Self::new();
        {
            let mut tables = repository.tables.write();
            for record in records {
                insert(&mut tables, record);
            }
        }
        repository
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_base.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert(tables: &mut Tables, new_record: NewRecord) -> Record {
    tables.next_id += 1;
    let id = tables.next_id;

    let mut data = new_record.values;
    data.remove(DEFAULT_PK_FIELD);
    let stored = StoredRecord {
        ctype: new_record.ctype,
        data,
    };
    let record = stored.to_record(id);

    tables
        .by_base
        .entry(new_record.base)
        .or_default()
        .insert(id, stored);
    record
}

/// Keys that are not integers can never match.
fn parse_pk(pk: &str) -> Option<i64> {
    pk.parse().ok()
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn fetch_discriminator(
        &self,
        base: &ModelKey,
        pk: &str,
    ) -> Result<Option<ModelKey>, AppError> {
        let Some(id) = parse_pk(pk) else {
            return Ok(None);
        };
        let tables = self.tables.read();
        Ok(tables
            .by_base
            .get(base)
            .and_then(|table| table.get(&id))
            .map(|stored| stored.ctype.clone()))
    }

    async fn query(&self, query: &RecordQuery) -> Result<Vec<Record>, AppError> {
        let tables = self.tables.read();
        let Some(table) = tables.by_base.get(&query.base) else {
            return Ok(Vec::new());
        };

        Ok(table
            .iter()
            .filter(|(_, stored)| query.ctype.as_ref().is_none_or(|c| *c == stored.ctype))
            .map(|(id, stored)| {
                let record = stored.to_record(*id);
                Record {
                    values: query.project(&record.values),
                    ..record
                }
            })
            .collect())
    }

    async fn get(&self, base: &ModelKey, pk: &str) -> Result<Option<Record>, AppError> {
        let Some(id) = parse_pk(pk) else {
            return Ok(None);
        };
        let tables = self.tables.read();
        Ok(tables
            .by_base
            .get(base)
            .and_then(|table| table.get(&id))
            .map(|stored| stored.to_record(id)))
    }

    async fn create(&self, new_record: NewRecord) -> Result<Record, AppError> {
        Ok(insert(&mut self.tables.write(), new_record))
    }

    async fn update(
        &self,
        base: &ModelKey,
        pk: &str,
        patch: RecordPatch,
    ) -> Result<Record, AppError> {
        let unknown = || AppError::UnknownRecord {
            base: base.clone(),
            pk: pk.to_string(),
        };
        let id = parse_pk(pk).ok_or_else(unknown)?;

        let mut tables = self.tables.write();
        let stored = tables
            .by_base
            .get_mut(base)
            .and_then(|table| table.get_mut(&id))
            .ok_or_else(unknown)?;

        for (field, value) in patch.values {
            if field != DEFAULT_PK_FIELD {
                stored.data.insert(field, value);
            }
        }
        Ok(stored.to_record(id))
    }

    async fn delete(&self, base: &ModelKey, pk: &str) -> Result<bool, AppError> {
        let Some(id) = parse_pk(pk) else {
            return Ok(false);
        };
        let mut tables = self.tables.write();
        Ok(tables
            .by_base
            .get_mut(base)
            .and_then(|table| table.remove(&id))
            .is_some())
    }
}
