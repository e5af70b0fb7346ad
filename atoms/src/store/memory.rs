use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{Record, RecordStore, StoreError};

/// In-memory store used by the test suite. Same patch/scan semantics as the
/// DynamoDB implementation, minus the network.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, HashMap<String, Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, collection: &str, mut fields: Record) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        fields.insert("id".to_string(), Value::String(id.clone()));

        let mut records = self.records.lock().unwrap();
        records
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);

        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .get(collection)
            .and_then(|coll| coll.get(id))
            .cloned())
    }

    async fn update(&self, collection: &str, id: &str, patch: Record) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(collection)
            .and_then(|coll| coll.get_mut(id))
            .ok_or_else(|| StoreError::Missing {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        for (key, value) in patch {
            if value.is_null() {
                record.remove(&key);
            } else {
                record.insert(key, value);
            }
        }

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        if let Some(coll) = records.get_mut(collection) {
            coll.remove(id);
        }
        Ok(())
    }

    async fn scan(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Record>, StoreError> {
        let records = self.records.lock().unwrap();
        let Some(coll) = records.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(coll
            .values()
            .filter(|record| {
                filters
                    .iter()
                    .all(|(field, expected)| record.get(*field) == Some(expected))
            })
            .cloned()
            .collect())
    }
}
