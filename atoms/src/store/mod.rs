use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod dynamo;
pub mod memory;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

/// One persisted document: flat field map, always carrying an `id` field.
pub type Record = serde_json::Map<String, Value>;

/// Collection names double as the DynamoDB partition key.
pub mod collections {
    pub const CATEGORIES: &str = "CATEGORY";
    pub const TAGS: &str = "TAG";
    pub const IMAGES: &str = "IMAGE";
    pub const PIECES: &str = "PIECE";
}

/// Serialize a model into its stored record shape. Only JSON objects can be
/// persisted; anything else is a backend error rather than an empty record.
pub fn encode<T: serde::Serialize>(value: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Backend(format!(
            "refusing to store a non-object record: {}",
            other
        ))),
        Err(e) => Err(StoreError::Backend(format!("unencodable record: {}", e))),
    }
}

/// Deserialize a stored record back into a model. A record that no longer
/// matches the schema contract surfaces as a backend error, not a panic.
pub fn decode<T: serde::de::DeserializeOwned>(record: Record) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| StoreError::Backend(format!("malformed record: {}", e)))
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} record {id} does not exist")]
    Missing { collection: String, id: String },

    #[error("record store backend error: {0}")]
    Backend(String),
}

/// Abstract document store the domain services are written against.
///
/// Semantics every implementation must honor:
/// - `create` assigns a fresh id and returns it; the stored record carries
///   the id in its `id` field.
/// - `update` is a shallow patch: present keys replace whole values
///   (including nested maps), a `null` value removes the key.
/// - `scan` applies top-level equality filters only; callers sort and do any
///   richer filtering in memory. No composite-index assumptions.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, collection: &str, fields: Record) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError>;

    async fn update(&self, collection: &str, id: &str, patch: Record) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn scan(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Record>, StoreError>;
}
