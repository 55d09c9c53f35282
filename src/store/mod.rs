pub mod dates;
pub mod http_store;
pub mod memory_store;
pub mod patch;
pub mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::state::{Config, StoreConfig};

pub use http_store::HttpRecordStore;
pub use memory_store::MemoryRecordStore;
pub use patch::Patch;

pub type Record = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("malformed {table} record: {source}")]
    MalformedRecord {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no result returned from {0}")]
    EmptyResult(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortType {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    pub sorttype: SortType,
}

/// Only exact matches are needed; on a lookup field the values may be ids or display names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: &'static str,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

impl Condition {
    pub fn exact_match(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field_name: field.to_string(),
            operator: "ExactMatch",
            values: vec![value.into()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchQuery {
    pub fields: Vec<&'static str>,
    pub conditions: Vec<Condition>,
    pub order_by: Option<OrderBy>,
}

impl FetchQuery {
    pub fn fields(fields: &[&'static str]) -> Self {
        Self {
            fields: fields.to_vec(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, field: &str, sorttype: SortType) -> Self {
        self.order_by = Some(OrderBy {
            field_name: field.to_string(),
            sorttype,
        });
        self
    }
}

/// CRUD access to the remote record tables.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_records(&self, table: &'static str, query: &FetchQuery)
        -> StoreResult<Vec<Value>>;

    async fn get_record(
        &self,
        table: &'static str,
        fields: &[&'static str],
        id: i64,
    ) -> StoreResult<Option<Value>>;

    /// Returns the id assigned by the store.
    async fn create_record(&self, table: &'static str, record: Record) -> StoreResult<i64>;

    /// `false` when no record has this id.
    async fn update_record(&self, table: &'static str, id: i64, record: Record)
        -> StoreResult<bool>;

    async fn delete_record(&self, table: &'static str, id: i64) -> StoreResult<bool>;
}

pub type SharedStore = Arc<dyn RecordStore>;

pub fn create_store(config: &Config) -> crate::error::Result<SharedStore> {
    match &config.store {
        StoreConfig::Memory => {
            tracing::warn!("RECORD_STORE_URL not set, using the in-memory record store");
            Ok(Arc::new(MemoryRecordStore::with_default_categories()))
        }
        StoreConfig::Http(http) => {
            tracing::info!("Using record store at {}", http.base_url);
            Ok(Arc::new(HttpRecordStore::new(http)?))
        }
    }
}

/// Deserializes one record into its fixed storage schema.
pub fn decode<T: serde::de::DeserializeOwned>(table: &'static str, value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(|source| StoreError::MalformedRecord { table, source })
}

/// Serializes a storage struct into the flat map the store accepts.
pub fn encode<T: Serialize>(table: &'static str, record: &T) -> StoreResult<Record> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Rejected(format!("{table} record is not an object"))),
        Err(source) => Err(StoreError::MalformedRecord { table, source }),
    }
}
