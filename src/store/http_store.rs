use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::schema::{self, ID};
use super::{Condition, FetchQuery, OrderBy, Record, RecordStore, StoreError, StoreResult};
use crate::error::{AppError, Result};
use crate::state::HttpStoreConfig;

#[derive(Serialize)]
struct FieldName<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
}

#[derive(Serialize)]
struct ReferenceField<'a> {
    field: FieldName<'a>,
}

/// Lookup fields also name the display field of the referenced record.
#[derive(Serialize)]
struct FieldRef<'a> {
    field: FieldName<'a>,
    #[serde(rename = "referenceField", skip_serializing_if = "Option::is_none")]
    reference_field: Option<ReferenceField<'a>>,
}

fn field_refs<'a>(table: &str, fields: &[&'a str]) -> Vec<FieldRef<'a>> {
    fields
        .iter()
        .map(|&name| FieldRef {
            field: FieldName { name },
            reference_field: schema::lookup(table, name).map(|l| ReferenceField {
                field: FieldName { name: l.display },
            }),
        })
        .collect()
}

#[derive(Serialize)]
struct FetchBody<'a> {
    fields: Vec<FieldRef<'a>>,
    #[serde(rename = "where", skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<&'a Condition>,
    #[serde(rename = "orderBy", skip_serializing_if = "Vec::is_empty")]
    order_by: Vec<&'a OrderBy>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RecordResult {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: Vec<RecordResult>,
}

fn rejected(message: Option<String>) -> StoreError {
    StoreError::Rejected(message.unwrap_or_else(|| "unknown error".to_string()))
}

/// Client for the remote record store.
#[derive(Clone)]
pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecordStore {
    pub fn new(config: &HttpStoreConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let project_id = HeaderValue::from_str(&config.project_id)
            .map_err(|e| AppError::Config(format!("RECORD_STORE_PROJECT_ID: {e}")))?;
        let public_key = HeaderValue::from_str(&config.public_key)
            .map_err(|e| AppError::Config(format!("RECORD_STORE_PUBLIC_KEY: {e}")))?;
        headers.insert("X-Project-Id", project_id);
        headers.insert("X-Public-Key", public_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("record store client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, table: &str, action: &str) -> String {
        format!("{}/tables/{}/{}", self.base_url, table, action)
    }

    async fn post<B: Serialize + ?Sized, R: serde::de::DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> StoreResult<R> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<R>().await?)
    }

    /// Sends a single-record mutation and returns its per-record result.
    async fn mutate(
        &self,
        table: &'static str,
        action: &str,
        body: Value,
    ) -> StoreResult<RecordResult> {
        let envelope: ResultsEnvelope = self.post(self.url(table, action), &body).await?;
        if !envelope.success {
            tracing::error!("Error in {} {}: {:?}", action, table, envelope.message);
            return Err(rejected(envelope.message));
        }
        envelope
            .results
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::EmptyResult(format!("{action} {table}")))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch_records(
        &self,
        table: &'static str,
        query: &FetchQuery,
    ) -> StoreResult<Vec<Value>> {
        let body = FetchBody {
            fields: field_refs(table, &query.fields),
            conditions: query.conditions.iter().collect(),
            order_by: query.order_by.iter().collect(),
        };
        let envelope: DataEnvelope = self.post(self.url(table, "fetch"), &body).await?;
        if !envelope.success {
            tracing::error!("Error fetching {}: {:?}", table, envelope.message);
            return Err(rejected(envelope.message));
        }

        match envelope.data {
            Some(Value::Array(rows)) => Ok(rows),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(StoreError::Rejected(format!(
                "expected a list of {table} records, got {other}"
            ))),
        }
    }

    async fn get_record(
        &self,
        table: &'static str,
        fields: &[&'static str],
        id: i64,
    ) -> StoreResult<Option<Value>> {
        let body = json!({ "fields": field_refs(table, fields) });
        let envelope: DataEnvelope = self
            .post(self.url(table, &format!("records/{id}")), &body)
            .await?;
        if !envelope.success {
            tracing::error!("Error fetching {} #{}: {:?}", table, id, envelope.message);
            return Err(rejected(envelope.message));
        }
        Ok(envelope.data.filter(|v| !v.is_null()))
    }

    async fn create_record(&self, table: &'static str, record: Record) -> StoreResult<i64> {
        let result = self.mutate(table, "create", json!({ "records": [record] })).await?;
        if !result.success {
            return Err(rejected(result.message));
        }
        result
            .data
            .as_ref()
            .and_then(|d| d.get(ID))
            .and_then(Value::as_i64)
            .ok_or_else(|| StoreError::EmptyResult(format!("create {table}")))
    }

    async fn update_record(
        &self,
        table: &'static str,
        id: i64,
        mut record: Record,
    ) -> StoreResult<bool> {
        record.insert(ID.to_string(), json!(id));
        let result = self.mutate(table, "update", json!({ "records": [record] })).await?;
        if !result.success {
            tracing::warn!("Update of {} #{} refused: {:?}", table, id, result.message);
        }
        Ok(result.success)
    }

    async fn delete_record(&self, table: &'static str, id: i64) -> StoreResult<bool> {
        let result = self.mutate(table, "delete", json!({ "RecordIds": [id] })).await?;
        if !result.success {
            tracing::warn!("Delete of {} #{} refused: {:?}", table, id, result.message);
        }
        Ok(result.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::{CATEGORY_FIELDS, CATEGORY_TABLE, NAME};
    use crate::store::SortType;
    use axum::{
        extract::{Path, State},
        http::HeaderMap as AxumHeaders,
        routing::post,
        Json, Router,
    };
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    async fn fetch(
        State(seen): State<Seen>,
        headers: AxumHeaders,
        Path(table): Path<String>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let key = headers
            .get("X-Public-Key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.lock().unwrap().push((format!("fetch {table} {key}"), body));
        Json(json!({ "success": true, "data": [{ "Id": 1, "Name": "Work", "color_c": "#fff" }] }))
    }

    async fn get_one(Path((_table, id)): Path<(String, i64)>) -> Json<Value> {
        if id == 1 {
            Json(json!({ "success": true, "data": { "Id": 1, "Name": "Work" } }))
        } else {
            Json(json!({ "success": true, "data": null }))
        }
    }

    async fn create(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
        seen.lock().unwrap().push(("create".to_string(), body));
        Json(json!({ "success": true, "results": [{ "success": true, "data": { "Id": 42 } }] }))
    }

    async fn update(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
        seen.lock().unwrap().push(("update".to_string(), body));
        Json(json!({ "success": true, "results": [{ "success": false, "message": "Record not found" }] }))
    }

    async fn delete() -> Json<Value> {
        Json(json!({ "success": false, "message": "Invalid public key" }))
    }

    async fn spawn_mock() -> (HttpRecordStore, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/tables/:table/fetch", post(fetch))
            .route("/tables/:table/records/:id", post(get_one))
            .route("/tables/:table/create", post(create))
            .route("/tables/:table/update", post(update))
            .route("/tables/:table/delete", post(delete))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let store = HttpRecordStore::new(&HttpStoreConfig {
            base_url: format!("http://{addr}/"),
            project_id: "project".to_string(),
            public_key: "secret".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        (store, seen)
    }

    #[tokio::test]
    async fn test_fetch_sends_query_envelope() {
        let (store, seen) = spawn_mock().await;
        let query = FetchQuery::fields(CATEGORY_FIELDS).order_by(NAME, SortType::Asc);

        let rows = store.fetch_records(CATEGORY_TABLE, &query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Name"], json!("Work"));

        let seen = seen.lock().unwrap();
        let (label, body) = &seen[0];
        assert_eq!(label, "fetch category_c secret");
        assert_eq!(body["fields"][1], json!({ "field": { "Name": "Name" } }));
        assert_eq!(body["orderBy"], json!([{ "fieldName": "Name", "sorttype": "ASC" }]));
        assert!(body.get("where").is_none());
    }

    #[tokio::test]
    async fn test_get_record_missing_is_none() {
        let (store, _) = spawn_mock().await;
        assert!(store
            .get_record(CATEGORY_TABLE, CATEGORY_FIELDS, 1)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .get_record(CATEGORY_TABLE, CATEGORY_FIELDS, 2)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_returns_new_id() {
        let (store, seen) = spawn_mock().await;
        let mut record = Record::new();
        record.insert("Name".to_string(), json!("Errands"));

        let id = store.create_record(CATEGORY_TABLE, record).await.unwrap();
        assert_eq!(id, 42);
        assert_eq!(seen.lock().unwrap()[0].1["records"][0]["Name"], json!("Errands"));
    }

    #[tokio::test]
    async fn test_update_refused_maps_to_false() {
        let (store, seen) = spawn_mock().await;
        let updated = store
            .update_record(CATEGORY_TABLE, 9, Record::new())
            .await
            .unwrap();
        assert!(!updated);
        assert_eq!(seen.lock().unwrap()[0].1["records"][0]["Id"], json!(9));
    }

    #[tokio::test]
    async fn test_envelope_failure_is_rejected() {
        let (store, _) = spawn_mock().await;
        let err = store.delete_record(CATEGORY_TABLE, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(msg) if msg == "Invalid public key"));
    }
}
