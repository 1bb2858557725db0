//! Client for the hosted record API
//!
//! The record API stores rows in named tables. Every response is wrapped in
//! an envelope with a success flag and either a `data` payload (reads) or a
//! list of per-record `results` (writes). This module hides that envelope
//! and turns every failure into a [`StoreError`].

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::error::{FieldError, StoreError, StoreResult};

/// Connection settings for the record API
#[derive(Debug, Clone)]
pub struct RecordClientConfig {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

/// A single `where` condition of a fetch query
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field_name: String,
    pub operator: String,
    pub values: Vec<Value>,
}

impl Condition {
    pub fn equal_to(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field_name: field.to_string(),
            operator: "EqualTo".to_string(),
            values: vec![value.into()],
        }
    }
}

/// Field selection and filter for `fetch_records`
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchQuery {
    pub fields: Vec<String>,
    #[serde(rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl FetchQuery {
    pub fn fields(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            conditions: Vec::new(),
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: Vec<RecordResult>,
}

/// Outcome of one record in a create/update/delete batch
#[derive(Debug, Deserialize)]
struct RecordResult {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

#[derive(Serialize)]
struct RecordsBody<'a, B: Serialize> {
    records: &'a [B],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteBody<'a> {
    record_ids: &'a [i64],
}

/// Record API client
#[derive(Debug, Clone)]
pub struct RecordClient {
    http: Client,
    config: RecordClientConfig,
}

impl RecordClient {
    /// Create a new client
    pub fn new(config: RecordClientConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(StoreError::Transport)?;
        Ok(Self { http, config })
    }

    /// Create a client from the shared backend configuration
    pub fn from_config(backend: &BackendConfig) -> StoreResult<Self> {
        let (Some(project_id), Some(public_key)) = (&backend.project_id, &backend.public_key)
        else {
            return Err(StoreError::Unavailable(
                "project_id and public_key must be configured".to_string(),
            ));
        };

        Self::new(RecordClientConfig {
            base_url: backend.api_url.trim_end_matches('/').to_string(),
            project_id: project_id.clone(),
            public_key: public_key.clone(),
            timeout: Duration::from_secs(backend.timeout_seconds),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/projects/{}/tables/{}",
            self.config.base_url, self.config.project_id, table
        )
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("X-Project-Id", &self.config.project_id)
            .header("X-Public-Key", &self.config.public_key)
    }

    /// Fetch all records of a table matching the query
    pub async fn fetch_records<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &FetchQuery,
    ) -> StoreResult<Vec<T>> {
        debug!("Fetching records from table {}", table);
        let url = format!("{}/records/query", self.table_url(table));
        let response = self.request(Method::POST, url).json(query).send().await?;
        let envelope: DataEnvelope<Vec<T>> = Self::decode(response).await?;
        Self::check_envelope(envelope.success, envelope.message)?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Fetch one record by id, `None` when the table has no such record
    pub async fn get_record_by_id<T: DeserializeOwned>(
        &self,
        table: &str,
        id: i64,
    ) -> StoreResult<Option<T>> {
        debug!("Fetching record {} from table {}", id, table);
        let url = format!("{}/records/{}", self.table_url(table), id);
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: DataEnvelope<T> = Self::decode(response).await?;
        Self::check_envelope(envelope.success, envelope.message)?;
        Ok(envelope.data)
    }

    /// Create records and return them as stored by the API
    pub async fn create_records<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        records: &[B],
    ) -> StoreResult<Vec<T>> {
        let url = format!("{}/records", self.table_url(table));
        let response = self
            .request(Method::POST, url)
            .json(&RecordsBody { records })
            .send()
            .await?;
        Self::collect_results(response).await
    }

    /// Update records (each body must carry its `Id`) and return the stored rows
    pub async fn update_records<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        records: &[B],
    ) -> StoreResult<Vec<T>> {
        let url = format!("{}/records", self.table_url(table));
        let response = self
            .request(Method::PATCH, url)
            .json(&RecordsBody { records })
            .send()
            .await?;
        Self::collect_results(response).await
    }

    /// Delete records by id
    pub async fn delete_records(&self, table: &str, ids: &[i64]) -> StoreResult<()> {
        let url = format!("{}/records", self.table_url(table));
        let response = self
            .request(Method::DELETE, url)
            .json(&DeleteBody { record_ids: ids })
            .send()
            .await?;
        let envelope: ResultsEnvelope = Self::decode(response).await?;
        Self::check_envelope(envelope.success, envelope.message)?;
        for result in envelope.results {
            Self::check_result(&result)?;
        }
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Record API returned {}: {}", status, body);
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }

    fn check_envelope(success: bool, message: Option<String>) -> StoreResult<()> {
        if success {
            Ok(())
        } else {
            Err(StoreError::Rejected {
                message: message.unwrap_or_else(|| "Request failed".to_string()),
                fields: Vec::new(),
            })
        }
    }

    fn check_result(result: &RecordResult) -> StoreResult<()> {
        if result.success {
            return Ok(());
        }
        Err(StoreError::Rejected {
            message: result
                .message
                .clone()
                .unwrap_or_else(|| "Record operation failed".to_string()),
            fields: result.errors.clone(),
        })
    }

    async fn collect_results<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> StoreResult<Vec<T>> {
        let envelope: ResultsEnvelope = Self::decode(response).await?;
        Self::check_envelope(envelope.success, envelope.message)?;

        let mut rows = Vec::with_capacity(envelope.results.len());
        for result in envelope.results {
            Self::check_result(&result)?;
            let data = result
                .data
                .ok_or_else(|| StoreError::Decode("record result without data".to_string()))?;
            rows.push(serde_json::from_value(data)?);
        }
        Ok(rows)
    }
}
