//! HTTP implementation of the backend collaborators
//!
//! Talks to InfluxDB's HTTP API: `/query` for aggregation queries and the
//! measurement listing, `/ping` for the version probe. The `/ping` endpoint
//! answers 204 with the version in a response header, so the probe never
//! reads a body; this is also why the probe is a direct request rather than
//! a query through the normal interface.

use crate::backend::{HealthProbe, Precision, QueryResponse, RawListing, RawSeries, TimeSeriesClient};
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Response header carrying the backend version
const VERSION_HEADER: &str = "X-Influxdb-Version";

/// Query text listing the known measurements
const LIST_MEASUREMENTS: &str = "SHOW MEASUREMENTS";

/// Request timeout for backend calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP backend client
///
/// Implements both [`TimeSeriesClient`] and [`HealthProbe`] against a single
/// server, so one instance can serve as both collaborators of the engine.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    database: String,
    user: String,
    password: String,
}

impl HttpBackend {
    /// Create a client from backend connection configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    /// Issue a query and decode the response envelope
    async fn run_query(&self, query: &str, epoch: Option<&str>) -> Result<ApiStatementResult> {
        let mut params = vec![
            ("db", self.database.as_str()),
            ("u", self.user.as_str()),
            ("p", self.password.as_str()),
            ("q", query),
        ];
        if let Some(epoch) = epoch {
            params.push(("epoch", epoch));
        }

        debug!(query = query, "dispatching backend query");

        let response = self
            .http
            .get(format!("{}/query", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(|e| Error::BackendUnavailable(format!("Query dispatch failed: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::BackendProtocol(format!(
                "Backend rejected query with {}: {}",
                status, body
            )));
        }
        if !status.is_success() {
            return Err(Error::BackendUnavailable(format!(
                "Backend returned {}",
                status
            )));
        }

        let envelope: ApiEnvelope = response.json().await.map_err(|e| {
            Error::BackendProtocol(format!("Undecodable query response: {}", e))
        })?;

        first_result(envelope)
    }
}

#[async_trait]
impl TimeSeriesClient for HttpBackend {
    async fn execute_query(&self, query: &str, precision: Precision) -> Result<QueryResponse> {
        let result = self.run_query(query, Some(precision.epoch())).await?;
        Ok(QueryResponse {
            series: result.series.unwrap_or_default(),
        })
    }

    async fn list_measurements(&self) -> Result<RawListing> {
        let result = self.run_query(LIST_MEASUREMENTS, None).await?;
        // An absent series section is how an empty backend answers; keep
        // the distinction for the normalizer.
        Ok(RawListing {
            series: result.series,
        })
    }
}

#[async_trait]
impl HealthProbe for HttpBackend {
    async fn version_string(&self) -> Result<String> {
        let response = self
            .http
            .get(format!("{}/ping", self.base_url))
            .send()
            .await
            .map_err(|e| Error::BackendUnavailable(format!("Health probe failed: {}", e)))?;

        response
            .headers()
            .get(VERSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                Error::BackendUnavailable(format!(
                    "Health response carries no {} header",
                    VERSION_HEADER
                ))
            })
    }
}

/// Top-level query response envelope
#[derive(Debug, Default, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    results: Vec<ApiStatementResult>,
    error: Option<String>,
}

/// Result of one statement within the envelope
#[derive(Debug, Default, Deserialize)]
struct ApiStatementResult {
    series: Option<Vec<RawSeries>>,
    error: Option<String>,
}

/// Unwrap the first statement result, surfacing backend-reported errors
fn first_result(envelope: ApiEnvelope) -> Result<ApiStatementResult> {
    if let Some(error) = envelope.error {
        return Err(Error::BackendProtocol(format!(
            "Backend reported error: {}",
            error
        )));
    }

    let result = envelope.results.into_iter().next().unwrap_or_default();
    if let Some(error) = result.error {
        return Err(Error::BackendProtocol(format!(
            "Backend reported error: {}",
            error
        )));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_query_envelope() {
        let envelope: ApiEnvelope = serde_json::from_str(
            r#"{
                "results": [{
                    "statement_id": 0,
                    "series": [{
                        "name": "cpu.a",
                        "columns": ["time", "value"],
                        "values": [[100, 1.5], [160, null]]
                    }]
                }]
            }"#,
        )
        .unwrap();

        let result = first_result(envelope).unwrap();
        let series = result.series.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name.as_deref(), Some("cpu.a"));
        assert_eq!(series[0].columns, vec!["time", "value"]);
        assert_eq!(series[0].values.len(), 2);
    }

    #[test]
    fn test_decode_empty_statement_result() {
        // An empty backend answers with a result object carrying no series
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"results": [{"statement_id": 0}]}"#).unwrap();
        let result = first_result(envelope).unwrap();
        assert!(result.series.is_none());
    }

    #[test]
    fn test_backend_reported_error() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"results": [{"error": "database not found"}]}"#).unwrap();
        let err = first_result(envelope).unwrap_err();
        assert!(matches!(err, Error::BackendProtocol(_)));
        assert!(err.to_string().contains("database not found"));
    }

    #[test]
    fn test_top_level_error() {
        let envelope: ApiEnvelope =
            serde_json::from_str(r#"{"error": "unauthorized"}"#).unwrap();
        assert!(first_result(envelope).is_err());
    }

    #[test]
    fn test_client_construction() {
        let backend = HttpBackend::new(&BackendConfig::default()).unwrap();
        assert_eq!(backend.base_url, "http://localhost:8086");
        assert_eq!(backend.database, "graphite");
    }
}
