//! Backend collaborator traits and raw wire shapes
//!
//! The engine talks to the time-series backend through two injected
//! collaborators:
//!
//! - **[`TimeSeriesClient`]**: executes aggregation queries and fetches the
//!   raw measurement listing
//! - **[`HealthProbe`]**: reads the backend's version string from its health
//!   endpoint
//!
//! Both are object-safe async traits so tests can substitute in-memory
//! implementations (see [`crate::engine::stubs`]). The bundled
//! [`http::HttpBackend`] implements both against a real InfluxDB server.

pub mod http;
pub mod normalize;
pub mod version;

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

pub use http::HttpBackend;
pub use version::{BackendVersion, VersionDetector};

/// Timestamp precision requested for query responses
///
/// The engine always asks for second precision; the variant exists so the
/// selector travels explicitly with each query call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// Unix seconds
    Seconds,
}

impl Precision {
    /// Wire value for the precision selector
    pub fn epoch(&self) -> &'static str {
        match self {
            Precision::Seconds => "s",
        }
    }
}

/// Executes queries against the time-series backend
#[async_trait]
pub trait TimeSeriesClient: Send + Sync + 'static {
    /// Execute an aggregation query, returning time-aligned rows per series
    async fn execute_query(&self, query: &str, precision: Precision) -> Result<QueryResponse>;

    /// Fetch the raw listing of known measurements
    ///
    /// The listing shape differs across backend versions; it is returned
    /// unparsed and interpreted by [`normalize::series_names`].
    async fn list_measurements(&self) -> Result<RawListing>;
}

/// Reads the backend version from its health endpoint
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// Fetch the backend's version string
    async fn version_string(&self) -> Result<String>;
}

/// Rows returned for one query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    /// One entry per series the backend returned
    #[serde(default)]
    pub series: Vec<RawSeries>,
}

/// One series as returned by the backend
///
/// Query responses carry `name`, `columns` and `values`; listing responses
/// populate only the fields their protocol version emits, which is why every
/// field is optional or defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSeries {
    /// Series (measurement) name
    pub name: Option<String>,

    /// Column names, aligned with each row of `values`
    #[serde(default)]
    pub columns: Vec<String>,

    /// Rows of column values
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

/// Raw measurement listing
///
/// `series` is `None` when the backend response carried no series section at
/// all, which is how an empty backend answers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    /// Series section of the listing response, if present
    pub series: Option<Vec<RawSeries>>,
}
