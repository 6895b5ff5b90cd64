//! Query engine orchestration
//!
//! Composes the planner, query builder, backend client and normalizer:
//! plan the window and batches, render one query per batch, dispatch each
//! through the injected client, and merge the responses into one result.

pub mod builder;
pub mod stubs;

pub use builder::EngineBuilder;

use crate::backend::normalize::{self, ListingFormat};
use crate::backend::version::{BackendVersion, VersionDetector};
use crate::backend::{Precision, TimeSeriesClient};
use crate::error::Result;
use crate::query::builder::aggregate_query;
use crate::query::planner::QueryPlanner;
use crate::types::{QueryResult, UnixSeconds};
use std::sync::Arc;
use tracing::debug;

/// Metrics query engine
///
/// One engine serves many requests; it is `Send + Sync` and usable behind an
/// `Arc`. The only state mutated after construction is the two
/// computed-once caches (compiled aggregate rules, backend version), both
/// safe under concurrent first use.
pub struct QueryEngine {
    client: Arc<dyn TimeSeriesClient>,
    planner: QueryPlanner,
    detector: VersionDetector,
}

impl QueryEngine {
    /// Start building an engine
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn from_parts(
        client: Arc<dyn TimeSeriesClient>,
        planner: QueryPlanner,
        detector: VersionDetector,
    ) -> Self {
        Self {
            client,
            planner,
            detector,
        }
    }

    /// Query the named metrics over `(start, end]`, unix seconds
    ///
    /// One backend query is issued per distinct aggregate function among the
    /// requested metrics, sequentially; the merged result is keyed by series
    /// name and owned by the caller.
    pub async fn query(
        &self,
        metrics: &[String],
        start: UnixSeconds,
        end: UnixSeconds,
    ) -> Result<QueryResult> {
        let window = self.planner.window(start, end)?;
        let batch = self.planner.plan(metrics)?;

        debug!(
            metrics = metrics.len(),
            batches = batch.len(),
            step_secs = window.step_secs,
            "planned metrics query"
        );

        let mut responses = Vec::with_capacity(batch.len());
        for entry in batch.entries() {
            let text = aggregate_query(&entry.metrics, &window, &entry.function);

            debug!(
                function = %entry.function,
                series = entry.metrics.len(),
                "executing batch query"
            );

            let response = self.client.execute_query(&text, Precision::Seconds).await?;
            responses.push(response);
        }

        let result = normalize::merge(&responses, &window)?;

        debug!(series = result.series.len(), "metrics query complete");

        Ok(result)
    }

    /// List the series names known to the backend
    ///
    /// The listing shape depends on the backend version; an empty backend
    /// yields an empty list without touching the version probe.
    pub async fn list_series(&self) -> Result<Vec<String>> {
        let listing = self.client.list_measurements().await?;

        if listing.series.is_none() {
            return Ok(Vec::new());
        }

        let version = self.detector.version().await?;
        let format = ListingFormat::for_version(version);
        normalize::series_names(&listing, format)
    }

    /// The detected backend version, probing on first use
    ///
    /// The first successful probe is cached for the engine's lifetime;
    /// failures are returned to the caller and retried on the next call.
    pub async fn backend_version(&self) -> Result<&BackendVersion> {
        self.detector.version().await
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("detector", &self.detector)
            .finish()
    }
}
