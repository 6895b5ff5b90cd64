//! Stub backend for tests
//!
//! An in-memory implementation of [`TimeSeriesClient`] and [`HealthProbe`]
//! so the engine can be exercised without a running server. Responses are
//! queued ahead of time; every executed query text is recorded for
//! assertions.
//!
//! Not suitable for production use: nothing is actually queried and the
//! queue drains across calls.

use crate::backend::{HealthProbe, Precision, QueryResponse, RawListing, TimeSeriesClient};
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory backend stub
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    listing: RwLock<RawListing>,
    queued: RwLock<VecDeque<QueryResponse>>,
    executed: RwLock<Vec<String>>,
    version: RwLock<String>,
    probe_failures: AtomicU64,
    probe_calls: AtomicU64,
}

impl InMemoryBackend {
    /// Create a stub reporting the given backend version
    pub fn with_version(version: &str) -> Self {
        Self {
            version: RwLock::new(version.to_string()),
            ..Default::default()
        }
    }

    /// Set the raw listing returned by `list_measurements`
    pub fn set_listing(&self, listing: RawListing) {
        *self.listing.write() = listing;
    }

    /// Queue a response for the next executed query
    pub fn queue_response(&self, response: QueryResponse) {
        self.queued.write().push_back(response);
    }

    /// Make the next `count` probe calls fail before succeeding
    pub fn fail_next_probes(&self, count: u64) {
        self.probe_failures.store(count, Ordering::SeqCst);
    }

    /// Query texts executed so far, in order
    pub fn executed_queries(&self) -> Vec<String> {
        self.executed.read().clone()
    }

    /// Number of probe calls seen so far
    pub fn probe_calls(&self) -> u64 {
        self.probe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimeSeriesClient for InMemoryBackend {
    async fn execute_query(&self, query: &str, _precision: Precision) -> Result<QueryResponse> {
        self.executed.write().push(query.to_string());
        Ok(self.queued.write().pop_front().unwrap_or_default())
    }

    async fn list_measurements(&self) -> Result<RawListing> {
        Ok(self.listing.read().clone())
    }
}

#[async_trait]
impl HealthProbe for InMemoryBackend {
    async fn version_string(&self) -> Result<String> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.probe_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.probe_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::BackendUnavailable(
                "stub probe failure".to_string(),
            ));
        }

        Ok(self.version.read().clone())
    }
}
