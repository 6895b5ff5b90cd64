//! Core data types used throughout the bridge
//!
//! # Key Types
//!
//! - **`QueryWindow`**: the resolved time window and sampling interval for
//!   one request
//! - **`QueryResult`**: the uniform result shape handed back to the caller
//!
//! Timestamps are unix epoch seconds throughout; the backend is always
//! queried with second precision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unix timestamp in seconds since epoch
pub type UnixSeconds = i64;

/// Resolved time window for a single request
///
/// The window is half-open: samples with `start < time <= end` are included.
/// Start-exclusive bounds keep a sample that lands exactly on a boundary
/// shared by two adjacent windows from being counted twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    /// Window start in unix seconds (exclusive)
    pub start: UnixSeconds,

    /// Window end in unix seconds (inclusive)
    pub end: UnixSeconds,

    /// Sampling interval in seconds for time-bucket grouping
    pub step_secs: u64,
}

impl QueryWindow {
    /// Create a new window with validation
    ///
    /// Returns an error if `start > end` or the step is zero.
    pub fn new(start: UnixSeconds, end: UnixSeconds, step_secs: u64) -> crate::Result<Self> {
        if start > end {
            return Err(crate::Error::Configuration(format!(
                "Invalid query window: start {} > end {}",
                start, end
            )));
        }
        if step_secs == 0 {
            return Err(crate::Error::Configuration(
                "Invalid query window: step must be > 0".to_string(),
            ));
        }
        Ok(Self {
            start,
            end,
            step_secs,
        })
    }

    /// Elapsed span of this window in seconds
    pub fn span_secs(&self) -> i64 {
        self.end - self.start
    }
}

/// Uniform query result returned to the caller
///
/// One entry per series actually returned by the backend, each holding the
/// per-bucket samples in time-ascending order. Buckets the backend left
/// empty are preserved as `None`. The engine keeps no reference to the
/// result after returning it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Per-series samples keyed by series name
    pub series: BTreeMap<String, Vec<Option<f64>>>,

    /// Window start in unix seconds
    #[serde(rename = "from")]
    pub start: UnixSeconds,

    /// Window end in unix seconds
    #[serde(rename = "to")]
    pub end: UnixSeconds,

    /// Sampling interval the samples were bucketed with
    #[serde(rename = "step")]
    pub step_secs: u64,
}

impl QueryResult {
    /// Create an empty result covering the given window
    pub fn empty(window: &QueryWindow) -> Self {
        Self {
            series: BTreeMap::new(),
            start: window.start,
            end: window.end,
            step_secs: window.step_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_window() {
        let window = QueryWindow::new(100, 200, 60).unwrap();
        assert_eq!(window.span_secs(), 100);

        // Inverted bounds are rejected
        assert!(QueryWindow::new(200, 100, 60).is_err());

        // Zero step is rejected
        assert!(QueryWindow::new(100, 200, 0).is_err());
    }

    #[test]
    fn test_empty_result_carries_window() {
        let window = QueryWindow::new(100, 200, 60).unwrap();
        let result = QueryResult::empty(&window);
        assert!(result.series.is_empty());
        assert_eq!(result.start, 100);
        assert_eq!(result.end, 200);
        assert_eq!(result.step_secs, 60);
    }

    #[test]
    fn test_result_serializes_with_wire_names() {
        let window = QueryWindow::new(0, 60, 10).unwrap();
        let json = serde_json::to_string(&QueryResult::empty(&window)).unwrap();
        assert!(json.contains("\"from\":0"));
        assert!(json.contains("\"to\":60"));
        assert!(json.contains("\"step\":10"));
    }
}
