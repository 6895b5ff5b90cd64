//! Request planning
//!
//! Resolves the sampling interval for a request window and partitions the
//! requested metrics into batches by aggregate function. Batches are the
//! unit of dispatch: one backend query per batch, not per metric, keeping
//! round trips at one per distinct aggregate function in use.

use crate::error::Result;
use crate::query::aggregate::AggregateRuleSet;
use crate::query::step::StepTable;
use crate::types::{QueryWindow, UnixSeconds};

/// Metrics grouped by their resolved aggregate function
///
/// Entries appear in order of first use and each holds its metrics in
/// request order, so the rendered query text is deterministic for a given
/// request.
#[derive(Debug, Clone, Default)]
pub struct MetricBatch {
    entries: Vec<BatchEntry>,
}

/// One batch: an aggregate function and the metrics sharing it
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// Aggregate function applied to every metric in this batch
    pub function: String,

    /// Metric names queried together
    pub metrics: Vec<String>,
}

impl MetricBatch {
    /// Append a metric to the entry for `function`, creating it if absent
    fn push(&mut self, function: &str, metric: String) {
        match self.entries.iter_mut().find(|e| e.function == function) {
            Some(entry) => entry.metrics.push(metric),
            None => self.entries.push(BatchEntry {
                function: function.to_string(),
                metrics: vec![metric],
            }),
        }
    }

    /// Batch entries in order of first use
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Number of distinct aggregate functions in use
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no metrics were planned
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Plans the window and batches for a request
#[derive(Debug)]
pub struct QueryPlanner {
    steps: StepTable,
    aggregates: AggregateRuleSet,
}

impl QueryPlanner {
    /// Create a planner from a step table and aggregate rules
    pub fn new(steps: StepTable, aggregates: AggregateRuleSet) -> Self {
        Self { steps, aggregates }
    }

    /// Resolve the query window for a request's time bounds
    pub fn window(&self, start: UnixSeconds, end: UnixSeconds) -> Result<QueryWindow> {
        let step = self.steps.resolve(end - start);
        QueryWindow::new(start, end, step)
    }

    /// Partition metrics into batches by resolved aggregate function
    ///
    /// The result has one entry per distinct function actually used by the
    /// requested metrics, not one per configured rule.
    pub fn plan(&self, metrics: &[String]) -> Result<MetricBatch> {
        let mut batch = MetricBatch::default();

        for metric in metrics {
            let function = self.aggregates.resolve(metric)?;
            batch.push(function, metric.clone());
        }

        Ok(batch)
    }
}
