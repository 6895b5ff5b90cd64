//! Sampling interval resolution
//!
//! Maps the elapsed span of a request to a sampling interval using an
//! ordered threshold table. Wide spans get coarse intervals so result sizes
//! stay bounded regardless of the window requested.

use serde::{Deserialize, Serialize};

/// Interval used when no step rules are configured, in seconds
pub const DEFAULT_MIN_STEP_SECS: u64 = 10;

/// One span-threshold-to-interval rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRule {
    /// Minimum elapsed span, in seconds, for this rule to apply
    pub threshold_secs: u64,

    /// Sampling interval adopted when the span reaches the threshold
    pub step_secs: u64,
}

impl StepRule {
    /// Create a new step rule
    pub fn new(threshold_secs: u64, step_secs: u64) -> Self {
        Self {
            threshold_secs,
            step_secs,
        }
    }
}

/// Ordered lookup from elapsed span to sampling interval
///
/// Rules must be authored with ascending thresholds. The scan adopts each
/// rule whose threshold the span reaches and stops at the first rule it does
/// not, so with an ascending table the result is the last qualifying rule.
/// An out-of-order table is not reordered here; rules after the first
/// non-qualifying one are never considered. `Config::validate` rejects such
/// tables at the configuration boundary.
#[derive(Debug, Clone)]
pub struct StepTable {
    rules: Vec<StepRule>,
    minimum_step: u64,
}

impl StepTable {
    /// Build a table from ordered rules
    ///
    /// The minimum interval is the first rule's step, or
    /// [`DEFAULT_MIN_STEP_SECS`] when no rules are configured.
    pub fn new(rules: Vec<StepRule>) -> Self {
        let minimum_step = rules
            .first()
            .map(|r| r.step_secs)
            .unwrap_or(DEFAULT_MIN_STEP_SECS);
        Self {
            rules,
            minimum_step,
        }
    }

    /// Smallest interval this table can produce
    pub fn minimum_step(&self) -> u64 {
        self.minimum_step
    }

    /// Resolve the sampling interval for an elapsed span
    ///
    /// Non-positive spans resolve to the minimum interval since no rule with
    /// a positive threshold can qualify.
    pub fn resolve(&self, span_secs: i64) -> u64 {
        let mut step = self.minimum_step;

        for rule in &self.rules {
            if span_secs >= rule.threshold_secs as i64 {
                step = rule.step_secs;
            } else {
                break;
            }
        }

        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour_day_table() -> StepTable {
        StepTable::new(vec![StepRule::new(3600, 60), StepRule::new(86400, 300)])
    }

    #[test]
    fn test_resolve_picks_last_qualifying_rule() {
        let table = hour_day_table();
        assert_eq!(table.resolve(7200), 60);
        assert_eq!(table.resolve(90000), 300);
    }

    #[test]
    fn test_resolve_below_all_thresholds_uses_minimum() {
        let table = hour_day_table();
        // First rule's step is the minimum, not DEFAULT_MIN_STEP_SECS
        assert_eq!(table.resolve(10), 60);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let table = hour_day_table();
        assert_eq!(table.resolve(3600), 60);
        assert_eq!(table.resolve(86400), 300);
        assert_eq!(table.resolve(86399), 60);
    }

    #[test]
    fn test_empty_table_uses_default() {
        let table = StepTable::new(Vec::new());
        assert_eq!(table.minimum_step(), DEFAULT_MIN_STEP_SECS);
        assert_eq!(table.resolve(1_000_000), DEFAULT_MIN_STEP_SECS);
    }

    #[test]
    fn test_non_positive_span() {
        let table = hour_day_table();
        assert_eq!(table.resolve(0), 60);
        assert_eq!(table.resolve(-500), 60);
    }

    #[test]
    fn test_out_of_order_table_short_circuits() {
        // The scan stops at the first non-qualifying threshold, so the
        // 60-second rule hiding behind the day threshold is never reached.
        // This documents the behavior on a misordered table rather than
        // pretending a sorted scan happens.
        let table = StepTable::new(vec![StepRule::new(86400, 300), StepRule::new(3600, 60)]);
        assert_eq!(table.resolve(7200), 300);

        // A span past every threshold still walks the full table
        assert_eq!(table.resolve(90000), 60);
    }
}
