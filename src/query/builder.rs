//! Query text construction
//!
//! Renders one InfluxQL aggregation query per batch. The window bounds are
//! start-exclusive and end-inclusive so a sample landing exactly on a
//! boundary shared by two adjacent windows is counted once.
//!
//! Metric names and the function name are interpolated as-is apart from
//! quoting; callers are responsible for pre-validating metric name
//! character sets before they reach the engine.

use crate::types::QueryWindow;

/// Build the aggregation query for one batch of metrics
///
/// Produces text of the form:
///
/// ```text
/// SELECT max(value) AS value FROM "cpu.a" WHERE time > 100s AND time <= 200s GROUP BY time(60s)
/// ```
///
/// Metric names are quoted individually and comma-joined.
pub fn aggregate_query(metrics: &[String], window: &QueryWindow, function: &str) -> String {
    let series_list = metrics
        .iter()
        .map(|m| format!("\"{}\"", m))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT {}(value) AS value FROM {} WHERE time > {}s AND time <= {}s GROUP BY time({}s)",
        function, series_list, window.start, window.end, window.step_secs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: i64, end: i64, step: u64) -> QueryWindow {
        QueryWindow::new(start, end, step).unwrap()
    }

    #[test]
    fn test_single_metric_query_text() {
        let text = aggregate_query(&["cpu.a".to_string()], &window(100, 200, 60), "max");
        assert_eq!(
            text,
            "SELECT max(value) AS value FROM \"cpu.a\" WHERE time > 100s AND time <= 200s GROUP BY time(60s)"
        );
    }

    #[test]
    fn test_multiple_metrics_are_quoted_and_joined() {
        let text = aggregate_query(
            &["cpu.a".to_string(), "cpu.b".to_string()],
            &window(0, 3600, 10),
            "mean",
        );
        assert_eq!(
            text,
            "SELECT mean(value) AS value FROM \"cpu.a\", \"cpu.b\" WHERE time > 0s AND time <= 3600s GROUP BY time(10s)"
        );
    }
}
