//! Response normalization
//!
//! Turns raw backend responses into the uniform shapes the caller sees.
//! Two concerns live here:
//!
//! - the measurement listing, whose shape changed across a backend version
//!   boundary and is parsed by the branch matching the detected version
//! - merging per-batch query responses into one [`QueryResult`]

use crate::backend::version::BackendVersion;
use crate::backend::{QueryResponse, RawListing};
use crate::error::{Error, Result};
use crate::types::{QueryResult, QueryWindow};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Column holding the aggregated sample in query responses
const VALUE_COLUMN: &str = "value";

/// Shape of the measurement listing response
///
/// InfluxDB changed the `SHOW MEASUREMENTS` result shape in the 0.11
/// release: older servers return one series entry per measurement with its
/// name in a `name` field, newer servers return a single series whose value
/// rows carry the names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    /// One series entry per measurement, name in the `name` field
    PerSeriesName,

    /// Single series entry, names flattened into its value rows
    FlattenedValues,
}

impl ListingFormat {
    /// Select the parsing branch for a detected backend version
    pub fn for_version(version: &BackendVersion) -> Self {
        if *version >= BackendVersion::new(0, 11, 0) {
            ListingFormat::FlattenedValues
        } else {
            ListingFormat::PerSeriesName
        }
    }
}

/// Extract measurement names from a raw listing
///
/// A listing with no series section is an empty backend, not an error.
pub fn series_names(listing: &RawListing, format: ListingFormat) -> Result<Vec<String>> {
    let series = match &listing.series {
        Some(series) => series,
        None => return Ok(Vec::new()),
    };

    match format {
        ListingFormat::FlattenedValues => {
            let Some(first) = series.first() else {
                return Ok(Vec::new());
            };
            first
                .values
                .iter()
                .map(|row| match row.first() {
                    Some(Value::String(name)) => Ok(name.clone()),
                    other => Err(Error::BackendProtocol(format!(
                        "Measurement listing row holds {:?} where a name was expected",
                        other
                    ))),
                })
                .collect()
        }
        ListingFormat::PerSeriesName => series
            .iter()
            .map(|entry| {
                entry.name.clone().ok_or_else(|| {
                    Error::BackendProtocol(
                        "Measurement listing entry carries no name field".to_string(),
                    )
                })
            })
            .collect(),
    }
}

/// Merge per-batch query responses into one result
///
/// Every series from every response lands in the result keyed by its name,
/// samples in row order, null buckets preserved as `None`. Batches
/// partition metrics by aggregate function, so a series key should never
/// repeat across responses; if one does, the later batch wins and the
/// collision is logged.
pub fn merge(responses: &[QueryResponse], window: &QueryWindow) -> Result<QueryResult> {
    let mut series: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();

    for response in responses {
        for raw in &response.series {
            let name = raw.name.clone().ok_or_else(|| {
                Error::BackendProtocol("Query response series carries no name".to_string())
            })?;

            let value_index = raw
                .columns
                .iter()
                .position(|c| c == VALUE_COLUMN)
                .ok_or_else(|| {
                    Error::BackendProtocol(format!(
                        "Series '{}' has no '{}' column (columns: {:?})",
                        name, VALUE_COLUMN, raw.columns
                    ))
                })?;

            let samples = raw
                .values
                .iter()
                .map(|row| match row.get(value_index) {
                    None | Some(Value::Null) => Ok(None),
                    Some(value) => value.as_f64().map(Some).ok_or_else(|| {
                        Error::BackendProtocol(format!(
                            "Non-numeric sample {:?} in series '{}'",
                            value, name
                        ))
                    }),
                })
                .collect::<Result<Vec<_>>>()?;

            if series.insert(name.clone(), samples).is_some() {
                warn!(series = %name, "duplicate series key across query batches, keeping the later batch");
            }
        }
    }

    Ok(QueryResult {
        series,
        start: window.start,
        end: window.end,
        step_secs: window.step_secs,
    })
}
