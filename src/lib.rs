//! fluxbridge - Graphite-style metrics query bridge for InfluxDB
//!
//! This library translates requests for named metrics over a time range into
//! a minimal set of InfluxDB aggregation queries and normalizes the backend's
//! version-dependent responses into a single uniform result:
//! - Sampling interval resolution from a configured threshold table
//! - Pattern-based aggregate function selection per metric
//! - Batching of metrics that share an aggregate function
//! - Version-gated parsing of the measurement listing
//!
//! The backend is reached through the [`backend::TimeSeriesClient`] and
//! [`backend::HealthProbe`] traits, so the engine can be driven against the
//! bundled HTTP client or an in-memory stub.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod query;
pub mod types;

// Re-export main types
pub use config::Config;
pub use engine::{EngineBuilder, QueryEngine};
pub use error::{Error, Result};
pub use types::{QueryResult, QueryWindow};
