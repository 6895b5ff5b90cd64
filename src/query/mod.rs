//! Query planning and construction
//!
//! Turns a request (metric names, start, end) into the minimal set of
//! backend queries:
//!
//! ```text
//! metric names ──▶ AggregateRuleSet ──▶ MetricBatch (one entry per function)
//!                                              │
//! start/end ─────▶ StepTable ──▶ QueryWindow   │
//!                                       └──────┴──▶ query text per batch
//! ```

pub mod aggregate;
pub mod builder;
pub mod planner;
pub mod step;

pub use aggregate::AggregateRuleSet;
pub use planner::{MetricBatch, QueryPlanner};
pub use step::{StepRule, StepTable};
