//! Engine builder with injected collaborators
//!
//! The backend client and health probe are explicit dependencies of the
//! engine, so tests can substitute in-memory implementations. When neither
//! is provided, a [`HttpBackend`] built from the configuration serves as
//! both.

use crate::backend::version::VersionDetector;
use crate::backend::{HealthProbe, HttpBackend, TimeSeriesClient};
use crate::config::Config;
use crate::engine::QueryEngine;
use crate::error::Result;
use crate::query::aggregate::AggregateRuleSet;
use crate::query::planner::QueryPlanner;
use crate::query::step::StepTable;
use std::sync::Arc;
use tracing::info;

/// Builder for configuring a [`QueryEngine`]
pub struct EngineBuilder {
    client: Option<Arc<dyn TimeSeriesClient>>,
    probe: Option<Arc<dyn HealthProbe>>,
    config: Config,
}

impl EngineBuilder {
    /// Create a new engine builder with default configuration
    pub fn new() -> Self {
        Self {
            client: None,
            probe: None,
            config: Config::default(),
        }
    }

    /// Set the engine configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set a custom backend client implementation
    pub fn with_client<C>(mut self, client: C) -> Self
    where
        C: TimeSeriesClient + 'static,
    {
        self.client = Some(Arc::new(client));
        self
    }

    /// Set a custom backend client from an existing Arc
    ///
    /// Use this when the same instance also serves as the health probe.
    pub fn with_client_arc(mut self, client: Arc<dyn TimeSeriesClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set a custom health probe implementation
    pub fn with_probe<P>(mut self, probe: P) -> Self
    where
        P: HealthProbe + 'static,
    {
        self.probe = Some(Arc::new(probe));
        self
    }

    /// Set a custom health probe from an existing Arc
    pub fn with_probe_arc(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Build the engine
    ///
    /// Validates the configuration and falls back to a [`HttpBackend`] for
    /// any collaborator not injected.
    pub fn build(self) -> Result<QueryEngine> {
        self.config.validate()?;

        let (client, probe) = match (self.client, self.probe) {
            (Some(client), Some(probe)) => (client, probe),
            (client, probe) => {
                let http = Arc::new(HttpBackend::new(&self.config.backend)?);
                let fallback_client: Arc<dyn TimeSeriesClient> = http.clone();
                let fallback_probe: Arc<dyn HealthProbe> = http;
                (
                    client.unwrap_or(fallback_client),
                    probe.unwrap_or(fallback_probe),
                )
            }
        };

        let planner = QueryPlanner::new(
            StepTable::new(self.config.steps.clone()),
            AggregateRuleSet::new(
                self.config.aggregates.clone(),
                self.config.default_aggregate.clone(),
            ),
        );

        info!(
            steps = self.config.steps.len(),
            aggregate_rules = self.config.aggregates.len(),
            "query engine built"
        );

        Ok(QueryEngine::from_parts(
            client,
            planner,
            VersionDetector::new(probe),
        ))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::step::StepRule;

    #[test]
    fn test_builder_defaults() {
        let builder = EngineBuilder::new();
        assert!(builder.client.is_none());
        assert!(builder.probe.is_none());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = Config::default();
        config.steps = vec![StepRule::new(86400, 300), StepRule::new(3600, 60)];

        let result = EngineBuilder::new().with_config(config).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_with_default_backend() {
        // Without injected collaborators the HTTP backend fills both roles
        let engine = EngineBuilder::new().build();
        assert!(engine.is_ok());
    }
}
