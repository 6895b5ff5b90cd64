//! Configuration management for the bridge
//!
//! This module provides configuration file support with TOML format,
//! environment variable overrides, and sensible defaults. The step table and
//! aggregate rules are ordered lists; their order is significant (see
//! [`crate::query::step`] and [`crate::query::aggregate`]).

use crate::query::step::StepRule;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Ordered step rules mapping elapsed span to sampling interval
    ///
    /// Thresholds must be authored in ascending order; `validate` rejects
    /// tables that are not.
    #[serde(default)]
    pub steps: Vec<StepRule>,

    /// Ordered pattern rules mapping metric names to aggregate functions
    #[serde(default)]
    pub aggregates: Vec<AggregateRuleConfig>,

    /// Aggregate function used when no pattern matches
    #[serde(default = "default_aggregate")]
    pub default_aggregate: String,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend host name
    #[serde(default = "default_host")]
    pub host: String,

    /// Backend port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use https for backend requests
    #[serde(default)]
    pub ssl: bool,

    /// Backend user
    #[serde(default = "default_credential")]
    pub user: String,

    /// Backend password
    #[serde(default = "default_credential")]
    pub password: String,

    /// Database holding the metric series
    #[serde(default = "default_database")]
    pub database: String,
}

/// One pattern-to-aggregate-function rule
///
/// The pattern is a regular expression searched anywhere within the metric
/// name. Rules are tried in configured order and the first match wins.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregateRuleConfig {
    /// Regular expression searched against the metric name
    pub pattern: String,

    /// Aggregate function applied to matching metrics
    pub function: String,
}

// Default value functions
fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    8086
}
fn default_credential() -> String {
    "root".to_string()
}
fn default_database() -> String {
    "graphite".to_string()
}
fn default_aggregate() -> String {
    "mean".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            steps: Vec::new(),
            aggregates: Vec::new(),
            default_aggregate: default_aggregate(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ssl: false,
            user: default_credential(),
            password: default_credential(),
            database: default_database(),
        }
    }
}

impl BackendConfig {
    /// Base URL for backend requests, derived from scheme, host and port
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;

        toml::from_str(&contents).map_err(|e| {
            crate::Error::Configuration(format!("Failed to parse config file {}: {}", path, e))
        })
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env(path: &str) -> crate::Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from environment variables only
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FLUXBRIDGE_HOST") {
            self.backend.host = host;
        }
        if let Ok(port) = std::env::var("FLUXBRIDGE_PORT") {
            if let Ok(p) = port.parse() {
                self.backend.port = p;
            }
        }
        if let Ok(database) = std::env::var("FLUXBRIDGE_DATABASE") {
            self.backend.database = database;
        }
        if let Ok(user) = std::env::var("FLUXBRIDGE_USER") {
            self.backend.user = user;
        }
        if let Ok(password) = std::env::var("FLUXBRIDGE_PASSWORD") {
            self.backend.password = password;
        }
    }

    /// Validate configuration
    ///
    /// The step resolution scan stops at the first rule whose threshold
    /// exceeds the span, so a table with descending thresholds would silently
    /// skip rules. Such tables are rejected here instead.
    pub fn validate(&self) -> crate::Result<()> {
        if self.backend.host.is_empty() {
            return Err(crate::Error::Configuration(
                "Backend host cannot be empty".to_string(),
            ));
        }
        if self.backend.port == 0 {
            return Err(crate::Error::Configuration(
                "Backend port cannot be 0".to_string(),
            ));
        }

        let mut previous_threshold = 0;
        for rule in &self.steps {
            if rule.step_secs == 0 {
                return Err(crate::Error::Configuration(format!(
                    "Step size must be > 0 (threshold {})",
                    rule.threshold_secs
                )));
            }
            if rule.threshold_secs < previous_threshold {
                return Err(crate::Error::Configuration(format!(
                    "Step thresholds must be ascending: {} follows {}",
                    rule.threshold_secs, previous_threshold
                )));
            }
            previous_threshold = rule.threshold_secs;
        }

        for rule in &self.aggregates {
            if rule.function.is_empty() {
                return Err(crate::Error::Configuration(format!(
                    "Aggregate rule '{}' has an empty function",
                    rule.pattern
                )));
            }
        }
        if self.default_aggregate.is_empty() {
            return Err(crate::Error::Configuration(
                "Default aggregate function cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
