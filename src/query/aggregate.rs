//! Aggregate function selection
//!
//! Metric names are matched against an ordered list of regular expression
//! rules; the first rule whose pattern is found anywhere in the name decides
//! the aggregate function. Names matching no rule fall back to the
//! configured default function.

use crate::config::AggregateRuleConfig;
use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use regex::Regex;

/// One compiled pattern-to-function rule
#[derive(Debug)]
struct CompiledRule {
    pattern: Regex,
    function: String,
}

/// Ordered pattern rules with a configured fallback function
///
/// Patterns are compiled once, on first resolution, and the compiled set is
/// reused for the lifetime of the rule set. Configuration changes after
/// construction are not observed. Compilation happens inside a
/// computed-once cell, so concurrent first use builds the set exactly once.
#[derive(Debug)]
pub struct AggregateRuleSet {
    rules: Vec<AggregateRuleConfig>,
    default_function: String,
    compiled: OnceCell<Vec<CompiledRule>>,
}

impl AggregateRuleSet {
    /// Create a rule set from ordered configuration pairs
    pub fn new(rules: Vec<AggregateRuleConfig>, default_function: String) -> Self {
        Self {
            rules,
            default_function,
            compiled: OnceCell::new(),
        }
    }

    /// Function used when no pattern matches
    pub fn default_function(&self) -> &str {
        &self.default_function
    }

    /// Compile the configured patterns, once
    ///
    /// An invalid pattern fails every resolution with the same
    /// configuration error; nothing is partially cached.
    fn compiled(&self) -> Result<&[CompiledRule]> {
        let rules = self.compiled.get_or_try_init(|| {
            self.rules
                .iter()
                .map(|rule| {
                    Regex::new(&rule.pattern)
                        .map(|pattern| CompiledRule {
                            pattern,
                            function: rule.function.clone(),
                        })
                        .map_err(|e| {
                            Error::Configuration(format!(
                                "Invalid aggregate pattern '{}': {}",
                                rule.pattern, e
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(rules.as_slice())
    }

    /// Resolve the aggregate function for a metric name
    ///
    /// Rules are tried in configured order; the first pattern found anywhere
    /// within the name wins, even when a later rule is more specific.
    pub fn resolve(&self, metric: &str) -> Result<&str> {
        for rule in self.compiled()? {
            if rule.pattern.is_match(metric) {
                return Ok(&rule.function);
            }
        }

        Ok(&self.default_function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, function: &str) -> AggregateRuleConfig {
        AggregateRuleConfig {
            pattern: pattern.to_string(),
            function: function.to_string(),
        }
    }

    fn rule_set(rules: Vec<AggregateRuleConfig>) -> AggregateRuleSet {
        AggregateRuleSet::new(rules, "mean".to_string())
    }

    #[test]
    fn test_first_match_wins() {
        // The more specific second rule never fires for names the first
        // rule already matches.
        let rules = rule_set(vec![rule("^cpu", "max"), rule("^cpu\\.load", "mean")]);
        assert_eq!(rules.resolve("cpu.load.1").unwrap(), "max");
    }

    #[test]
    fn test_unmatched_metric_uses_default() {
        let rules = rule_set(Vec::new());
        assert_eq!(rules.resolve("anything").unwrap(), "mean");

        let rules = rule_set(vec![rule("^cpu", "max")]);
        assert_eq!(rules.resolve("mem.free").unwrap(), "mean");
    }

    #[test]
    fn test_configured_default_function() {
        let rules = AggregateRuleSet::new(Vec::new(), "median".to_string());
        assert_eq!(rules.resolve("anything").unwrap(), "median");
    }

    #[test]
    fn test_pattern_searches_anywhere() {
        // Patterns are searched, not anchored to the start of the name
        let rules = rule_set(vec![rule("load", "max")]);
        assert_eq!(rules.resolve("cpu.load.1").unwrap(), "max");
        assert_eq!(rules.resolve("loadavg").unwrap(), "max");
        assert_eq!(rules.resolve("cpu.idle").unwrap(), "mean");
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let rules = rule_set(vec![rule("(unclosed", "max")]);
        let err = rules.resolve("cpu.load").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        // The failure repeats on every use; nothing was cached
        assert!(rules.resolve("cpu.load").is_err());
    }
}
