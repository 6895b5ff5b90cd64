//! Backend version detection
//!
//! The backend's standard query interface has no reliable way to expose its
//! version, so the engine reads it from the health endpoint through the
//! [`HealthProbe`](super::HealthProbe) collaborator and caches the answer
//! for its lifetime. A failed probe is not cached; the next call retries.

use crate::backend::HealthProbe;
use crate::error::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Ordered backend protocol version
///
/// Wraps a semantic version with a lenient parser, since servers report
/// strings like `0.11`, `v1.8.3` or `0.13.0-beta1` that are not all strict
/// semver.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BackendVersion(semver::Version);

impl BackendVersion {
    /// Construct a version from its numeric components
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse a reported version string
    ///
    /// Strips a leading `v` and pads missing components (`0.11` parses as
    /// `0.11.0`). Pre-release suffixes are kept, so `0.13.0-beta1` orders
    /// before `0.13.0` and after `0.11.0`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_start_matches('v');

        if let Ok(version) = semver::Version::parse(trimmed) {
            return Ok(Self(version));
        }

        // Pad the numeric core to three components, keeping any
        // pre-release or build suffix in place.
        let (core, suffix) = match trimmed.find(['-', '+']) {
            Some(at) => trimmed.split_at(at),
            None => (trimmed, ""),
        };
        let missing = 3usize.saturating_sub(core.split('.').count());
        let padded = format!("{}{}{}", core, ".0".repeat(missing), suffix);

        semver::Version::parse(&padded).map(Self).map_err(|e| {
            Error::BackendProtocol(format!("Unparseable backend version '{}': {}", raw, e))
        })
    }
}

impl fmt::Display for BackendVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Detects the backend version once and caches it
///
/// The cell is populated by whichever caller first succeeds; concurrent
/// first use resolves to a single probe result. The cached value is kept
/// even if the backend is later upgraded; refreshing is out of scope.
pub struct VersionDetector {
    probe: Arc<dyn HealthProbe>,
    cached: OnceCell<BackendVersion>,
}

impl VersionDetector {
    /// Create a detector over a health probe
    pub fn new(probe: Arc<dyn HealthProbe>) -> Self {
        Self {
            probe,
            cached: OnceCell::new(),
        }
    }

    /// The backend version, probing on first use
    pub async fn version(&self) -> Result<&BackendVersion> {
        self.cached
            .get_or_try_init(|| async {
                let raw = self.probe.version_string().await?;
                let version = BackendVersion::parse(&raw)?;
                debug!(version = %version, "detected backend version");
                Ok(version)
            })
            .await
    }
}

impl fmt::Debug for VersionDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionDetector")
            .field("cached", &self.cached.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strict_semver() {
        let version = BackendVersion::parse("0.11.0").unwrap();
        assert_eq!(version, BackendVersion::new(0, 11, 0));
    }

    #[test]
    fn test_parse_pads_missing_components() {
        assert_eq!(
            BackendVersion::parse("0.11").unwrap(),
            BackendVersion::new(0, 11, 0)
        );
        assert_eq!(
            BackendVersion::parse("1").unwrap(),
            BackendVersion::new(1, 0, 0)
        );
    }

    #[test]
    fn test_parse_strips_leading_v() {
        assert_eq!(
            BackendVersion::parse("v1.8.3").unwrap(),
            BackendVersion::new(1, 8, 3)
        );
    }

    #[test]
    fn test_prerelease_ordering() {
        let boundary = BackendVersion::new(0, 11, 0);
        let beta = BackendVersion::parse("0.13.0-beta1").unwrap();
        assert!(beta > boundary);
        assert!(beta < BackendVersion::new(0, 13, 0));
    }

    #[test]
    fn test_ordering_against_boundary() {
        let boundary = BackendVersion::new(0, 11, 0);
        assert!(BackendVersion::parse("0.10.3").unwrap() < boundary);
        assert!(BackendVersion::parse("0.11").unwrap() >= boundary);
        assert!(BackendVersion::parse("1.8").unwrap() > boundary);
    }

    #[test]
    fn test_garbage_version_is_protocol_error() {
        let err = BackendVersion::parse("not a version").unwrap_err();
        assert!(matches!(err, Error::BackendProtocol(_)));
    }
}
