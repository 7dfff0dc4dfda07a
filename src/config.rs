//! Synchronizer configuration.
//!
//! Read from a YAML document; every field is optional.
//!
//! ```yaml
//! poll-interval-ms: 25
//! header-fraction: 0.0588
//! auto-scroll: true
//! omit-first-endings: false
//! prefer-localized-titles: true
//! page-aspect: 1.4142
//! page-gap: 1.0
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coords::DEFAULT_HEADER_FRACTION;
use crate::error::SyncError;
use crate::layout::DEFAULT_PAGE_ASPECT;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 35;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SyncConfig {
    /// Player polling period while tracking.
    pub poll_interval_ms: u64,
    /// Share of the viewport width kept above a block when scrolling to it.
    pub header_fraction: f64,
    /// Initial auto-scroll toggle of a new session.
    pub auto_scroll: bool,
    /// Initial first-ending numbering mode of a new session.
    pub omit_first_endings: bool,
    pub prefer_localized_titles: bool,
    /// Page height divided by page width for rendered score pages.
    pub page_aspect: f64,
    pub page_gap: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            header_fraction: DEFAULT_HEADER_FRACTION,
            auto_scroll: true,
            omit_first_endings: false,
            prefer_localized_titles: true,
            page_aspect: DEFAULT_PAGE_ASPECT,
            page_gap: 1.0,
        }
    }
}

impl SyncConfig {
    /// Parse and validate a YAML configuration document.
    pub fn from_yaml(source: &str) -> Result<Self, SyncError> {
        let config: SyncConfig =
            serde_yaml::from_str(source).map_err(|e| SyncError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            SyncError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&source)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if !(1..=1000).contains(&self.poll_interval_ms) {
            return Err(SyncError::ConfigError(format!(
                "poll-interval-ms must be between 1 and 1000, got {}",
                self.poll_interval_ms
            )));
        }
        if !(0.0..1.0).contains(&self.header_fraction) {
            return Err(SyncError::ConfigError(format!(
                "header-fraction must be in [0, 1), got {}",
                self.header_fraction
            )));
        }
        if !(self.page_aspect.is_finite() && self.page_aspect > 0.0) {
            return Err(SyncError::ConfigError(format!(
                "page-aspect must be positive, got {}",
                self.page_aspect
            )));
        }
        if !(self.page_gap.is_finite() && self.page_gap >= 0.0) {
            return Err(SyncError::ConfigError(format!(
                "page-gap must not be negative, got {}",
                self.page_gap
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
