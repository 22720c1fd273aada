//! TOML configuration shared by the `moed` engines.
//!
//! Every section and field is optional; missing values take the engine
//! defaults. [`MoedConfig::load`] and [`MoedConfig::from_toml_str`] validate
//! the result before returning it.
//!
//! ```toml
//! [observer]
//! latitude_deg = 31.7683
//! longitude_deg = 35.2137
//!
//! [tetrad]
//! min_gap_days = 150.0
//! max_gap_days = 210.0
//!
//! [stats]
//! bootstrap_seed = 42
//!
//! [matching]
//! window_days = 7.0
//! [matching.weights]
//! temporal = 0.2
//! ```

pub mod error;

use std::path::Path;

use moed_eclipse::TetradConfig;
use moed_events::GeoPoint;
use moed_match::ScoringConfig;
use moed_stats::StatsConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::ConfigError;

/// Observer position for eclipse visibility. Defaults to Jerusalem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            latitude_deg: 31.7683,
            longitude_deg: 35.2137,
        }
    }
}

impl ObserverConfig {
    pub fn location(&self) -> Result<GeoPoint, ConfigError> {
        GeoPoint::new(self.latitude_deg, self.longitude_deg)
            .map_err(|e| ConfigError::Invalid(format!("observer: {e}")))
    }
}

/// Complete configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MoedConfig {
    pub observer: ObserverConfig,
    pub tetrad: TetradConfig,
    pub stats: StatsConfig,
    pub matching: ScoringConfig,
}

impl MoedConfig {
    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.observer.location()?;
        self.tetrad
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("tetrad: {e}")))?;
        self.stats
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("stats: {e}")))?;
        self.matching
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("matching: {e}")))?;
        Ok(())
    }
}
