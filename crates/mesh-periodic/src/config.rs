//! Serializable configuration for topology derivation and relaxation.
//!
//! # Example
//!
//! ```
//! use mesh_periodic::TopologyConfig;
//!
//! let config = TopologyConfig::from_toml(r#"
//!     cutoff_scale = 1.4
//!
//!     [quench]
//!     dt = 0.005
//!     max_steps = 200
//! "#).unwrap();
//!
//! assert_eq!(config.quench.max_steps, 200);
//! assert_eq!(config.first_shell.bins, 64);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{TopologyError, TopologyResult};
use crate::neighbors::NearestNeighborPeak;
use crate::relax::QuenchParams;
use crate::rings::DEFAULT_MAX_RING_SIZE;

/// First-shell estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstShellParams {
    /// Histogram bins for nearest-neighbor distances.
    pub bins: usize,

    /// Search radius in units of the mean interparticle spacing.
    pub search_scale: f64,
}

impl Default for FirstShellParams {
    fn default() -> Self {
        Self {
            bins: 64,
            search_scale: 2.0,
        }
    }
}

impl FirstShellParams {
    /// Estimator configured with these settings.
    pub fn estimator(&self) -> NearestNeighborPeak {
        NearestNeighborPeak::new(self.bins, self.search_scale)
    }
}

/// Parameters for the whole topology pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Bond cutoff as a multiple of the first-shell distance.
    pub cutoff_scale: f64,

    /// Largest ring size tallied in reports.
    pub max_ring_size: usize,

    pub first_shell: FirstShellParams,

    pub quench: QuenchParams,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            cutoff_scale: 1.33,
            max_ring_size: DEFAULT_MAX_RING_SIZE,
            first_shell: FirstShellParams::default(),
            quench: QuenchParams::default(),
        }
    }
}

impl TopologyConfig {
    /// Set the cutoff scale.
    pub fn with_cutoff_scale(mut self, scale: f64) -> Self {
        self.cutoff_scale = scale;
        self
    }

    /// Set the relaxation parameters.
    pub fn with_quench(mut self, quench: QuenchParams) -> Self {
        self.quench = quench;
        self
    }

    /// Check ranges that the pipeline relies on.
    pub fn validate(&self) -> TopologyResult<()> {
        if !(self.cutoff_scale > 0.0 && self.cutoff_scale.is_finite()) {
            return Err(TopologyError::Config {
                details: format!("cutoff_scale must be positive, got {}", self.cutoff_scale),
            });
        }
        if self.max_ring_size < 3 {
            return Err(TopologyError::Config {
                details: format!("max_ring_size must be at least 3, got {}", self.max_ring_size),
            });
        }
        if self.first_shell.bins == 0 {
            return Err(TopologyError::Config {
                details: "first_shell.bins must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Parse from TOML.
    pub fn from_toml(s: &str) -> TopologyResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| TopologyError::Config {
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> TopologyResult<String> {
        toml::to_string_pretty(self).map_err(|e| TopologyError::Config {
            details: e.to_string(),
        })
    }

    /// Parse from JSON.
    pub fn from_json(s: &str) -> TopologyResult<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| TopologyError::Config {
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> TopologyResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TopologyError::Config {
            details: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TopologyConfig::default();
        assert_eq!(config.cutoff_scale, 1.33);
        assert_eq!(config.max_ring_size, 6);
        assert_eq!(config.quench.max_steps, 100);
        assert_eq!(config.quench.energy_tolerance, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TopologyConfig::from_toml("[quench]\ndt = 0.02\n").unwrap();
        assert_eq!(config.quench.dt, 0.02);
        assert_eq!(config.quench.max_steps, 100);
        assert_eq!(config.cutoff_scale, 1.33);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = TopologyConfig::default()
            .with_cutoff_scale(1.25)
            .with_quench(QuenchParams::default().with_energy_tolerance(1e-8));
        let text = config.to_toml().unwrap();
        assert_eq!(TopologyConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_json_parse() {
        let config = TopologyConfig::from_json(r#"{"first_shell": {"bins": 32}}"#).unwrap();
        assert_eq!(config.first_shell.bins, 32);
        assert_eq!(config.first_shell.search_scale, 2.0);
        assert!(config.to_json().unwrap().contains("\"cutoff_scale\""));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            TopologyConfig::from_toml("cutoff_scale = -1.0"),
            Err(TopologyError::Config { .. })
        ));
        assert!(matches!(
            TopologyConfig::from_json("{\"max_ring_size\": 2}"),
            Err(TopologyError::Config { .. })
        ));
        assert!(matches!(
            TopologyConfig::from_toml("cutoff_scale = \"wide\""),
            Err(TopologyError::Config { .. })
        ));
    }
}
