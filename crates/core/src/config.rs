//! Estimator configuration
//!
//! Bundles the injectable static data: physical constants, default spacing
//! factor, packing layout and condition table. Every field has a literature
//! default, so a JSON file only needs to name what it changes:
//!
//! ```json
//! {
//!   "constants": { "efficiency": 0.35 },
//!   "spacing_factor": 7.0,
//!   "layout": "hexagonal",
//!   "conditions": [
//!     { "diameter": 120.0, "air_density": 1.05, "mean_wind_speed": 8.9 },
//!     { "diameter": 220.0, "air_density": 0.99, "mean_wind_speed": 9.6 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::constants::{PhysicalConstants, DEFAULT_SPACING_FACTOR};
use crate::error::{require_positive, EstimateError, Result};
use crate::lookup::ConditionTable;
use crate::site::LayoutKind;

/// Static configuration loaded once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub constants: PhysicalConstants,
    /// Default spacing in rotor diameters
    pub spacing_factor: f64,
    pub layout: LayoutKind,
    pub conditions: ConditionTable,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            constants: PhysicalConstants::default(),
            spacing_factor: DEFAULT_SPACING_FACTOR,
            layout: LayoutKind::default(),
            conditions: ConditionTable::default(),
        }
    }
}

impl EstimatorConfig {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    /// `ConfigIo` if the file cannot be read, `ConfigParse` if it is not valid
    /// JSON, or `InvalidInput` / `OutOfDomain` if a value is out of range.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| EstimateError::ConfigIo(format!("{}: {e}", path.display())))?;

        let config = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            entries = config.conditions.entries().len(),
            layout = ?config.layout,
            "loaded estimator configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    ///
    /// # Errors
    /// Same as [`load`](Self::load), minus I/O.
    pub fn from_json_str(json: &str) -> Result<Self> {
        // Table errors surface through serde as text, so map them back here.
        let config: Self = serde_json::from_str(json).map_err(|e| {
            let msg = e.to_string();
            match msg.strip_prefix("condition data out of domain: ") {
                Some(detail) => EstimateError::OutOfDomain(detail.to_string()),
                None => EstimateError::ConfigParse(msg),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// `ConfigParse` if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| EstimateError::ConfigParse(e.to_string()))
    }

    /// Check constants and spacing factor. The condition table validates itself.
    ///
    /// # Errors
    /// `InvalidInput` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        self.constants.validate()?;
        require_positive("spacing_factor", self.spacing_factor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::ConditionLookup;

    #[test]
    fn test_empty_object_is_default() {
        let config = EstimatorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EstimatorConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EstimatorConfig::from_json_str(
            r#"{ "constants": { "efficiency": 0.35 }, "layout": "hexagonal" }"#,
        )
        .unwrap();
        assert_eq!(config.constants.efficiency, 0.35);
        assert_eq!(config.constants.energy_pattern_factor, 1.91);
        assert_eq!(config.layout, LayoutKind::Hexagonal);
        assert_eq!(config.spacing_factor, DEFAULT_SPACING_FACTOR);
    }

    #[test]
    fn test_custom_conditions() {
        let config = EstimatorConfig::from_json_str(
            r#"{ "conditions": [
                { "diameter": 120.0, "air_density": 1.05, "mean_wind_speed": 8.9 },
                { "diameter": 220.0, "air_density": 0.99, "mean_wind_speed": 9.6 }
            ] }"#,
        )
        .unwrap();
        let c = config.conditions.resolve(170.0).unwrap();
        assert!((*c.mean_wind_speed - 9.25).abs() < 1e-12);
    }

    #[test]
    fn test_empty_conditions_is_out_of_domain() {
        let err = EstimatorConfig::from_json_str(r#"{ "conditions": [] }"#).unwrap_err();
        assert!(err.is_out_of_domain(), "{err}");
    }

    #[test]
    fn test_invalid_constants_rejected() {
        let err = EstimatorConfig::from_json_str(r#"{ "constants": { "efficiency": 1.5 } }"#)
            .unwrap_err();
        assert_eq!(err.field(), Some("efficiency"));

        let err = EstimatorConfig::from_json_str(r#"{ "spacing_factor": -2.0 }"#).unwrap_err();
        assert_eq!(err.field(), Some("spacing_factor"));
    }

    #[test]
    fn test_malformed_json() {
        let err = EstimatorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, EstimateError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EstimatorConfig::load("/nonexistent/estimator.json").unwrap_err();
        assert!(matches!(err, EstimateError::ConfigIo(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = EstimatorConfig::default().to_json_string().unwrap();
        let back = EstimatorConfig::from_json_str(&json).unwrap();
        assert_eq!(back, EstimatorConfig::default());
    }
}
