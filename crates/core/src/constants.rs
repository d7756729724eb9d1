//! Physical and empirical constants
//!
//! Default values follow the United States offshore wind energy atlas
//! methodology.
//!
//! # References
//! - von Krauland, A.-K. et al. (2023). "United States offshore wind energy
//!   atlas: availability, potential, and economic insights based on wind speeds
//!   at different altitudes and thresholds and policy-informed exclusions"
//!   Energy Conversion and Management: X, 20, 100410
//! - Ginsberg, M. (2019). "Harness It: Renewable Energy Technologies and
//!   Project Development Models Transforming the Grid"

use serde::{Deserialize, Serialize};

use crate::error::{require_fraction, require_positive, Result};

/// Energy pattern factor for a Rayleigh (Weibull k=2) wind-speed distribution
pub const DEFAULT_ENERGY_PATTERN_FACTOR: f64 = 1.91;

/// Lumped derating factor (availability, electrical and wake losses)
pub const DEFAULT_EFFICIENCY: f64 = 0.20;

/// Hours in a non-leap year
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Offshore center-to-center spacing in rotor diameters
pub const DEFAULT_SPACING_FACTOR: f64 = 5.98;

/// Air density at 200 m (kg/m³)
pub const DEFAULT_AIR_DENSITY: f64 = 0.990;

/// Air density at sea level, ISA (kg/m³)
pub const SEA_LEVEL_AIR_DENSITY: f64 = 1.225;

/// Constants shared by every calculation.
///
/// Constructed once and passed in explicitly. Per-call overrides go through
/// [`crate::TurbineSpec`] or the `with_*` builders, which return a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Energy pattern factor (EPF), > 0
    pub energy_pattern_factor: f64,
    /// Derating efficiency η in [0, 1]
    pub efficiency: f64,
    /// Hours per year used for AEP
    pub hours_per_year: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            energy_pattern_factor: DEFAULT_ENERGY_PATTERN_FACTOR,
            efficiency: DEFAULT_EFFICIENCY,
            hours_per_year: HOURS_PER_YEAR,
        }
    }
}

impl PhysicalConstants {
    /// Copy with a different energy pattern factor
    pub fn with_energy_pattern_factor(self, energy_pattern_factor: f64) -> Self {
        Self {
            energy_pattern_factor,
            ..self
        }
    }

    /// Copy with a different derating efficiency
    pub fn with_efficiency(self, efficiency: f64) -> Self {
        Self { efficiency, ..self }
    }

    /// Check every field against its physical range.
    ///
    /// # Errors
    /// `InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        require_positive("energy_pattern_factor", self.energy_pattern_factor)?;
        require_fraction("efficiency", self.efficiency)?;
        require_positive("hours_per_year", self.hours_per_year)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_literature() {
        let c = PhysicalConstants::default();
        assert_eq!(c.energy_pattern_factor, 1.91);
        assert_eq!(c.efficiency, 0.20);
        assert_eq!(c.hours_per_year, 8760.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builders_do_not_touch_original() {
        let base = PhysicalConstants::default();
        let tuned = base.with_efficiency(0.35).with_energy_pattern_factor(2.0);
        assert_eq!(base.efficiency, DEFAULT_EFFICIENCY);
        assert_eq!(tuned.efficiency, 0.35);
        assert_eq!(tuned.energy_pattern_factor, 2.0);
    }

    #[test]
    fn test_validate_names_field() {
        let err = PhysicalConstants::default()
            .with_efficiency(1.5)
            .validate()
            .unwrap_err();
        assert_eq!(err.field(), Some("efficiency"));

        let err = PhysicalConstants::default()
            .with_energy_pattern_factor(0.0)
            .validate()
            .unwrap_err();
        assert_eq!(err.field(), Some("energy_pattern_factor"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c: PhysicalConstants = serde_json::from_str(r#"{ "efficiency": 0.4 }"#).unwrap();
        assert_eq!(c.efficiency, 0.4);
        assert_eq!(c.energy_pattern_factor, DEFAULT_ENERGY_PATTERN_FACTOR);
        assert_eq!(c.hours_per_year, HOURS_PER_YEAR);
    }
}
