//! Diameter-indexed atmospheric conditions
//!
//! The model assumes hub height equals rotor diameter, so the rotor diameter
//! doubles as the altitude key into a table of representative air density and
//! mean wind speed.
//!
//! Resolution policy:
//! - exact table diameter: the stored values, bit for bit
//! - between two entries: linear interpolation on diameter
//! - below the first / above the last entry: clamped to that boundary entry.
//!   The published values are never extrapolated.
//!
//! # References
//! von Krauland et al. (2023), offshore conditions at 100-250 m.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::constants::DEFAULT_AIR_DENSITY;
use crate::core_types::units::{KilogramsPerCubicMeter, MetersPerSecond};
use crate::error::{require_non_negative, require_positive, EstimateError, Result};

/// One row of the condition table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionEntry {
    /// Rotor diameter / hub height key (m)
    pub diameter: f64,
    /// Air density at that height (kg/m³)
    pub air_density: f64,
    /// Mean wind speed at that height (m/s)
    pub mean_wind_speed: f64,
}

impl ConditionEntry {
    pub const fn new(diameter: f64, air_density: f64, mean_wind_speed: f64) -> Self {
        Self {
            diameter,
            air_density,
            mean_wind_speed,
        }
    }

    fn conditions(&self) -> SiteConditions {
        SiteConditions {
            air_density: KilogramsPerCubicMeter::new(self.air_density),
            mean_wind_speed: MetersPerSecond::new(self.mean_wind_speed),
        }
    }
}

/// Air density and mean wind speed at hub height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteConditions {
    pub air_density: KilogramsPerCubicMeter,
    pub mean_wind_speed: MetersPerSecond,
}

/// Source of hub-height conditions for a rotor diameter.
///
/// Implementations must be pure: the same diameter always resolves to the same
/// conditions, and nothing is mutated during a lookup.
pub trait ConditionLookup: fmt::Debug + Send + Sync {
    /// Resolve conditions for `diameter` (m).
    ///
    /// # Errors
    /// `OutOfDomain` when the lookup has no data to answer from.
    fn resolve(&self, diameter: f64) -> Result<SiteConditions>;
}

/// Sorted, immutable condition table.
///
/// Invariants (checked on construction and deserialization):
/// - at least one entry
/// - diameters strictly increasing
/// - diameter > 0, air density > 0, mean wind speed >= 0, all finite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ConditionEntry>", into = "Vec<ConditionEntry>")]
pub struct ConditionTable {
    entries: Vec<ConditionEntry>,
}

impl ConditionTable {
    /// Build a table from entries sorted by ascending diameter.
    ///
    /// # Errors
    /// `OutOfDomain` if the table is empty, out of order, or holds a value
    /// outside its physical range.
    pub fn new(entries: Vec<ConditionEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(EstimateError::OutOfDomain(
                "condition table is empty".to_string(),
            ));
        }

        for (i, entry) in entries.iter().enumerate() {
            let checked = require_positive("diameter", entry.diameter)
                .and_then(|_| require_positive("air_density", entry.air_density))
                .and_then(|_| require_non_negative("mean_wind_speed", entry.mean_wind_speed));
            if let Err(err) = checked {
                return Err(EstimateError::OutOfDomain(format!("entry {i}: {err}")));
            }
        }

        if let Some(pair) = entries.windows(2).find(|w| w[1].diameter <= w[0].diameter) {
            return Err(EstimateError::OutOfDomain(format!(
                "diameters must be strictly increasing, found {} after {}",
                pair[1].diameter, pair[0].diameter
            )));
        }

        Ok(Self { entries })
    }

    /// Offshore conditions at 100, 150, 200 and 250 m.
    ///
    /// Source: von Krauland et al. (2023).
    pub fn von_krauland_2023() -> Self {
        Self {
            entries: vec![
                ConditionEntry::new(100.0, 1.000, 9.54),
                ConditionEntry::new(150.0, 0.995, 9.92),
                ConditionEntry::new(200.0, DEFAULT_AIR_DENSITY, 10.10),
                ConditionEntry::new(250.0, 0.986, 10.25),
            ],
        }
    }

    pub fn entries(&self) -> &[ConditionEntry] {
        &self.entries
    }

    /// Smallest and largest tabulated diameter
    pub fn diameter_range(&self) -> Option<(f64, f64)> {
        Some((self.entries.first()?.diameter, self.entries.last()?.diameter))
    }

    /// True if `diameter` falls outside the tabulated range and will be clamped
    pub fn is_clamped(&self, diameter: f64) -> bool {
        self.diameter_range()
            .is_some_and(|(min, max)| diameter < min || diameter > max)
    }
}

impl Default for ConditionTable {
    fn default() -> Self {
        Self::von_krauland_2023()
    }
}

impl TryFrom<Vec<ConditionEntry>> for ConditionTable {
    type Error = EstimateError;

    fn try_from(entries: Vec<ConditionEntry>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<ConditionTable> for Vec<ConditionEntry> {
    fn from(table: ConditionTable) -> Self {
        table.entries
    }
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1)
#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl ConditionLookup for ConditionTable {
    fn resolve(&self, diameter: f64) -> Result<SiteConditions> {
        let (Some(first), Some(last)) = (self.entries.first(), self.entries.last()) else {
            return Err(EstimateError::OutOfDomain(
                "condition table is empty".to_string(),
            ));
        };

        if diameter.is_nan() {
            return Err(EstimateError::invalid_input(
                "rotor_diameter",
                diameter,
                "must be a number",
            ));
        }

        if diameter <= first.diameter {
            if diameter < first.diameter {
                debug!(
                    diameter,
                    clamped_to = first.diameter,
                    "diameter below tabulated range, using lowest entry"
                );
            }
            return Ok(first.conditions());
        }

        if diameter >= last.diameter {
            if diameter > last.diameter {
                debug!(
                    diameter,
                    clamped_to = last.diameter,
                    "diameter above tabulated range, using highest entry"
                );
            }
            return Ok(last.conditions());
        }

        // first.diameter < diameter < last.diameter, so 1 <= idx < len
        let idx = self.entries.partition_point(|e| e.diameter < diameter);
        let upper = &self.entries[idx];
        if upper.diameter == diameter {
            return Ok(upper.conditions());
        }
        let lower = &self.entries[idx - 1];

        let t = (diameter - lower.diameter) / (upper.diameter - lower.diameter);
        Ok(SiteConditions {
            air_density: KilogramsPerCubicMeter::new(lerp(
                lower.air_density,
                upper.air_density,
                t,
            )),
            mean_wind_speed: MetersPerSecond::new(lerp(
                lower.mean_wind_speed,
                upper.mean_wind_speed,
                t,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_entries_return_stored_values() {
        let table = ConditionTable::default();
        for entry in table.entries() {
            let c = table.resolve(entry.diameter).unwrap();
            assert_eq!(*c.air_density, entry.air_density);
            assert_eq!(*c.mean_wind_speed, entry.mean_wind_speed);
        }
    }

    #[test]
    fn test_midpoint_interpolation() {
        let table = ConditionTable::default();
        let c = table.resolve(125.0).unwrap();
        assert_relative_eq!(*c.air_density, 0.9975, epsilon = 1e-12);
        assert_relative_eq!(*c.mean_wind_speed, 9.73, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolation_stays_between_neighbours() {
        let table = ConditionTable::default();
        let mut prev_speed = *table.resolve(150.0).unwrap().mean_wind_speed;
        let mut prev_density = *table.resolve(150.0).unwrap().air_density;
        for step in 1..=50 {
            let d = 150.0 + f64::from(step);
            let c = table.resolve(d).unwrap();
            // speed rises and density falls with height in this dataset
            assert!(*c.mean_wind_speed >= prev_speed, "speed not monotonic at {d}");
            assert!(*c.air_density <= prev_density, "density not monotonic at {d}");
            assert!((9.92..=10.10).contains(&*c.mean_wind_speed));
            prev_speed = *c.mean_wind_speed;
            prev_density = *c.air_density;
        }
    }

    #[test]
    fn test_clamps_outside_range() {
        let table = ConditionTable::default();
        assert_eq!(table.resolve(20.0).unwrap(), table.resolve(100.0).unwrap());
        assert_eq!(table.resolve(-3.0).unwrap(), table.resolve(100.0).unwrap());
        assert_eq!(table.resolve(400.0).unwrap(), table.resolve(250.0).unwrap());
        assert_eq!(
            table.resolve(f64::INFINITY).unwrap(),
            table.resolve(250.0).unwrap()
        );
        assert!(table.is_clamped(99.9));
        assert!(!table.is_clamped(100.0));
        assert!(table.is_clamped(250.1));
    }

    #[test]
    fn test_nan_diameter_rejected() {
        let err = ConditionTable::default().resolve(f64::NAN).unwrap_err();
        assert_eq!(err.field(), Some("rotor_diameter"));
    }

    #[test]
    fn test_single_entry_table_is_constant() {
        let table = ConditionTable::new(vec![ConditionEntry::new(120.0, 1.1, 8.0)]).unwrap();
        for d in [1.0, 120.0, 500.0] {
            let c = table.resolve(d).unwrap();
            assert_eq!(*c.air_density, 1.1);
            assert_eq!(*c.mean_wind_speed, 8.0);
        }
    }

    #[test]
    fn test_empty_table_is_out_of_domain() {
        let err = ConditionTable::new(Vec::new()).unwrap_err();
        assert!(err.is_out_of_domain());
    }

    #[test]
    fn test_unsorted_table_is_out_of_domain() {
        let err = ConditionTable::new(vec![
            ConditionEntry::new(150.0, 1.0, 9.0),
            ConditionEntry::new(100.0, 1.0, 9.0),
        ])
        .unwrap_err();
        assert!(err.is_out_of_domain());

        let err = ConditionTable::new(vec![
            ConditionEntry::new(100.0, 1.0, 9.0),
            ConditionEntry::new(100.0, 1.0, 9.5),
        ])
        .unwrap_err();
        assert!(err.is_out_of_domain());
    }

    #[test]
    fn test_bad_entry_values_are_out_of_domain() {
        let err = ConditionTable::new(vec![ConditionEntry::new(100.0, 0.0, 9.0)]).unwrap_err();
        assert!(err.is_out_of_domain());
        assert!(err.to_string().contains("air_density"));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: ConditionTable = serde_json::from_str(
            r#"[{"diameter": 80.0, "air_density": 1.1, "mean_wind_speed": 8.5}]"#,
        )
        .unwrap();
        assert_eq!(ok.entries().len(), 1);

        let bad = serde_json::from_str::<ConditionTable>("[]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_default_table_range() {
        assert_eq!(
            ConditionTable::default().diameter_range(),
            Some((100.0, 250.0))
        );
    }
}
