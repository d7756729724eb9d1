//! Single-turbine mean power and annual energy
//!
//! Mean power is estimated from the wind resource, not from a power curve:
//!
//! ```text
//! A    = π d² / 4
//! P/A  = ½ ρ EPF v̄³                (W/m²)
//! P    = (P/A) · A / 1000           (kW)
//! AEP  = P · h / 1000               (MWh/yr, h = 8760)
//! AEPη = η · AEP                    (MWh/yr)
//! ```
//!
//! The energy pattern factor (EPF) corrects `v̄³` for the spread of wind speeds
//! around the mean (Rayleigh, Weibull k=2 → 1.91). The derating efficiency η
//! lumps availability, electrical and wake losses. Cut-in/cut-out behavior
//! and power curves are deliberately not modeled.
//!
//! # References
//! - Ginsberg (2019), "Harness It", ch. 4 worked example
//! - von Krauland et al. (2023)

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use crate::constants::PhysicalConstants;
use crate::core_types::units::{
    Kilowatts, KilogramsPerCubicMeter, Meters, MegawattHours, MetersPerSecond, SquareMeters,
    WattsPerSquareMeter,
};
use crate::error::{require_fraction, require_non_negative, require_positive, Result};
use crate::lookup::{ConditionLookup, SiteConditions};

/// Per-request turbine description.
///
/// Only the rotor diameter is required. Every `Some` override replaces the
/// table-derived or process-wide value for this call only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TurbineSpec {
    /// Rotor diameter (m), > 0
    pub rotor_diameter: f64,
    /// Explicit air density (kg/m³), > 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_density: Option<f64>,
    /// Explicit mean wind speed (m/s), >= 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_wind_speed: Option<f64>,
    /// Explicit energy pattern factor, > 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_pattern_factor: Option<f64>,
    /// Explicit derating efficiency in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
}

impl TurbineSpec {
    pub fn new(rotor_diameter: f64) -> Self {
        Self {
            rotor_diameter,
            ..Self::default()
        }
    }

    pub fn with_air_density(self, air_density: f64) -> Self {
        Self {
            air_density: Some(air_density),
            ..self
        }
    }

    pub fn with_mean_wind_speed(self, mean_wind_speed: f64) -> Self {
        Self {
            mean_wind_speed: Some(mean_wind_speed),
            ..self
        }
    }

    pub fn with_energy_pattern_factor(self, energy_pattern_factor: f64) -> Self {
        Self {
            energy_pattern_factor: Some(energy_pattern_factor),
            ..self
        }
    }

    pub fn with_efficiency(self, efficiency: f64) -> Self {
        Self {
            efficiency: Some(efficiency),
            ..self
        }
    }

    /// Same overrides, different rotor
    pub fn with_rotor_diameter(self, rotor_diameter: f64) -> Self {
        Self {
            rotor_diameter,
            ..self
        }
    }
}

/// Estimate for one turbine. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleTurbineResult {
    rotor_area: SquareMeters,
    mean_power_density: WattsPerSquareMeter,
    mean_power_kw: Kilowatts,
    aep_non_derated: MegawattHours,
    aep_derated: MegawattHours,
}

impl SingleTurbineResult {
    /// Swept rotor area (m²)
    pub fn rotor_area(&self) -> SquareMeters {
        self.rotor_area
    }

    /// EPF-adjusted mean power density (W/m²)
    pub fn mean_power_density(&self) -> WattsPerSquareMeter {
        self.mean_power_density
    }

    /// Mean power (kW)
    pub fn mean_power_kw(&self) -> Kilowatts {
        self.mean_power_kw
    }

    /// Annual energy before derating (MWh/yr)
    pub fn aep_non_derated(&self) -> MegawattHours {
        self.aep_non_derated
    }

    /// Annual energy after derating (MWh/yr)
    pub fn aep_derated(&self) -> MegawattHours {
        self.aep_derated
    }
}

/// Swept area of a rotor: `π d² / 4`.
///
/// Pure formula with no validation; [`compute`] rejects non-positive
/// diameters before calling it.
#[inline]
pub fn rotor_area(diameter: Meters) -> SquareMeters {
    SquareMeters::new(PI * *diameter * *diameter / 4.0)
}

/// EPF-adjusted mean power density: `½ ρ EPF v̄³` (W/m²)
#[inline]
pub fn mean_power_density(
    air_density: KilogramsPerCubicMeter,
    mean_wind_speed: MetersPerSecond,
    energy_pattern_factor: f64,
) -> WattsPerSquareMeter {
    WattsPerSquareMeter::new(
        0.5 * *air_density * energy_pattern_factor * mean_wind_speed.powi(3),
    )
}

/// Resolve the hub-height conditions for `spec`, honoring explicit overrides.
///
/// The lookup is consulted only when at least one of the two values is missing.
///
/// # Errors
/// `InvalidInput` for a bad override, or whatever the lookup returns.
pub fn resolve_conditions(
    spec: &TurbineSpec,
    lookup: &dyn ConditionLookup,
) -> Result<SiteConditions> {
    if let Some(rho) = spec.air_density {
        require_positive("air_density", rho)?;
    }
    if let Some(v) = spec.mean_wind_speed {
        require_non_negative("mean_wind_speed", v)?;
    }

    let conditions = match (spec.air_density, spec.mean_wind_speed) {
        (Some(rho), Some(v)) => SiteConditions {
            air_density: KilogramsPerCubicMeter::new(rho),
            mean_wind_speed: MetersPerSecond::new(v),
        },
        (rho, v) => {
            let table = lookup.resolve(spec.rotor_diameter)?;
            SiteConditions {
                air_density: rho.map_or(table.air_density, KilogramsPerCubicMeter::new),
                mean_wind_speed: v.map_or(table.mean_wind_speed, MetersPerSecond::new),
            }
        }
    };
    Ok(conditions)
}

/// Estimate mean power and annual energy for one turbine.
///
/// # Errors
/// - `InvalidInput` if the diameter is not positive, EPF is not positive,
///   efficiency is outside `[0, 1]`, or an override is out of range. The
///   field is named; nothing is clamped.
/// - `OutOfDomain` if the lookup has no data.
pub fn compute(
    spec: &TurbineSpec,
    constants: &PhysicalConstants,
    lookup: &dyn ConditionLookup,
) -> Result<SingleTurbineResult> {
    let diameter = require_positive("rotor_diameter", spec.rotor_diameter)?;
    let epf = require_positive(
        "energy_pattern_factor",
        spec.energy_pattern_factor
            .unwrap_or(constants.energy_pattern_factor),
    )?;
    let efficiency = require_fraction(
        "efficiency",
        spec.efficiency.unwrap_or(constants.efficiency),
    )?;
    let hours = require_positive("hours_per_year", constants.hours_per_year)?;

    let area = rotor_area(Meters::new(diameter));
    let conditions = resolve_conditions(spec, lookup)?;
    let density = mean_power_density(conditions.air_density, conditions.mean_wind_speed, epf);
    let power_kw = (density * area).to_kilowatts();
    let aep_non_derated = power_kw.energy_over_hours(hours);
    let aep_derated = aep_non_derated * efficiency;

    debug!(
        diameter,
        air_density = *conditions.air_density,
        mean_wind_speed = *conditions.mean_wind_speed,
        epf,
        efficiency,
        mean_power_kw = *power_kw,
        aep_derated_mwh = *aep_derated,
        "computed single-turbine estimate"
    );

    Ok(SingleTurbineResult {
        rotor_area: area,
        mean_power_density: density,
        mean_power_kw: power_kw,
        aep_non_derated,
        aep_derated,
    })
}
