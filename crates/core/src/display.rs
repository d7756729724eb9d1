//! Presentation helpers
//!
//! Nothing in here feeds back into the estimate. [`PowerUnit`] and
//! [`EnergyUnit`] rescale SI results into human-sized units, and
//! [`RoundedEstimate`] reproduces the integer-rounded figures of the reference
//! worksheet.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::HOURS_PER_YEAR;
use crate::core_types::units::{
    Kilowatts, KilogramsPerCubicMeter, Meters, MegawattHours, MetersPerSecond,
};
use crate::error::{require_fraction, require_non_negative, require_positive, Result};
use crate::turbine::{mean_power_density, rotor_area, SingleTurbineResult};

/// A value rescaled into a display unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaled {
    pub value: f64,
    pub symbol: &'static str,
}

impl fmt::Display for Scaled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(f, "{:.*} {}", precision, self.value, self.symbol)
    }
}

/// Power display units, base kW
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUnit {
    Kilowatts,
    Megawatts,
    Gigawatts,
}

impl PowerUnit {
    /// Kilowatts per one of this unit
    pub const fn factor(self) -> f64 {
        match self {
            PowerUnit::Kilowatts => 1.0,
            PowerUnit::Megawatts => 1.0e3,
            PowerUnit::Gigawatts => 1.0e6,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            PowerUnit::Kilowatts => "kW",
            PowerUnit::Megawatts => "MW",
            PowerUnit::Gigawatts => "GW",
        }
    }

    /// Largest unit that keeps the magnitude at or above one
    pub fn auto(power: Kilowatts) -> Self {
        let magnitude = power.abs();
        if magnitude >= 1.0e6 {
            PowerUnit::Gigawatts
        } else if magnitude >= 1.0e3 {
            PowerUnit::Megawatts
        } else {
            PowerUnit::Kilowatts
        }
    }

    pub fn scale(self, power: Kilowatts) -> Scaled {
        Scaled {
            value: *power / self.factor(),
            symbol: self.symbol(),
        }
    }

    /// [`auto`](Self::auto) followed by [`scale`](Self::scale)
    pub fn auto_scale(power: Kilowatts) -> Scaled {
        Self::auto(power).scale(power)
    }
}

/// Energy display units, base MWh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyUnit {
    MegawattHours,
    GigawattHours,
    TerawattHours,
}

impl EnergyUnit {
    /// Megawatt-hours per one of this unit
    pub const fn factor(self) -> f64 {
        match self {
            EnergyUnit::MegawattHours => 1.0,
            EnergyUnit::GigawattHours => 1.0e3,
            EnergyUnit::TerawattHours => 1.0e6,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            EnergyUnit::MegawattHours => "MWh",
            EnergyUnit::GigawattHours => "GWh",
            EnergyUnit::TerawattHours => "TWh",
        }
    }

    /// Largest unit that keeps the magnitude at or above one
    pub fn auto(energy: MegawattHours) -> Self {
        let magnitude = energy.abs();
        if magnitude >= 1.0e6 {
            EnergyUnit::TerawattHours
        } else if magnitude >= 1.0e3 {
            EnergyUnit::GigawattHours
        } else {
            EnergyUnit::MegawattHours
        }
    }

    pub fn scale(self, energy: MegawattHours) -> Scaled {
        Scaled {
            value: *energy / self.factor(),
            symbol: self.symbol(),
        }
    }

    /// [`auto`](Self::auto) followed by [`scale`](Self::scale)
    pub fn auto_scale(energy: MegawattHours) -> Scaled {
        Self::auto(energy).scale(energy)
    }
}

/// Round half to even, the rule the reference worksheet uses
#[inline]
fn rint(x: f64) -> f64 {
    x.round_ties_even()
}

/// Integer-rounded single-turbine figures.
///
/// The reference worksheet rounds at every step: wind speed to two decimals,
/// power density to whole W/m², mean power to whole kW, and both energy
/// figures to whole MWh/yr. Later steps consume the rounded earlier values,
/// so these numbers can differ slightly from rounding an unrounded
/// [`SingleTurbineResult`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundedEstimate {
    /// W/m²
    pub mean_power_density: f64,
    /// kW
    pub mean_power_kw: f64,
    /// MWh/yr
    pub aep_non_derated: f64,
    /// MWh/yr
    pub aep_derated: f64,
}

impl RoundedEstimate {
    /// Run the worksheet chain from raw inputs.
    ///
    /// # Errors
    /// `InvalidInput` under the same rules as [`crate::turbine::compute`].
    pub fn from_inputs(
        air_density: f64,
        mean_wind_speed: f64,
        energy_pattern_factor: f64,
        rotor_diameter: f64,
        efficiency: f64,
    ) -> Result<Self> {
        let diameter = require_positive("rotor_diameter", rotor_diameter)?;
        let rho = require_positive("air_density", air_density)?;
        let v = require_non_negative("mean_wind_speed", mean_wind_speed)?;
        let epf = require_positive("energy_pattern_factor", energy_pattern_factor)?;
        let eta = require_fraction("efficiency", efficiency)?;

        let v = rint(v * 100.0) / 100.0;
        let density = rint(*mean_power_density(
            KilogramsPerCubicMeter::new(rho),
            MetersPerSecond::new(v),
            epf,
        ));
        let power_kw = rint(density * *rotor_area(Meters::new(diameter)) / 1000.0);

        Ok(Self {
            mean_power_density: density,
            mean_power_kw: power_kw,
            aep_non_derated: rint(power_kw * HOURS_PER_YEAR / 1000.0),
            aep_derated: rint(power_kw * HOURS_PER_YEAR * eta / 1000.0),
        })
    }

    /// Round each field of an unrounded result
    pub fn from_result(result: &SingleTurbineResult) -> Self {
        Self {
            mean_power_density: rint(*result.mean_power_density()),
            mean_power_kw: rint(*result.mean_power_kw()),
            aep_non_derated: rint(*result.aep_non_derated()),
            aep_derated: rint(*result.aep_derated()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SEA_LEVEL_AIR_DENSITY;

    #[test]
    fn test_power_auto_units() {
        assert_eq!(PowerUnit::auto(Kilowatts::new(817.8)), PowerUnit::Kilowatts);
        assert_eq!(PowerUnit::auto(Kilowatts::new(1000.0)), PowerUnit::Megawatts);
        assert_eq!(PowerUnit::auto(Kilowatts::new(2.5e6)), PowerUnit::Gigawatts);

        let s = PowerUnit::auto_scale(Kilowatts::new(2_500_000.0));
        assert_eq!(s.value, 2.5);
        assert_eq!(s.to_string(), "2.50 GW");
    }

    #[test]
    fn test_energy_auto_units() {
        assert_eq!(EnergyUnit::auto(MegawattHours::new(999.0)), EnergyUnit::MegawattHours);
        assert_eq!(EnergyUnit::auto(MegawattHours::new(7163.0)), EnergyUnit::GigawattHours);
        let s = EnergyUnit::auto_scale(MegawattHours::new(3.2e6));
        assert_eq!(s.symbol, "TWh");
        assert_eq!(format!("{s:.1}"), "3.2 TWh");
    }

    #[test]
    fn test_zero_stays_in_base_unit() {
        assert_eq!(PowerUnit::auto(Kilowatts::ZERO), PowerUnit::Kilowatts);
        assert_eq!(EnergyUnit::auto(MegawattHours::ZERO), EnergyUnit::MegawattHours);
    }

    #[test]
    fn test_worksheet_chain_50m() {
        let r = RoundedEstimate::from_inputs(SEA_LEVEL_AIR_DENSITY, 4.47, 1.91, 50.0, 0.20).unwrap();
        assert_eq!(r.mean_power_density, 104.0);
        assert_eq!(r.mean_power_kw, 204.0);
        assert_eq!(r.aep_non_derated, 1787.0);
        assert_eq!(r.aep_derated, 357.0);
    }

    #[test]
    fn test_worksheet_rounds_wind_speed_first() {
        let a = RoundedEstimate::from_inputs(1.0, 5.12345, 2.0, 100.0, 0.2).unwrap();
        let b = RoundedEstimate::from_inputs(1.0, 5.12, 2.0, 100.0, 0.2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_worksheet_derating_extremes() {
        let none = RoundedEstimate::from_inputs(1.0, 10.0, 2.0, 100.0, 0.0).unwrap();
        assert_eq!(none.aep_derated, 0.0);
        let full = RoundedEstimate::from_inputs(1.0, 10.0, 2.0, 100.0, 1.0).unwrap();
        assert_eq!(full.aep_derated, full.aep_non_derated);
    }

    #[test]
    fn test_worksheet_validates() {
        let err = RoundedEstimate::from_inputs(1.0, 10.0, 2.0, 0.0, 0.2).unwrap_err();
        assert_eq!(err.field(), Some("rotor_diameter"));
        let err = RoundedEstimate::from_inputs(1.0, 10.0, 2.0, 100.0, 1.5).unwrap_err();
        assert_eq!(err.field(), Some("efficiency"));
    }

    #[test]
    fn test_half_to_even() {
        assert_eq!(rint(0.5), 0.0);
        assert_eq!(rint(1.5), 2.0);
        assert_eq!(rint(2.5), 2.0);
        assert_eq!(rint(-0.4), -0.0);
    }
}
