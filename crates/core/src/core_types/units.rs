//! Semantic unit types for type-safe physical quantity handling
//!
//! This module provides newtype wrappers for the quantities that flow through
//! the estimator so that a rotor area can never be handed to something that
//! expects a power density, and kilowatts never get summed with megawatt-hours.
//!
//! # Design Philosophy
//! - Every quantity is an `f64` in the SI-derived unit named by the type
//! - Values are plain data: any finite or non-finite value can be wrapped,
//!   validation happens at the estimator boundary where the field name is known
//! - Total ordering via `Ord` (NaN sorts above every other value)
//! - `Deref<Target = f64>` for cheap read access in formulas
//! - Cross-unit arithmetic only where the physics defines it
//!   (`Meters * Meters`, `WattsPerSquareMeter * SquareMeters`, ...)
//! - Serde support (transparent, so results serialize as bare numbers)
//!
//! # Usage
//! ```
//! use offshore_wind_core::core_types::units::{Meters, SquareMeters, WattsPerSquareMeter, Watts};
//!
//! let side = Meters::new(10.0);
//! let area: SquareMeters = side * side;
//! assert_eq!(*area, 100.0);
//!
//! let power: Watts = WattsPerSquareMeter::new(500.0) * area;
//! assert_eq!(*power.to_kilowatts(), 50.0);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Div, Mul, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Declares a quantity newtype with the shared trait surface.
///
/// Each generated type gets: `new`/`value`, `ZERO`, `Deref`, total ordering,
/// same-unit `Add`/`Sub`, scalar `Mul<f64>`/`Div<f64>`, comparisons against raw
/// `f64`, `From` conversions in both directions and a `Display` with the unit
/// symbol.
macro_rules! quantity {
    ($(#[$meta:meta])* $name:ident, $symbol:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(f64);

        impl $name {
            /// Zero of this quantity
            pub const ZERO: $name = $name(0.0);

            /// Unit symbol used by `Display`
            pub const SYMBOL: &'static str = $symbol;

            /// Wrap a raw value expressed in this unit
            #[inline]
            #[must_use]
            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// Get the raw f64 value
            #[inline]
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                f64_total_cmp(self.0, other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        impl PartialEq<f64> for $name {
            fn eq(&self, other: &f64) -> bool {
                self.0 == *other
            }
        }

        impl PartialOrd<f64> for $name {
            fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
                self.0.partial_cmp(other)
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(q: $name) -> f64 {
                q.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match f.precision() {
                    Some(p) => write!(f, "{:.*} {}", p, self.0, $symbol),
                    None => write!(f, "{:.2} {}", self.0, $symbol),
                }
            }
        }
    };
}

// ============================================================================
// GEOMETRY
// ============================================================================

quantity!(
    /// Length in meters (rotor diameter, turbine spacing)
    Meters,
    "m"
);

quantity!(
    /// Area in square meters (rotor swept area, packing cell area)
    SquareMeters,
    "m²"
);

quantity!(
    /// Area in square kilometers (site area as entered by users)
    SquareKilometers,
    "km²"
);

impl Mul<Meters> for Meters {
    type Output = SquareMeters;
    fn mul(self, rhs: Meters) -> SquareMeters {
        SquareMeters(self.0 * rhs.0)
    }
}

impl SquareKilometers {
    /// Square meters per square kilometer
    const M2_PER_KM2: f64 = 1_000_000.0;

    /// Convert to square meters
    #[inline]
    #[must_use]
    pub fn to_square_meters(self) -> SquareMeters {
        SquareMeters(self.0 * Self::M2_PER_KM2)
    }
}

impl From<SquareKilometers> for SquareMeters {
    fn from(a: SquareKilometers) -> SquareMeters {
        a.to_square_meters()
    }
}

// ============================================================================
// ATMOSPHERE
// ============================================================================

quantity!(
    /// Air density in kg/m³
    KilogramsPerCubicMeter,
    "kg/m³"
);

quantity!(
    /// Wind speed in m/s
    MetersPerSecond,
    "m/s"
);

// ============================================================================
// POWER & ENERGY
// ============================================================================

quantity!(
    /// Power density of the wind resource in W/m²
    WattsPerSquareMeter,
    "W/m²"
);

quantity!(
    /// Power in watts
    Watts,
    "W"
);

quantity!(
    /// Power in kilowatts
    Kilowatts,
    "kW"
);

quantity!(
    /// Energy in megawatt-hours
    MegawattHours,
    "MWh"
);

impl Mul<SquareMeters> for WattsPerSquareMeter {
    type Output = Watts;
    fn mul(self, rhs: SquareMeters) -> Watts {
        Watts(self.0 * rhs.0)
    }
}

impl Mul<WattsPerSquareMeter> for SquareMeters {
    type Output = Watts;
    fn mul(self, rhs: WattsPerSquareMeter) -> Watts {
        Watts(self.0 * rhs.0)
    }
}

impl Watts {
    /// Convert to kilowatts
    #[inline]
    #[must_use]
    pub fn to_kilowatts(self) -> Kilowatts {
        Kilowatts(self.0 / 1000.0)
    }
}

impl From<Watts> for Kilowatts {
    fn from(w: Watts) -> Kilowatts {
        w.to_kilowatts()
    }
}

impl Kilowatts {
    /// Energy delivered by running at this mean power for `hours`.
    ///
    /// Computed as `kW × h / 1000` in that order.
    #[inline]
    #[must_use]
    pub fn energy_over_hours(self, hours: f64) -> MegawattHours {
        MegawattHours(self.0 * hours / 1000.0)
    }
}
