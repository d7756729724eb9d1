//! Offshore Wind Energy Core Library
//!
//! Estimates the energy output of offshore wind turbines and of whole wind
//! farm sites from rotor diameter and site area, using hub-height conditions
//! from the offshore literature (von Krauland et al. 2023).
//!
//! ## Pipeline
//!
//! - Condition lookup: rotor diameter to air density and mean wind speed,
//!   interpolated and clamped over a small table
//! - Single turbine: rotor area, mean power density, mean power and annual
//!   energy production (raw and derated)
//! - Site aggregation: turbine count from area and spacing, scaled totals
//!
//! Everything is pure and deterministic. [`Estimator`] bundles the read-only
//! inputs and can be shared freely across threads; [`sweep`] evaluates many
//! diameters in parallel.

// Core types and utilities
pub mod core_types;
pub mod constants;
pub mod error;

// Estimation pipeline
pub mod lookup;
pub mod site;
pub mod turbine;

// Configuration, facade and batch evaluation
pub mod config;
pub mod display;
pub mod estimator;
pub mod sweep;

// Re-export core types
pub use constants::PhysicalConstants;
pub use core_types::{
    Kilowatts, KilogramsPerCubicMeter, MegawattHours, Meters, MetersPerSecond, SquareKilometers,
    SquareMeters, Watts, WattsPerSquareMeter,
};
pub use error::{EstimateError, Result};

// Re-export pipeline types
pub use lookup::{ConditionEntry, ConditionLookup, ConditionTable, SiteConditions};
pub use site::{HexagonalGrid, LayoutKind, PackingLayout, SiteAggregator, SiteResult, SiteSpec, SquareGrid};
pub use turbine::{SingleTurbineResult, TurbineSpec};

// Re-export facade types
pub use config::EstimatorConfig;
pub use display::{EnergyUnit, PowerUnit, RoundedEstimate, Scaled};
pub use estimator::Estimator;
pub use sweep::{sweep, DiameterRange, SweepPoint, MAX_SWEEP_POINTS};
