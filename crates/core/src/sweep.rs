//! Diameter sweeps
//!
//! Evaluates the same turbine template across many rotor diameters, in
//! parallel, for plotting and sizing studies. Each diameter is an independent
//! pure evaluation against the shared read-only [`Estimator`], so the work
//! splits across the rayon pool with no locking. Output order always matches
//! input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::{require_positive, EstimateError, Result};
use crate::estimator::Estimator;
use crate::lookup::SiteConditions;
use crate::site::{SiteResult, SiteSpec};
use crate::turbine::{resolve_conditions, SingleTurbineResult, TurbineSpec};

/// Largest number of diameters a single range may expand to
pub const MAX_SWEEP_POINTS: usize = 100_000;

/// Inclusive, evenly spaced diameter range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiameterRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl DiameterRange {
    /// # Errors
    /// `InvalidInput` if `start` or `step` is not positive, `end < start`, or
    /// the range would expand to more than [`MAX_SWEEP_POINTS`] diameters.
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self> {
        require_positive("sweep_start", start)?;
        require_positive("sweep_step", step)?;
        if !end.is_finite() || end < start {
            return Err(EstimateError::invalid_input(
                "sweep_end",
                end,
                "must be finite and not less than start",
            ));
        }
        let range = Self { start, end, step };
        let points = range.step_count() + 1.0;
        if points > MAX_SWEEP_POINTS as f64 {
            return Err(EstimateError::invalid_input(
                "sweep_step",
                step,
                "range expands to too many diameters",
            ));
        }
        Ok(range)
    }

    fn step_count(&self) -> f64 {
        ((self.end - self.start) / self.step + 1e-9).floor()
    }

    /// Diameters `start, start + step, ...` up to and including `end`.
    ///
    /// `end` is included when it lies within floating-point noise of a step.
    /// Never yields more than [`MAX_SWEEP_POINTS`] values, even for a range
    /// built without [`DiameterRange::new`].
    pub fn diameters(&self) -> Vec<f64> {
        let steps = (self.step_count() as usize).min(MAX_SWEEP_POINTS - 1);
        (0..=steps)
            .map(|i| self.start + self.step * i as f64)
            .collect()
    }
}

impl FromStr for DiameterRange {
    type Err = EstimateError;

    /// Parse `start:end:step`, e.g. `80:250:10`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [start, end, step] = *parts.as_slice() else {
            return Err(EstimateError::invalid_input(
                "sweep",
                f64::NAN,
                "expected start:end:step",
            ));
        };
        let parse = |field: &'static str, text: &str| {
            text.parse::<f64>()
                .map_err(|_| EstimateError::invalid_input(field, f64::NAN, "not a number"))
        };
        Self::new(
            parse("sweep_start", start)?,
            parse("sweep_end", end)?,
            parse("sweep_step", step)?,
        )
    }
}

/// One evaluated diameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub diameter: f64,
    pub conditions: SiteConditions,
    pub turbine: SingleTurbineResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteResult>,
}

fn evaluate(
    estimator: &Estimator,
    template: &TurbineSpec,
    diameter: f64,
    site: Option<&SiteSpec>,
) -> Result<SweepPoint> {
    let spec = template.with_rotor_diameter(diameter);
    let turbine = estimator.turbine(&spec)?;
    let conditions = resolve_conditions(&spec, estimator.lookup())?;
    let site = site
        .map(|s| estimator.aggregator().aggregate(s, &turbine, diameter))
        .transpose()?;
    Ok(SweepPoint {
        diameter,
        conditions,
        turbine,
        site,
    })
}

/// Evaluate `template` at every diameter, optionally with site totals.
///
/// Overrides on `template` (density, speed, EPF, efficiency) apply to every
/// point; only the rotor diameter changes.
///
/// # Errors
/// Any failing diameter fails the whole sweep with that diameter's error.
pub fn sweep(
    estimator: &Estimator,
    template: &TurbineSpec,
    diameters: &[f64],
    site: Option<&SiteSpec>,
) -> Result<Vec<SweepPoint>> {
    debug!(
        points = diameters.len(),
        with_site = site.is_some(),
        "starting diameter sweep"
    );
    diameters
        .par_iter()
        .map(|&d| evaluate(estimator, template, d, site))
        .collect()
}
