//! Estimator facade
//!
//! Holds the read-only pieces every calculation needs (condition lookup,
//! constants, default spacing factor, packing layout) so callers pass one
//! value around. `Estimator` is `Send + Sync` and cheap to clone; concurrent
//! requests share it without coordination.

use std::sync::Arc;

use crate::config::EstimatorConfig;
use crate::constants::{PhysicalConstants, DEFAULT_SPACING_FACTOR};
use crate::error::{require_positive, Result};
use crate::lookup::{ConditionLookup, ConditionTable, SiteConditions};
use crate::site::{PackingLayout, SiteAggregator, SiteResult, SiteSpec};
use crate::turbine::{self, SingleTurbineResult, TurbineSpec};

#[derive(Debug, Clone)]
pub struct Estimator {
    lookup: Arc<dyn ConditionLookup>,
    constants: PhysicalConstants,
    spacing_factor: f64,
    aggregator: SiteAggregator,
}

impl Default for Estimator {
    /// Literature dataset, default constants, square grid
    fn default() -> Self {
        Self {
            lookup: Arc::new(ConditionTable::default()),
            constants: PhysicalConstants::default(),
            spacing_factor: DEFAULT_SPACING_FACTOR,
            aggregator: SiteAggregator::default(),
        }
    }
}

impl Estimator {
    /// Estimator over a custom lookup
    ///
    /// # Errors
    /// `InvalidInput` if `constants` fail validation.
    pub fn new(lookup: impl ConditionLookup + 'static, constants: PhysicalConstants) -> Result<Self> {
        constants.validate()?;
        Ok(Self {
            lookup: Arc::new(lookup),
            constants,
            ..Self::default()
        })
    }

    /// Build from validated configuration
    ///
    /// # Errors
    /// `InvalidInput` if the configuration fails validation.
    pub fn from_config(config: &EstimatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lookup: Arc::new(config.conditions.clone()),
            constants: config.constants,
            spacing_factor: config.spacing_factor,
            aggregator: SiteAggregator::from_shared(config.layout.layout()),
        })
    }

    /// Replace the default spacing factor used by [`site_spec`](Self::site_spec)
    ///
    /// # Errors
    /// `InvalidInput` if `spacing_factor` is not positive.
    pub fn with_spacing_factor(self, spacing_factor: f64) -> Result<Self> {
        let spacing_factor = require_positive("spacing_factor", spacing_factor)?;
        Ok(Self {
            spacing_factor,
            ..self
        })
    }

    /// Replace the packing policy
    pub fn with_layout(self, layout: impl PackingLayout + 'static) -> Self {
        Self {
            aggregator: SiteAggregator::new(layout),
            ..self
        }
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    pub fn spacing_factor(&self) -> f64 {
        self.spacing_factor
    }

    pub fn lookup(&self) -> &dyn ConditionLookup {
        self.lookup.as_ref()
    }

    pub fn aggregator(&self) -> &SiteAggregator {
        &self.aggregator
    }

    /// Site of `area_km2` using the configured spacing factor
    pub fn site_spec(&self, area_km2: f64) -> SiteSpec {
        SiteSpec::new(area_km2).with_spacing_factor(self.spacing_factor)
    }

    /// Hub-height conditions for a diameter
    ///
    /// # Errors
    /// `OutOfDomain` if the lookup has no data.
    pub fn resolve(&self, diameter: f64) -> Result<SiteConditions> {
        self.lookup.resolve(diameter)
    }

    /// Single-turbine estimate
    ///
    /// # Errors
    /// See [`turbine::compute`].
    pub fn turbine(&self, spec: &TurbineSpec) -> Result<SingleTurbineResult> {
        turbine::compute(spec, &self.constants, self.lookup.as_ref())
    }

    /// Single-turbine estimate and site totals
    ///
    /// # Errors
    /// See [`turbine::compute`] and [`SiteAggregator::aggregate`].
    pub fn site(
        &self,
        spec: &TurbineSpec,
        site: &SiteSpec,
    ) -> Result<(SingleTurbineResult, SiteResult)> {
        let single = self.turbine(spec)?;
        let totals = self
            .aggregator
            .aggregate(site, &single, spec.rotor_diameter)?;
        Ok((single, totals))
    }
}
