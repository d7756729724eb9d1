//! Site-level aggregation
//!
//! Converts an available area and a spacing rule into an installable turbine
//! count, then scales one turbine's estimate to the whole site.
//!
//! The count is a packing-density approximation, not a layout optimizer: each
//! turbine is given a cell whose size depends only on the center-to-center
//! spacing `s = spacing_factor × d`, and the site holds
//! `floor(area / cell_area)` of them. Boundary shape, exclusion zones and wake
//! losses between rows are ignored (wake losses live in the derating factor).
//!
//! The cell geometry is a policy behind [`PackingLayout`]:
//! - [`SquareGrid`] (default): cell area `s²`
//! - [`HexagonalGrid`]: staggered rows, cell area `s² · √3 / 2`
//!
//! # References
//! von Krauland et al. (2023): `N = A / (F · D)²`, F = 5.98 offshore.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::constants::DEFAULT_SPACING_FACTOR;
use crate::core_types::units::{Kilowatts, Meters, MegawattHours, SquareKilometers};
use crate::error::{require_non_negative, require_positive, Result};
use crate::turbine::SingleTurbineResult;

/// Per-request site description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSpec {
    /// Available area (km²), >= 0
    pub area_km2: f64,
    /// Spacing in rotor diameters, > 0
    pub spacing_factor: f64,
}

impl Default for SiteSpec {
    fn default() -> Self {
        Self {
            area_km2: 0.0,
            spacing_factor: DEFAULT_SPACING_FACTOR,
        }
    }
}

impl SiteSpec {
    /// Site of `area_km2` with the default offshore spacing factor
    pub fn new(area_km2: f64) -> Self {
        Self {
            area_km2,
            ..Self::default()
        }
    }

    pub fn with_spacing_factor(self, spacing_factor: f64) -> Self {
        Self {
            spacing_factor,
            ..self
        }
    }
}

/// Site-wide totals. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteResult {
    spacing_meters: Meters,
    turbine_count: u64,
    total_mean_power_kw: Kilowatts,
    total_aep_non_derated: MegawattHours,
    total_aep_derated: MegawattHours,
}

impl SiteResult {
    /// Center-to-center turbine spacing (m)
    pub fn spacing_meters(&self) -> Meters {
        self.spacing_meters
    }

    /// Installable turbines
    pub fn turbine_count(&self) -> u64 {
        self.turbine_count
    }

    /// Site mean power (kW)
    pub fn total_mean_power_kw(&self) -> Kilowatts {
        self.total_mean_power_kw
    }

    /// Site annual energy before derating (MWh/yr)
    pub fn total_aep_non_derated(&self) -> MegawattHours {
        self.total_aep_non_derated
    }

    /// Site annual energy after derating (MWh/yr)
    pub fn total_aep_derated(&self) -> MegawattHours {
        self.total_aep_derated
    }
}

/// Cell geometry used to turn area into a turbine count
pub trait PackingLayout: fmt::Debug + Send + Sync {
    /// Short identifier for logs and reports
    fn name(&self) -> &'static str;

    /// Area (m²) reserved for one turbine at the given spacing (m)
    fn cell_area(&self, spacing_meters: f64) -> f64;

    /// Number of whole cells that fit in `area_m2`.
    ///
    /// Zero area or a non-positive spacing yields zero turbines.
    fn turbine_count(&self, area_m2: f64, spacing_meters: f64) -> u64 {
        if area_m2 <= 0.0 || spacing_meters <= 0.0 {
            return 0;
        }
        // `as` saturates: NaN → 0, +inf → u64::MAX
        (area_m2 / self.cell_area(spacing_meters)).floor() as u64
    }
}

/// One turbine per `s × s` square
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquareGrid;

impl PackingLayout for SquareGrid {
    fn name(&self) -> &'static str {
        "square"
    }

    fn cell_area(&self, spacing_meters: f64) -> f64 {
        spacing_meters * spacing_meters
    }
}

/// Staggered rows `s · √3/2` apart, turbines `s` apart within a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexagonalGrid;

impl PackingLayout for HexagonalGrid {
    fn name(&self) -> &'static str {
        "hexagonal"
    }

    fn cell_area(&self, spacing_meters: f64) -> f64 {
        spacing_meters * spacing_meters * 3.0_f64.sqrt() / 2.0
    }
}

/// Serializable choice between the built-in layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Square,
    Hexagonal,
}

impl LayoutKind {
    pub fn layout(self) -> Arc<dyn PackingLayout> {
        match self {
            LayoutKind::Square => Arc::new(SquareGrid),
            LayoutKind::Hexagonal => Arc::new(HexagonalGrid),
        }
    }
}

impl std::str::FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "square" | "grid" => Ok(LayoutKind::Square),
            "hex" | "hexagonal" => Ok(LayoutKind::Hexagonal),
            other => Err(format!("unknown layout '{other}' (expected square or hex)")),
        }
    }
}

/// Scales single-turbine estimates to a site using a packing policy
#[derive(Debug, Clone)]
pub struct SiteAggregator {
    layout: Arc<dyn PackingLayout>,
}

impl Default for SiteAggregator {
    fn default() -> Self {
        Self::new(SquareGrid)
    }
}

impl SiteAggregator {
    pub fn new(layout: impl PackingLayout + 'static) -> Self {
        Self {
            layout: Arc::new(layout),
        }
    }

    pub fn from_shared(layout: Arc<dyn PackingLayout>) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &dyn PackingLayout {
        self.layout.as_ref()
    }

    /// Scale `single` (computed for `diameter`) to the site.
    ///
    /// # Errors
    /// `InvalidInput` if `diameter` or `site.spacing_factor` is not positive,
    /// or `site.area_km2` is negative. Zero area is valid and gives zero
    /// turbines.
    pub fn aggregate(
        &self,
        site: &SiteSpec,
        single: &SingleTurbineResult,
        diameter: f64,
    ) -> Result<SiteResult> {
        let diameter = require_positive("rotor_diameter", diameter)?;
        let spacing_factor = require_positive("spacing_factor", site.spacing_factor)?;
        let area_km2 = require_non_negative("area_km2", site.area_km2)?;

        let spacing = Meters::new(diameter * spacing_factor);
        let area_m2 = SquareKilometers::new(area_km2).to_square_meters();
        let turbine_count = self.layout.turbine_count(*area_m2, *spacing);
        let n = turbine_count as f64;

        debug!(
            layout = self.layout.name(),
            area_km2,
            spacing_m = *spacing,
            turbine_count,
            "aggregated site estimate"
        );

        Ok(SiteResult {
            spacing_meters: spacing,
            turbine_count,
            total_mean_power_kw: single.mean_power_kw() * n,
            total_aep_non_derated: single.aep_non_derated() * n,
            total_aep_derated: single.aep_derated() * n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PhysicalConstants;
    use crate::lookup::ConditionTable;
    use crate::turbine::{compute, TurbineSpec};

    fn single(diameter: f64) -> SingleTurbineResult {
        compute(
            &TurbineSpec::new(diameter),
            &PhysicalConstants::default(),
            &ConditionTable::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_square_grid_counts() {
        let grid = SquareGrid;
        // 1 km² at 6 × 50 m: 1e6 / 90 000 = 11.1
        assert_eq!(grid.turbine_count(1.0e6, 300.0), 11);
        // 2 km² at 10 × 100 m: exactly 2 cells
        assert_eq!(grid.turbine_count(2.0e6, 1000.0), 2);
        assert_eq!(grid.turbine_count(0.0, 300.0), 0);
        assert_eq!(grid.turbine_count(1.0e6, 0.0), 0);
        assert_eq!(grid.turbine_count(1.0e6, -5.0), 0);
    }

    #[test]
    fn test_hexagonal_packs_denser() {
        let area = 100.0e6;
        let s = 5.98 * 200.0;
        let square = SquareGrid.turbine_count(area, s);
        let hex = HexagonalGrid.turbine_count(area, s);
        assert!(hex > square, "hex {hex} should beat square {square}");
        assert_eq!(square, 69); // 1e8 / 1196² = 69.9
        assert_eq!(hex, 80); // 69.9 / 0.866 = 80.7
    }

    #[test]
    fn test_count_monotonic_in_area() {
        let s = 6.0 * 80.0;
        let mut prev = 0;
        for i in 0..200 {
            let area_km2 = 0.1 + f64::from(i) * 0.37;
            let n = SquareGrid.turbine_count(area_km2 * 1.0e6, s);
            assert!(n >= prev);
            prev = n;
        }
    }

    #[test]
    fn test_zero_area_gives_zero_totals() {
        let one = single(150.0);
        let r = SiteAggregator::default()
            .aggregate(&SiteSpec::new(0.0), &one, 150.0)
            .unwrap();
        assert_eq!(r.turbine_count(), 0);
        assert_eq!(*r.total_mean_power_kw(), 0.0);
        assert_eq!(*r.total_aep_non_derated(), 0.0);
        assert_eq!(*r.total_aep_derated(), 0.0);
        assert_eq!(*r.spacing_meters(), 150.0 * DEFAULT_SPACING_FACTOR);
    }

    #[test]
    fn test_totals_scale_by_count() {
        let one = single(200.0);
        let r = SiteAggregator::default()
            .aggregate(&SiteSpec::new(500.0), &one, 200.0)
            .unwrap();
        let n = r.turbine_count() as f64;
        assert_eq!(r.turbine_count(), 349); // 5e8 / 1196² = 349.5
        assert_eq!(*r.total_mean_power_kw(), *one.mean_power_kw() * n);
        assert_eq!(*r.total_aep_non_derated(), *one.aep_non_derated() * n);
        assert_eq!(*r.total_aep_derated(), *one.aep_derated() * n);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let one = single(100.0);
        let agg = SiteAggregator::default();

        let err = agg
            .aggregate(&SiteSpec::new(10.0).with_spacing_factor(0.0), &one, 100.0)
            .unwrap_err();
        assert_eq!(err.field(), Some("spacing_factor"));

        let err = agg.aggregate(&SiteSpec::new(10.0), &one, 0.0).unwrap_err();
        assert_eq!(err.field(), Some("rotor_diameter"));

        let err = agg.aggregate(&SiteSpec::new(-1.0), &one, 100.0).unwrap_err();
        assert_eq!(err.field(), Some("area_km2"));
    }

    #[test]
    fn test_layout_kind_parsing() {
        assert_eq!("hex".parse::<LayoutKind>(), Ok(LayoutKind::Hexagonal));
        assert_eq!("Square".parse::<LayoutKind>(), Ok(LayoutKind::Square));
        assert!("triangle".parse::<LayoutKind>().is_err());
        assert_eq!(LayoutKind::Hexagonal.layout().name(), "hexagonal");
    }
}
