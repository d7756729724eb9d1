use anyhow::{Context, Result};
use clap::Parser;
use offshore_wind_core::turbine::resolve_conditions;
use offshore_wind_core::{
    sweep, DiameterRange, EnergyUnit, Estimator, EstimatorConfig, LayoutKind, PowerUnit,
    RoundedEstimate, SingleTurbineResult, SiteConditions, SiteResult, SiteSpec, SweepPoint,
    TurbineSpec,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Offshore wind turbine and wind farm energy estimator
#[derive(Parser, Debug)]
#[command(name = "wind-estimate")]
#[command(about = "Estimate offshore wind turbine and site energy output", long_about = None)]
struct Args {
    /// Rotor diameter in meters (hub height is assumed equal)
    #[arg(short, long, required_unless_present = "sweep")]
    diameter: Option<f64>,

    /// Available site area in km² (enables site totals)
    #[arg(short, long)]
    area: Option<f64>,

    /// Turbine spacing in rotor diameters (default 5.98 or from config)
    #[arg(short, long)]
    spacing_factor: Option<f64>,

    /// Energy pattern factor override
    #[arg(long)]
    epf: Option<f64>,

    /// Derating efficiency override (0-1)
    #[arg(short, long)]
    efficiency: Option<f64>,

    /// Air density override in kg/m³
    #[arg(long)]
    air_density: Option<f64>,

    /// Mean wind speed override in m/s
    #[arg(short, long)]
    wind_speed: Option<f64>,

    /// JSON configuration file (constants, spacing, layout, condition table)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Packing layout (square, hex)
    #[arg(long)]
    layout: Option<LayoutKind>,

    /// Sweep rotor diameters as start:end:step (e.g. 80:250:10)
    #[arg(long)]
    sweep: Option<DiameterRange>,

    /// Print JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Also print the integer-rounded worksheet figures (single diameter only)
    #[arg(short, long, conflicts_with = "sweep")]
    rounded: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn template(&self) -> TurbineSpec {
        TurbineSpec {
            rotor_diameter: self.diameter.unwrap_or_default(),
            air_density: self.air_density,
            mean_wind_speed: self.wind_speed,
            energy_pattern_factor: self.epf,
            efficiency: self.efficiency,
        }
    }

    fn site(&self, estimator: &Estimator) -> Option<SiteSpec> {
        let site = estimator.site_spec(self.area?);
        Some(match self.spacing_factor {
            Some(factor) => site.with_spacing_factor(factor),
            None => site,
        })
    }
}

/// Logs go to stderr so `--json` output stays machine-readable
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_estimator(args: &Args) -> Result<Estimator> {
    let mut config = match &args.config {
        Some(path) => EstimatorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EstimatorConfig::default(),
    };
    if let Some(layout) = args.layout {
        config.layout = layout;
    }
    let estimator = Estimator::from_config(&config).context("invalid estimator configuration")?;
    info!(
        layout = estimator.aggregator().layout().name(),
        spacing_factor = estimator.spacing_factor(),
        "estimator ready"
    );
    Ok(estimator)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let estimator = build_estimator(&args)?;
    let site = args.site(&estimator);

    match args.sweep {
        Some(range) => run_sweep(&args, &estimator, &range, site.as_ref()),
        None => run_single(&args, &estimator, site.as_ref()),
    }
}

fn run_single(args: &Args, estimator: &Estimator, site: Option<&SiteSpec>) -> Result<()> {
    let spec = args.template();
    let conditions = resolve_conditions(&spec, estimator.lookup())?;
    let single = estimator.turbine(&spec).context("turbine estimate failed")?;
    let totals = site
        .map(|s| estimator.aggregator().aggregate(s, &single, spec.rotor_diameter))
        .transpose()
        .context("site estimate failed")?;
    let rounded = if args.rounded {
        let constants = estimator.constants();
        Some(RoundedEstimate::from_inputs(
            *conditions.air_density,
            *conditions.mean_wind_speed,
            spec.energy_pattern_factor
                .unwrap_or(constants.energy_pattern_factor),
            spec.rotor_diameter,
            spec.efficiency.unwrap_or(constants.efficiency),
        )?)
    } else {
        None
    };

    if args.json {
        let report = json!({
            "rotor_diameter": spec.rotor_diameter,
            "conditions": conditions,
            "turbine": single,
            "site": totals,
            "rounded": rounded,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let efficiency = spec.efficiency.unwrap_or(estimator.constants().efficiency);
    println!("=== Offshore Wind Estimate ===\n");
    print_turbine(spec.rotor_diameter, &conditions, &single, efficiency);
    if let Some(totals) = &totals {
        println!();
        print_site(site.map_or(0.0, |s| s.area_km2), totals);
    }
    if let Some(r) = &rounded {
        println!("\nWorksheet (rounded):");
        println!("  Mean power density:  {} W/m²", r.mean_power_density);
        println!("  Mean power:          {} kW", r.mean_power_kw);
        println!("  AEP (non-derated):   {} MWh/yr", r.aep_non_derated);
        println!("  AEP (derated):       {} MWh/yr", r.aep_derated);
    }
    Ok(())
}

fn print_turbine(
    diameter: f64,
    conditions: &SiteConditions,
    single: &SingleTurbineResult,
    efficiency: f64,
) {
    println!("Turbine:");
    println!("  Rotor diameter:      {diameter:.1} m");
    println!("  Air density:         {:.3}", conditions.air_density);
    println!("  Mean wind speed:     {}", conditions.mean_wind_speed);
    println!("  Rotor area:          {}", single.rotor_area());
    println!("  Mean power density:  {}", single.mean_power_density());
    println!(
        "  Mean power:          {}",
        PowerUnit::auto_scale(single.mean_power_kw())
    );
    println!(
        "  AEP (non-derated):   {}/yr",
        EnergyUnit::auto_scale(single.aep_non_derated())
    );
    println!(
        "  AEP (derated {:.0}%):   {}/yr",
        efficiency * 100.0,
        EnergyUnit::auto_scale(single.aep_derated())
    );
}

fn print_site(area_km2: f64, totals: &SiteResult) {
    println!("Site ({area_km2} km²):");
    println!("  Turbine spacing:     {:.0}", totals.spacing_meters());
    println!("  Turbines:            {}", totals.turbine_count());
    println!(
        "  Mean power:          {}",
        PowerUnit::auto_scale(totals.total_mean_power_kw())
    );
    println!(
        "  AEP (non-derated):   {}/yr",
        EnergyUnit::auto_scale(totals.total_aep_non_derated())
    );
    println!(
        "  AEP (derated):       {}/yr",
        EnergyUnit::auto_scale(totals.total_aep_derated())
    );
}

fn run_sweep(
    args: &Args,
    estimator: &Estimator,
    range: &DiameterRange,
    site: Option<&SiteSpec>,
) -> Result<()> {
    let diameters = range.diameters();
    let points = sweep(estimator, &args.template(), &diameters, site).context("sweep failed")?;
    info!(points = points.len(), "sweep complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    println!(
        "{:>8} {:>8} {:>7} {:>12} {:>14} {:>6} {:>14}",
        "d (m)", "rho", "v (m/s)", "power", "AEP derated", "count", "site AEP"
    );
    for point in &points {
        print_sweep_row(point);
    }
    Ok(())
}

fn print_sweep_row(point: &SweepPoint) {
    let (count, site_aep) = point.site.map_or((String::from("-"), String::from("-")), |s| {
        (
            s.turbine_count().to_string(),
            EnergyUnit::auto_scale(s.total_aep_derated()).to_string(),
        )
    });
    println!(
        "{:>8.1} {:>8.3} {:>7.2} {:>12} {:>14} {:>6} {:>14}",
        point.diameter,
        *point.conditions.air_density,
        *point.conditions.mean_wind_speed,
        PowerUnit::auto_scale(point.turbine.mean_power_kw()).to_string(),
        EnergyUnit::auto_scale(point.turbine.aep_derated()).to_string(),
        count,
        site_aep
    );
}
