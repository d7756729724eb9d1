use offshore_wind_core::{SingleTurbineResult, SiteResult, TurbineSpec};

use crate::error::{DefaultWindEstimatorError, WindEstimatorErrorCode};
use crate::helpers::{clear_last_error, instance_from_ptr, track_error, track_result};
use crate::instance::WindEstimator;

/// Turbine request. Override fields set to NaN mean "not supplied".
///
/// Keep this layout stable for C/C++/C# consumers.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TurbineInput {
    /// Rotor diameter (m), > 0. Required.
    pub rotor_diameter: f64,

    /// Air density (kg/m³), or NaN to use the condition table.
    pub air_density: f64,

    /// Mean wind speed (m/s), or NaN to use the condition table.
    pub mean_wind_speed: f64,

    /// Energy pattern factor, or NaN for the configured value.
    pub energy_pattern_factor: f64,

    /// Derating efficiency in [0, 1], or NaN for the configured value.
    pub efficiency: f64,
}

impl TurbineInput {
    /// Only the diameter supplied
    pub fn with_diameter(rotor_diameter: f64) -> Self {
        Self {
            rotor_diameter,
            air_density: f64::NAN,
            mean_wind_speed: f64::NAN,
            energy_pattern_factor: f64::NAN,
            efficiency: f64::NAN,
        }
    }
}

#[inline]
fn supplied(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

impl From<&TurbineInput> for TurbineSpec {
    fn from(input: &TurbineInput) -> Self {
        TurbineSpec {
            rotor_diameter: input.rotor_diameter,
            air_density: supplied(input.air_density),
            mean_wind_speed: supplied(input.mean_wind_speed),
            energy_pattern_factor: supplied(input.energy_pattern_factor),
            efficiency: supplied(input.efficiency),
        }
    }
}

/// Single-turbine estimate
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurbineOutput {
    /// Swept rotor area (m²)
    pub rotor_area: f64,
    /// Mean power density (W/m²)
    pub mean_power_density: f64,
    /// Mean electrical power (kW)
    pub mean_power_kw: f64,
    /// Annual energy before derating (MWh/yr)
    pub aep_non_derated: f64,
    /// Annual energy after derating (MWh/yr)
    pub aep_derated: f64,
}

impl From<&SingleTurbineResult> for TurbineOutput {
    fn from(r: &SingleTurbineResult) -> Self {
        Self {
            rotor_area: *r.rotor_area(),
            mean_power_density: *r.mean_power_density(),
            mean_power_kw: *r.mean_power_kw(),
            aep_non_derated: *r.aep_non_derated(),
            aep_derated: *r.aep_derated(),
        }
    }
}

/// Site totals
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SiteOutput {
    /// Center-to-center spacing (m)
    pub spacing_meters: f64,
    /// Installable turbines
    pub turbine_count: u64,
    /// Total mean power (kW)
    pub total_mean_power_kw: f64,
    /// Total annual energy before derating (MWh/yr)
    pub total_aep_non_derated: f64,
    /// Total annual energy after derating (MWh/yr)
    pub total_aep_derated: f64,
}

impl From<&SiteResult> for SiteOutput {
    fn from(r: &SiteResult) -> Self {
        Self {
            spacing_meters: *r.spacing_meters(),
            turbine_count: r.turbine_count(),
            total_mean_power_kw: *r.total_mean_power_kw(),
            total_aep_non_derated: *r.total_aep_non_derated(),
            total_aep_derated: *r.total_aep_derated(),
        }
    }
}

/// Estimate one turbine.
///
/// Returns
/// - `Ok` - `out` holds the estimate
/// - `NullPointer` - any pointer argument is null
/// - `InvalidInput` - a value is out of range (see `wind_estimator_get_last_error`)
/// - `OutOfDomain` - the condition data cannot answer the request
///
/// `out` is left untouched on failure.
///
/// # Safety
/// - `ptr` must be null or a live handle from `wind_estimator_new` / `wind_estimator_from_config`.
/// - `input` must be null or point to a valid `TurbineInput`.
/// - `out` must be null or point to writable memory for one `TurbineOutput`.
#[no_mangle]
pub unsafe extern "C" fn wind_estimator_turbine(
    ptr: *const WindEstimator,
    input: *const TurbineInput,
    out: *mut TurbineOutput,
) -> WindEstimatorErrorCode {
    let Some(instance) = (unsafe { instance_from_ptr(ptr) }) else {
        return track_error(&DefaultWindEstimatorError::null_pointer("ptr"));
    };
    let Some(input) = (unsafe { input.as_ref() }) else {
        return track_error(&DefaultWindEstimatorError::null_pointer("input"));
    };
    if out.is_null() {
        return track_error(&DefaultWindEstimatorError::null_pointer("out"));
    }

    let result = instance
        .estimator
        .turbine(&TurbineSpec::from(input))
        .map_err(DefaultWindEstimatorError::from);
    match track_result(result) {
        Ok(single) => {
            unsafe {
                *out = TurbineOutput::from(&single);
            }
            WindEstimatorErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Estimate one turbine and the totals for a site of `area_km2`.
///
/// `spacing_factor` is in rotor diameters; NaN uses the handle's configured
/// default. Zero area is valid and yields zero turbines.
///
/// Returns the same codes as `wind_estimator_turbine`. Neither output is
/// written on failure.
///
/// # Safety
/// - `ptr` must be null or a live handle.
/// - `input` must be null or point to a valid `TurbineInput`.
/// - `out_turbine` and `out_site` must be null or point to writable memory.
#[no_mangle]
pub unsafe extern "C" fn wind_estimator_site(
    ptr: *const WindEstimator,
    input: *const TurbineInput,
    area_km2: f64,
    spacing_factor: f64,
    out_turbine: *mut TurbineOutput,
    out_site: *mut SiteOutput,
) -> WindEstimatorErrorCode {
    let Some(instance) = (unsafe { instance_from_ptr(ptr) }) else {
        return track_error(&DefaultWindEstimatorError::null_pointer("ptr"));
    };
    let Some(input) = (unsafe { input.as_ref() }) else {
        return track_error(&DefaultWindEstimatorError::null_pointer("input"));
    };
    if out_turbine.is_null() {
        return track_error(&DefaultWindEstimatorError::null_pointer("out_turbine"));
    }
    if out_site.is_null() {
        return track_error(&DefaultWindEstimatorError::null_pointer("out_site"));
    }

    let estimator = &instance.estimator;
    let mut site = estimator.site_spec(area_km2);
    if let Some(factor) = supplied(spacing_factor) {
        site = site.with_spacing_factor(factor);
    }

    let result = estimator
        .site(&TurbineSpec::from(input), &site)
        .map_err(DefaultWindEstimatorError::from);
    match track_result(result) {
        Ok((single, totals)) => {
            unsafe {
                *out_turbine = TurbineOutput::from(&single);
                *out_site = SiteOutput::from(&totals);
            }
            WindEstimatorErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Resolve hub-height air density (kg/m³) and mean wind speed (m/s) for a diameter.
///
/// Diameters outside the table are clamped to the nearest entry.
///
/// # Safety
/// - `ptr` must be null or a live handle.
/// - `out_air_density` and `out_mean_wind_speed` must be null or point to writable `f64`s.
#[no_mangle]
pub unsafe extern "C" fn wind_estimator_resolve(
    ptr: *const WindEstimator,
    diameter: f64,
    out_air_density: *mut f64,
    out_mean_wind_speed: *mut f64,
) -> WindEstimatorErrorCode {
    let Some(instance) = (unsafe { instance_from_ptr(ptr) }) else {
        return track_error(&DefaultWindEstimatorError::null_pointer("ptr"));
    };
    if out_air_density.is_null() {
        return track_error(&DefaultWindEstimatorError::null_pointer("out_air_density"));
    }
    if out_mean_wind_speed.is_null() {
        return track_error(&DefaultWindEstimatorError::null_pointer(
            "out_mean_wind_speed",
        ));
    }

    let result = instance
        .estimator
        .resolve(diameter)
        .map_err(DefaultWindEstimatorError::from);
    match track_result(result) {
        Ok(conditions) => {
            unsafe {
                *out_air_density = *conditions.air_density;
                *out_mean_wind_speed = *conditions.mean_wind_speed;
            }
            WindEstimatorErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Read the handle's default spacing factor (rotor diameters).
///
/// # Safety
/// - `ptr` must be null or a live handle.
/// - `out` must be null or point to a writable `f64`.
#[no_mangle]
pub unsafe extern "C" fn wind_estimator_default_spacing_factor(
    ptr: *const WindEstimator,
    out: *mut f64,
) -> WindEstimatorErrorCode {
    let Some(instance) = (unsafe { instance_from_ptr(ptr) }) else {
        return track_error(&DefaultWindEstimatorError::null_pointer("ptr"));
    };
    if out.is_null() {
        return track_error(&DefaultWindEstimatorError::null_pointer("out"));
    }

    clear_last_error();
    unsafe {
        *out = instance.estimator.spacing_factor();
    }
    WindEstimatorErrorCode::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{wind_estimator_get_last_error, wind_estimator_get_last_error_code};
    use crate::instance::{wind_estimator_destroy, wind_estimator_from_config, wind_estimator_new};
    use approx::assert_relative_eq;
    use std::ffi::{CStr, CString};
    use std::ptr;

    fn new_instance() -> *mut WindEstimator {
        let mut instance = ptr::null_mut();
        let code = unsafe { wind_estimator_new(&mut instance) };
        assert_eq!(code, WindEstimatorErrorCode::Ok);
        assert!(!instance.is_null());
        instance
    }

    fn last_error() -> String {
        let msg = wind_estimator_get_last_error();
        assert!(!msg.is_null());
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }

    #[test]
    fn test_turbine_textbook_example() {
        let est = new_instance();
        let input = TurbineInput {
            rotor_diameter: 100.0,
            air_density: 1.225,
            mean_wind_speed: 4.47,
            energy_pattern_factor: 1.91,
            efficiency: 0.2,
        };
        let mut out = TurbineOutput::default();
        let code = unsafe { wind_estimator_turbine(est, &input, &mut out) };

        assert_eq!(code, WindEstimatorErrorCode::Ok);
        assert_eq!(wind_estimator_get_last_error_code(), WindEstimatorErrorCode::Ok);
        assert!(wind_estimator_get_last_error().is_null());
        assert_relative_eq!(out.mean_power_kw, 820.64, max_relative = 1e-4);
        assert_relative_eq!(out.aep_derated, 0.2 * out.aep_non_derated, max_relative = 1e-12);

        unsafe { wind_estimator_destroy(est) };
    }

    #[test]
    fn test_site_nan_spacing_uses_default() {
        let est = new_instance();
        let input = TurbineInput::with_diameter(200.0);
        let mut turbine = TurbineOutput::default();
        let mut site = SiteOutput::default();
        let code = unsafe {
            wind_estimator_site(
                est,
                &input,
                100.0,
                f64::NAN,
                &mut turbine,
                &mut site,
            )
        };

        assert_eq!(code, WindEstimatorErrorCode::Ok);
        assert_eq!(site.turbine_count, 69);
        assert_relative_eq!(site.spacing_meters, 1196.0, max_relative = 1e-12);
        assert_relative_eq!(
            site.total_aep_derated,
            69.0 * turbine.aep_derated,
            max_relative = 1e-12
        );

        let mut default_factor = 0.0;
        let code = unsafe { wind_estimator_default_spacing_factor(est, &mut default_factor) };
        assert_eq!(code, WindEstimatorErrorCode::Ok);
        assert_eq!(default_factor, 5.98);

        unsafe { wind_estimator_destroy(est) };
    }

    #[test]
    fn test_invalid_input_sets_last_error() {
        let est = new_instance();
        let input = TurbineInput::with_diameter(0.0);
        let mut out = TurbineOutput::default();
        let code = unsafe { wind_estimator_turbine(est, &input, &mut out) };

        assert_eq!(code, WindEstimatorErrorCode::InvalidInput);
        assert_eq!(wind_estimator_get_last_error_code(), WindEstimatorErrorCode::InvalidInput);
        assert!(last_error().contains("rotor_diameter"));
        assert_eq!(out, TurbineOutput::default());

        let input = TurbineInput::with_diameter(100.0);
        let mut turbine = TurbineOutput::default();
        let mut site = SiteOutput::default();
        let code = unsafe {
            wind_estimator_site(est, &input, 10.0, -1.0, &mut turbine, &mut site)
        };
        assert_eq!(code, WindEstimatorErrorCode::InvalidInput);
        assert!(last_error().contains("spacing_factor"));

        unsafe { wind_estimator_destroy(est) };
    }

    #[test]
    fn test_null_pointers_rejected() {
        let input = TurbineInput::with_diameter(100.0);
        let mut out = TurbineOutput::default();
        let code = unsafe { wind_estimator_turbine(ptr::null(), &input, &mut out) };
        assert_eq!(code, WindEstimatorErrorCode::NullPointer);
        assert_eq!(last_error(), "Parameter 'ptr' cannot be null");

        let est = new_instance();
        let code = unsafe { wind_estimator_turbine(est, ptr::null(), &mut out) };
        assert_eq!(code, WindEstimatorErrorCode::NullPointer);

        let code = unsafe { wind_estimator_resolve(est, 150.0, ptr::null_mut(), ptr::null_mut()) };
        assert_eq!(code, WindEstimatorErrorCode::NullPointer);

        let code = unsafe { wind_estimator_new(ptr::null_mut()) };
        assert_eq!(code, WindEstimatorErrorCode::NullPointer);

        unsafe { wind_estimator_destroy(est) };
        unsafe { wind_estimator_destroy(ptr::null_mut()) };
    }

    #[test]
    fn test_resolve_clamps_and_interpolates() {
        let est = new_instance();
        let (mut rho, mut v) = (0.0, 0.0);

        let code = unsafe { wind_estimator_resolve(est, 125.0, &mut rho, &mut v) };
        assert_eq!(code, WindEstimatorErrorCode::Ok);
        assert_relative_eq!(rho, 0.9975, max_relative = 1e-12);
        assert_relative_eq!(v, 9.73, max_relative = 1e-12);

        let code = unsafe { wind_estimator_resolve(est, 40.0, &mut rho, &mut v) };
        assert_eq!(code, WindEstimatorErrorCode::Ok);
        assert_eq!(rho, 1.0);
        assert_eq!(v, 9.54);

        unsafe { wind_estimator_destroy(est) };
    }

    #[test]
    fn test_config_fallback_then_default_turbine() {
        let mut est = ptr::null_mut();
        let path = CString::new("/no/such/estimator.json").unwrap();
        let code = unsafe { wind_estimator_from_config(path.as_ptr(), &mut est) };
        assert_ne!(code, WindEstimatorErrorCode::Ok);
        assert!(!last_error().is_empty());

        let code = unsafe { wind_estimator_new(&mut est) };
        assert_eq!(code, WindEstimatorErrorCode::Ok);

        let input = TurbineInput::with_diameter(200.0);
        let mut out = TurbineOutput::default();
        let code = unsafe { wind_estimator_turbine(est, &input, &mut out) };
        assert_eq!(code, WindEstimatorErrorCode::Ok);
        assert_relative_eq!(out.aep_derated, 53615.04, max_relative = 1e-4);

        unsafe { wind_estimator_destroy(est) };
    }

    #[test]
    fn test_from_config_errors() {
        let mut instance = ptr::null_mut();
        let path = CString::new("/no/such/estimator.json").unwrap();
        let code = unsafe { wind_estimator_from_config(path.as_ptr(), &mut instance) };
        assert_eq!(code, WindEstimatorErrorCode::ConfigLoad);
        assert!(instance.is_null());

        let code = unsafe { wind_estimator_from_config(ptr::null(), &mut instance) };
        assert_eq!(code, WindEstimatorErrorCode::NullPointer);
        assert!(instance.is_null());
    }

    #[test]
    fn test_from_config_file() {
        let path = std::env::temp_dir().join(format!(
            "offshore-wind-ffi-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "spacing_factor": 10.0 }"#).unwrap();
        let c_path = CString::new(path.to_string_lossy().into_owned()).unwrap();

        let mut instance = ptr::null_mut();
        let code = unsafe { wind_estimator_from_config(c_path.as_ptr(), &mut instance) };
        std::fs::remove_file(&path).unwrap();
        assert_eq!(code, WindEstimatorErrorCode::Ok);

        let mut factor = 0.0;
        unsafe { wind_estimator_default_spacing_factor(instance, &mut factor) };
        assert_eq!(factor, 10.0);

        unsafe { wind_estimator_destroy(instance) };
    }
}
