use offshore_wind_core::{Estimator, EstimatorConfig};
use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;
use tracing::info;

use crate::error::{DefaultWindEstimatorError, WindEstimatorErrorCode};
use crate::helpers::{clear_last_error, track_error, track_result};

/// Opaque estimator handle.
///
/// Holds the condition table, constants, spacing factor and packing layout.
/// Every query takes `*const WindEstimator`, nothing mutates the handle after
/// creation, so one handle may be shared by any number of host threads.
///
/// # Example
/// ```c
/// WindEstimator *est = NULL;
/// if (wind_estimator_from_config("estimator.json", &est) != 0) {
///     fprintf(stderr, "config: %s\n", wind_estimator_get_last_error());
///     wind_estimator_new(&est);
/// }
///
/// TurbineInput input = { .rotor_diameter = 200.0, .air_density = NAN,
///                        .mean_wind_speed = NAN, .energy_pattern_factor = NAN,
///                        .efficiency = NAN };
/// TurbineOutput out;
/// if (wind_estimator_turbine(est, &input, &out) == 0) {
///     printf("derated AEP: %.1f MWh/yr\n", out.aep_derated);
/// }
///
/// wind_estimator_destroy(est);
/// ```
pub struct WindEstimator {
    pub(crate) estimator: Estimator,
}

impl WindEstimator {
    pub(crate) fn with_defaults() -> Self {
        Self {
            estimator: Estimator::default(),
        }
    }

    /// Load an estimator from a JSON configuration file.
    ///
    /// # Errors
    /// `ConfigLoad` if the file cannot be read or parsed, `InvalidInput` /
    /// `OutOfDomain` if it holds invalid values, `InvalidParameter` if the
    /// path is not UTF-8.
    pub(crate) fn from_config_path(path: &CStr) -> Result<Self, DefaultWindEstimatorError> {
        let path = path.to_str().map_err(|e| {
            DefaultWindEstimatorError::invalid_parameter(format!("config path is not UTF-8: {e}"))
        })?;
        let config = EstimatorConfig::load(path)?;
        let estimator = Estimator::from_config(&config)?;
        info!(path, "created wind estimator from configuration");
        Ok(Self { estimator })
    }
}

/// Create an estimator with the literature dataset and default constants.
///
/// Returns
/// - `WindEstimatorErrorCode::Ok` (0) - success, `out_instance` holds a valid pointer
/// - `WindEstimatorErrorCode::NullPointer` - `out_instance` is null
///
/// # Safety
/// - `out_instance` must be null or a valid pointer to writable memory.
/// - The caller owns the returned instance and MUST call `wind_estimator_destroy`
///   exactly once.
#[no_mangle]
pub unsafe extern "C" fn wind_estimator_new(
    out_instance: *mut *mut WindEstimator,
) -> WindEstimatorErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWindEstimatorError::null_pointer("out_instance"));
    }

    clear_last_error();
    unsafe {
        *out_instance = Box::into_raw(Box::new(WindEstimator::with_defaults()));
    }
    WindEstimatorErrorCode::Ok
}

/// Create an estimator from a JSON configuration file.
///
/// This function follows standard C error handling conventions:
/// - Returns `WindEstimatorErrorCode::Ok` (0) on success with a valid instance in `out_instance`
/// - Returns non-zero error code on failure with `out_instance` set to null
///
/// Returns
/// - `NullPointer` - `path` or `out_instance` is null
/// - `InvalidParameter` - `path` is not valid UTF-8
/// - `ConfigLoad` - the file cannot be read or is not valid JSON
/// - `InvalidInput` / `OutOfDomain` - the file holds out-of-range values
///
/// Call `wind_estimator_get_last_error()` for a human-readable description.
///
/// # Safety
/// - `path` must be null or a valid null-terminated C string.
/// - `out_instance` must be null or a valid pointer to writable memory.
/// - The caller owns the returned instance and MUST call `wind_estimator_destroy`
///   exactly once.
#[no_mangle]
pub unsafe extern "C" fn wind_estimator_from_config(
    path: *const c_char,
    out_instance: *mut *mut WindEstimator,
) -> WindEstimatorErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultWindEstimatorError::null_pointer("out_instance"));
    }
    if path.is_null() {
        unsafe {
            *out_instance = ptr::null_mut();
        }
        return track_error(&DefaultWindEstimatorError::null_pointer("path"));
    }

    // SAFETY: non-null and null-terminated per the contract above.
    let path = unsafe { CStr::from_ptr(path) };
    match track_result(WindEstimator::from_config_path(path)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(Box::new(instance));
            }
            WindEstimatorErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                // Set to null on error (per documentation contract)
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroy an estimator created by `wind_estimator_new` or `wind_estimator_from_config`.
///
/// Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by one of the constructors above.
/// - The pointer MUST NOT have been freed already. Using it afterwards is
///   undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn wind_estimator_destroy(ptr: *mut WindEstimator) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in a constructor and not yet freed.
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
