//! C ABI for the offshore wind estimator
//!
//! Exposes an opaque [`WindEstimator`] handle plus plain `#[repr(C)]` input
//! and output structs so UI and host-application collaborators can request
//! single-turbine and site estimates without linking Rust. Every function
//! returns a [`WindEstimatorErrorCode`]; on failure a message is stored per
//! thread and can be read with `wind_estimator_get_last_error()`.
//!
//! The C header `OffshoreWindFFI.h` is generated by `build.rs` (cbindgen).

mod error;
mod helpers;
mod instance;
mod queries;

pub use error::{
    wind_estimator_get_last_error, wind_estimator_get_last_error_code, WindEstimatorErrorCode,
};
pub use instance::{
    wind_estimator_destroy, wind_estimator_from_config, wind_estimator_new, WindEstimator,
};
pub use queries::{
    wind_estimator_default_spacing_factor, wind_estimator_resolve, wind_estimator_site,
    wind_estimator_turbine, SiteOutput, TurbineInput, TurbineOutput,
};
