use offshore_wind_core::EstimateError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// - `code()` - the error code passed across the FFI boundary
/// - `msg()` - the message stored for `wind_estimator_get_last_error`
///
/// # Example
/// ```rust,ignore
/// let err = DefaultWindEstimatorError::null_pointer("ptr");
/// assert_eq!(err.code(), WindEstimatorErrorCode::NullPointer);
/// assert_eq!(err.msg(), "Parameter 'ptr' cannot be null");
/// ```
pub(crate) trait WindEstimatorError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> WindEstimatorErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `WindEstimatorError`.
///
/// Wraps a `WindEstimatorErrorCode` with a message. Core errors convert into it
/// through `From<EstimateError>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultWindEstimatorError {
    code: WindEstimatorErrorCode,
    msg: String,
}

impl DefaultWindEstimatorError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: WindEstimatorErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for a parameter that cannot be used as given (e.g. a non UTF-8 path).
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: WindEstimatorErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<EstimateError> for DefaultWindEstimatorError {
    fn from(error: EstimateError) -> Self {
        let code = match error {
            EstimateError::InvalidInput { .. } => WindEstimatorErrorCode::InvalidInput,
            EstimateError::OutOfDomain(_) => WindEstimatorErrorCode::OutOfDomain,
            EstimateError::ConfigIo(_) | EstimateError::ConfigParse(_) => {
                WindEstimatorErrorCode::ConfigLoad
            }
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl WindEstimatorError for DefaultWindEstimatorError {
    fn code(&self) -> WindEstimatorErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by wind estimator functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindEstimatorErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// A numeric input is outside its valid range (diameter, efficiency, area...).
    InvalidInput = 2,

    /// The condition data cannot answer the request (e.g. empty table).
    OutOfDomain = 3,

    /// The configuration file could not be read, parsed or validated.
    ConfigLoad = 4,

    /// Invalid parameter passed to function.
    InvalidParameter = 5,
}

impl From<DefaultWindEstimatorError> for WindEstimatorErrorCode {
    fn from(error: DefaultWindEstimatorError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The `CString` lives here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, WindEstimatorErrorCode)> =
        const { RefCell::new((None, WindEstimatorErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, WindEstimatorErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, WindEstimatorErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded.
///
/// # Thread Safety
/// Error state is per-thread. Each thread sees only its own failures.
///
/// # Lifetime
/// The returned pointer is valid until the next `wind_estimator_*` call on this
/// thread. **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// TurbineOutput out;
/// WindEstimatorErrorCode err = wind_estimator_turbine(est, &input, &out);
/// if (err != WindEstimatorErrorCode::Ok) {
///     const char* error = wind_estimator_get_last_error();
///     if (error) {
///         printf("Estimate failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn wind_estimator_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `WindEstimatorErrorCode::Ok` (0) if the last call on this thread
/// succeeded, otherwise the code that call returned.
#[no_mangle]
pub extern "C" fn wind_estimator_get_last_error_code() -> WindEstimatorErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
