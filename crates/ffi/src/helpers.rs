use crate::error::{with_last_error_mut, WindEstimatorError, WindEstimatorErrorCode};
use crate::instance::WindEstimator;
use std::ffi::CString;
use tracing::debug;

/// Set the thread-local error message and code.
/// Accepts any type implementing `WindEstimatorError`.
pub(crate) fn set_last_error(error: &impl WindEstimatorError) {
    debug!(code = ?error.code(), msg = error.msg(), "ffi call failed");
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl WindEstimatorError) -> WindEstimatorErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result, or clear the last error on success.
pub(crate) fn track_result<T, E>(result: Result<T, E>) -> Result<T, WindEstimatorErrorCode>
where
    E: WindEstimatorError,
{
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = WindEstimatorErrorCode::Ok;
    });
}

/// Borrow the instance behind an FFI pointer, or `None` if it is null.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by `wind_estimator_new` /
/// `wind_estimator_from_config`.
pub(crate) unsafe fn instance_from_ptr<'a>(ptr: *const WindEstimator) -> Option<&'a WindEstimator> {
    // SAFETY: caller guarantees the pointer is null or valid for `'a`.
    unsafe { ptr.as_ref() }
}
