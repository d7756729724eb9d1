//! Error taxonomy for the estimator
//!
//! Two kinds of failure exist:
//! - [`EstimateError::InvalidInput`]: a caller supplied a physically meaningless
//!   parameter. The offending field is always named and the value is never
//!   corrected behind the caller's back.
//! - [`EstimateError::OutOfDomain`]: the condition table is empty or
//!   misconfigured. This is a data fault, not a user fault.
//!
//! Configuration loading adds I/O and parse failures. Clamping a diameter to
//! the tabulated range is documented behavior and never an error.

/// Result alias used throughout the crate
pub type Result<T, E = EstimateError> = std::result::Result<T, E>;

/// Errors returned by estimator operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    /// A physical parameter is outside its valid range
    #[error("invalid input `{field}` = {value}: {reason}")]
    InvalidInput {
        /// Name of the offending field (e.g. `"rotor_diameter"`)
        field: &'static str,
        /// The rejected value
        value: f64,
        /// Constraint that was violated
        reason: &'static str,
    },

    /// The condition table cannot answer lookups
    #[error("condition data out of domain: {0}")]
    OutOfDomain(String),

    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    ConfigIo(String),

    /// Configuration file could not be parsed or failed validation
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),
}

impl EstimateError {
    /// Build an `InvalidInput` error
    pub fn invalid_input(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidInput {
            field,
            value,
            reason,
        }
    }

    /// Name of the rejected field, if this is an input error
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// True for caller-side parameter errors
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// True for condition-table faults ("data not ready")
    pub fn is_out_of_domain(&self) -> bool {
        matches!(self, Self::OutOfDomain(_))
    }
}

// ============================================================================
// VALIDATION HELPERS
// ============================================================================
// NaN and infinities are rejected everywhere; none of the inputs has a
// meaningful non-finite value.

/// Require `value > 0` and finite
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(EstimateError::invalid_input(field, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(EstimateError::invalid_input(
            field,
            value,
            "must be greater than zero",
        ));
    }
    Ok(value)
}

/// Require `value >= 0` and finite
pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(EstimateError::invalid_input(field, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(EstimateError::invalid_input(
            field,
            value,
            "must not be negative",
        ));
    }
    Ok(value)
}

/// Require `0 <= value <= 1`
pub(crate) fn require_fraction(field: &'static str, value: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        return Err(EstimateError::invalid_input(
            field,
            value,
            "must be between 0 and 1",
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_rejects_zero_negative_and_nan() {
        assert!(require_positive("d", 0.0).is_err());
        assert!(require_positive("d", -1.0).is_err());
        assert!(require_positive("d", f64::NAN).is_err());
        assert!(require_positive("d", f64::INFINITY).is_err());
        assert_eq!(require_positive("d", 0.5), Ok(0.5));
    }

    #[test]
    fn test_non_negative_accepts_zero() {
        assert_eq!(require_non_negative("v", 0.0), Ok(0.0));
        assert!(require_non_negative("v", -0.1).is_err());
    }

    #[test]
    fn test_fraction_bounds_inclusive() {
        assert_eq!(require_fraction("eta", 0.0), Ok(0.0));
        assert_eq!(require_fraction("eta", 1.0), Ok(1.0));
        assert!(require_fraction("eta", 1.5).is_err());
        assert!(require_fraction("eta", -0.01).is_err());
        assert!(require_fraction("eta", f64::NAN).is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = require_positive("rotor_diameter", -5.0).unwrap_err();
        assert_eq!(err.field(), Some("rotor_diameter"));
        assert!(err.is_invalid_input());
        assert!(!err.is_out_of_domain());
        assert_eq!(
            err.to_string(),
            "invalid input `rotor_diameter` = -5: must be greater than zero"
        );
    }
}
