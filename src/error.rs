//! Flight-specific error types.
//!
//! The controller itself never fails: degenerate inputs are substituted, not
//! reported.  These errors belong to the surfaces around it: loading and
//! validating configuration, and parsing replay scripts.
//!
//! ## Usage
//!
//! ```rust
//! use ship_flight::error::{validate_positive, FlightResult};
//!
//! fn check(dash_duration: f32) -> FlightResult<()> {
//!     validate_positive("dash_duration", dash_duration)?;
//!     Ok(())
//! }
//! # assert!(check(0.3).is_ok());
//! ```

use std::fmt;

/// Top-level error enum for the flight crate.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightError {
    /// A tunable is outside its safe operating range.
    UnsafeConstant {
        /// Name of the tunable (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// A configuration file could not be parsed.
    ConfigParse {
        /// Where the text came from (a path, or `"<inline>"`).
        path: String,
        /// Parser message.
        message: String,
    },

    /// A replay script could not be parsed.
    ScriptParse {
        /// Parser message.
        message: String,
    },

    /// No built-in replay scenario has this name.
    UnknownScenario {
        /// The requested name.
        name: String,
    },
}

impl fmt::Display for FlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "tunable '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            FlightError::ConfigParse { path, message } => {
                write!(f, "failed to parse flight config {}: {}", path, message)
            }
            FlightError::ScriptParse { message } => {
                write!(f, "failed to parse replay script: {}", message)
            }
            FlightError::UnknownScenario { name } => {
                write!(f, "unknown replay scenario '{}'", name)
            }
        }
    }
}

impl std::error::Error for FlightError {}

/// Convenience alias: a `Result` using `FlightError` as the error type.
pub type FlightResult<T> = Result<T, FlightError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> FlightResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FlightError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` is finite and not negative.
pub fn validate_non_negative(name: &'static str, value: f32) -> FlightResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FlightError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` lies in `[0, 1]`.
pub fn validate_unit_interval(name: &'static str, value: f32) -> FlightResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FlightError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(validate_positive("x", 1.0).is_ok());
        assert!(validate_positive("x", 0.0).is_err());
        assert!(validate_positive("x", f32::NAN).is_err());
        assert!(validate_positive("x", f32::INFINITY).is_err());
    }

    #[test]
    fn unit_interval_bounds_are_inclusive() {
        assert!(validate_unit_interval("drag", 0.0).is_ok());
        assert!(validate_unit_interval("drag", 1.0).is_ok());
        assert!(validate_unit_interval("drag", 1.01).is_err());
    }

    #[test]
    fn display_names_the_offending_tunable() {
        let err = validate_non_negative("collision_cooldown", -1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "tunable 'collision_cooldown' = -1 is outside safe range [0.0, ∞)"
        );
    }
}
