//! Input validation utilities
//!
//! Common checks for pipeline and command-line parameters with consistent
//! error messages. All functions return [`TurnstileError::InvalidParameter`]
//! on failure.

use crate::errors::{Result, TurnstileError};
use std::fmt::Display;

/// Validate that a value is positive (> 0)
///
/// # Arguments
/// * `value` - Value to validate
/// * `name` - Name of the parameter for error messages
///
/// # Errors
/// Returns an error if the value is not positive
///
/// # Example
/// ```
/// use turnstile_lib::validation::validate_positive;
///
/// validate_positive(10, "items").unwrap();
///
/// let result = validate_positive(0, "items");
/// assert!(result.is_err());
/// ```
#[allow(clippy::needless_pass_by_value)]
pub fn validate_positive<T: Ord + Display + Default>(value: T, name: &str) -> Result<()> {
    if value <= T::default() {
        return Err(TurnstileError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("Must be positive (> 0), got: {value}"),
        });
    }
    Ok(())
}

/// Validate that a list is non-empty and that every entry is positive
///
/// # Arguments
/// * `values` - Values to validate
/// * `name` - Name of the parameter for error messages
///
/// # Errors
/// Returns an error naming the first offending position
///
/// # Example
/// ```
/// use turnstile_lib::validation::validate_all_positive;
///
/// validate_all_positive(&[2, 3, 1], "workers").unwrap();
/// assert!(validate_all_positive(&[2, 0, 1], "workers").is_err());
/// assert!(validate_all_positive::<usize>(&[], "workers").is_err());
/// ```
pub fn validate_all_positive<T: Ord + Display + Default + Copy>(
    values: &[T],
    name: &str,
) -> Result<()> {
    if values.is_empty() {
        return Err(TurnstileError::InvalidParameter {
            parameter: name.to_string(),
            reason: "At least one value is required".to_string(),
        });
    }
    for (index, &value) in values.iter().enumerate() {
        validate_positive(value, &format!("{name}[{index}]"))?;
    }
    Ok(())
}
