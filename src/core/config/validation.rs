//! Generic field-level validation helpers shared by config construction
//! sites (resource limits, weight table sanity checks, …).

use crate::core::errors::{PipelineError, Result};

/// Validates that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(PipelineError::config_field(
            format!("{field} must be greater than 0"),
            field,
        ));
    }
    Ok(())
}

/// Validates that a u64 value is greater than zero.
pub fn validate_positive_u64(value: u64, field: &str) -> Result<()> {
    if value == 0 {
        return Err(PipelineError::config_field(
            format!("{field} must be greater than 0"),
            field,
        ));
    }
    Ok(())
}

/// Validates that an f64 value is greater than zero.
pub fn validate_positive_f64(value: f64, field: &str) -> Result<()> {
    if value <= 0.0 {
        return Err(PipelineError::config_field(
            format!("{field} must be greater than 0.0"),
            field,
        ));
    }
    Ok(())
}

/// Validates that an f64 value is non-negative.
pub fn validate_non_negative(value: f64, field: &str) -> Result<()> {
    if value < 0.0 {
        return Err(PipelineError::config_field(
            format!("{field} must be non-negative"),
            field,
        ));
    }
    Ok(())
}

/// Validates that an f64 value is in the unit range `[0.0, 1.0]`.
pub fn validate_unit_range(value: f64, field: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PipelineError::config_field(
            format!("{field} must be between 0.0 and 1.0"),
            field,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_usize() {
        assert!(validate_positive_usize(0, "phase_timeout_ms").is_err());
        assert!(validate_positive_usize(1, "phase_timeout_ms").is_ok());
    }

    #[test]
    fn rejects_out_of_range_unit() {
        assert!(validate_unit_range(1.5, "completeness").is_err());
        assert!(validate_unit_range(0.5, "completeness").is_ok());
    }
}
