//! Common validation utilities.

use validator::ValidationError;

use crate::period::PeriodKey;

/// Validates that a percentage is within `0..=100`.
pub fn validate_percentage(value: f64) -> Result<(), ValidationError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("percentage_range");
        err.message = Some("Percentage must be between 0 and 100".into());
        Err(err)
    }
}

/// Validates that classification cut-offs are strictly descending.
///
/// Each band must be reachable, so `upper > middle > lower` is required.
pub fn validate_descending_bands(upper: f64, middle: f64, lower: f64) -> Result<(), ValidationError> {
    for value in [upper, middle, lower] {
        validate_percentage(value)?;
    }

    if upper > middle && middle > lower {
        Ok(())
    } else {
        let mut err = ValidationError::new("band_order");
        err.message = Some("Classification thresholds must be strictly descending".into());
        Err(err)
    }
}

/// Validates that a calendar range is not inverted.
pub fn validate_period_range(from: PeriodKey, to: PeriodKey) -> Result<(), ValidationError> {
    if from <= to {
        Ok(())
    } else {
        let mut err = ValidationError::new("period_range");
        err.message = Some("Period range start must not be after its end".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0.0).is_ok());
        assert!(validate_percentage(100.0).is_ok());
        assert!(validate_percentage(20.5).is_ok());
        assert!(validate_percentage(-0.1).is_err());
        assert!(validate_percentage(100.1).is_err());
    }

    #[test]
    fn test_validate_percentage_error_message() {
        let err = validate_percentage(120.0).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Percentage must be between 0 and 100"
        );
    }

    #[test]
    fn test_validate_descending_bands() {
        assert!(validate_descending_bands(80.0, 60.0, 40.0).is_ok());
        assert!(validate_descending_bands(80.0, 80.0, 40.0).is_err());
        assert!(validate_descending_bands(40.0, 60.0, 80.0).is_err());
        assert!(validate_descending_bands(180.0, 60.0, 40.0).is_err());
    }

    #[test]
    fn test_validate_descending_bands_error_code() {
        let err = validate_descending_bands(60.0, 70.0, 40.0).unwrap_err();
        assert_eq!(err.code, "band_order");
    }

    #[test]
    fn test_validate_period_range() {
        let jan: PeriodKey = "2024-01".parse().unwrap();
        let mar: PeriodKey = "2024-03".parse().unwrap();
        assert!(validate_period_range(jan, mar).is_ok());
        assert!(validate_period_range(jan, jan).is_ok());
        assert!(validate_period_range(mar, jan).is_err());
    }
}
