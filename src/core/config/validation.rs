//! Validation helper functions for configuration types.

use crate::core::errors::{Result, TaxonError};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(TaxonError::Validation {
            message: format!("{} must be greater than 0", field),
            field: Some(field.to_string()),
        });
    }
    Ok(())
}

/// Validate that a u64 value is greater than zero.
pub fn validate_positive_u64(value: u64, field: &str) -> Result<()> {
    if value == 0 {
        return Err(TaxonError::Validation {
            message: format!("{} must be greater than 0", field),
            field: Some(field.to_string()),
        });
    }
    Ok(())
}

/// Validate that an f32 value is within an inclusive range.
pub fn validate_range_f32(value: f32, min: f32, max: f32, field: &str) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(TaxonError::Validation {
            message: format!("{} must be between {} and {}", field, min, max),
            field: Some(field.to_string()),
        });
    }
    Ok(())
}

/// Validate that a string value is not blank.
pub fn validate_not_blank(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TaxonError::Validation {
            message: format!("{} must not be empty", field),
            field: Some(field.to_string()),
        });
    }
    Ok(())
}

/// Validate that no two entries of a list collide, comparing case-insensitively.
pub fn validate_unique_ci<'a>(values: impl IntoIterator<Item = &'a str>, field: &str) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for value in values {
        if !seen.insert(value.to_ascii_lowercase()) {
            return Err(TaxonError::Validation {
                message: format!("{} contains duplicate entry '{}'", field, value),
                field: Some(field.to_string()),
            });
        }
    }
    Ok(())
}
