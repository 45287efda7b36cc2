//! Numeric identifiers taken from path segments

use super::ValidationError;

/// Parse a path segment into a row id.
///
/// Blank input is `Missing`; anything that is not a positive integer
/// fitting in `INTEGER` is `NotNumeric`.
pub fn parse_id(field: &'static str, raw: &str) -> Result<i32, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }

    match trimmed.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::NotNumeric {
            field,
            value: trimmed.to_owned(),
        }),
    }
}
