//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_COLOR_LENGTH: usize = 32;

/// Validates that a colour is a palette-style slug: lowercase ASCII letters, digits and hyphens.
///
/// # Examples
///
/// ```ignore
/// validate_color_name("warm-yellow") // Ok
/// validate_color_name("Warm Yellow") // Err - uppercase and space
/// validate_color_name("")            // Err - empty
/// ```
pub fn validate_color_name(color: &str) -> Result<(), ValidationError> {
    if color.is_empty() || color.len() > MAX_COLOR_LENGTH {
        let mut err = ValidationError::new("color_length");
        err.message = Some(
            format!(
                "Color must be between 1 and {MAX_COLOR_LENGTH} characters (got {})",
                color.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !color
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        let mut err = ValidationError::new("color_format");
        err.message =
            Some("Color must contain only lowercase letters, digits and hyphens".into());
        return Err(err);
    }

    Ok(())
}
