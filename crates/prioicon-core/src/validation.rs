use crate::error::ValidationError;
use crate::priority::PriorityVisual;

/// Validator for priority visuals and override values.
pub struct Validator;

impl Validator {
    /// Validate a color value.
    /// Must be exactly `#` followed by six hex digits.
    pub fn validate_color(color: &str) -> Result<(), ValidationError> {
        let valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(ValidationError::InvalidColor(color.to_string()));
        }
        Ok(())
    }

    /// Validate a css class token.
    /// Must be non-empty, max 64 chars, start with a letter and only contain [a-zA-Z0-9_-].
    pub fn validate_css_class(class: &str) -> Result<(), ValidationError> {
        if class.is_empty() {
            return Err(ValidationError::InvalidCssClass(
                "css class cannot be empty".to_string(),
            ));
        }
        if class.len() > 64 {
            return Err(ValidationError::InvalidCssClass(format!(
                "css class too long: {} chars (max 64)",
                class.len()
            )));
        }
        if !class.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCssClass(format!(
                "css class must start with a letter: {}",
                class
            )));
        }
        if !class
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ValidationError::InvalidCssClass(format!(
                "css class contains invalid characters: {}",
                class
            )));
        }
        Ok(())
    }

    /// Validate a symbolic icon identifier such as `exclamation-triangle`.
    /// Lowercase ASCII words joined by single hyphens, max 64 chars.
    pub fn validate_icon_id(icon_id: &str) -> Result<(), ValidationError> {
        let well_formed = icon_id.len() <= 64
            && icon_id.split('-').all(|word| {
                !word.is_empty()
                    && word
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            });
        if !well_formed {
            return Err(ValidationError::InvalidIconId(icon_id.to_string()));
        }
        Ok(())
    }

    /// Validate a priority display name.
    /// Names are matched against trimmed text, so they must be non-empty and
    /// carry no leading or trailing whitespace.
    pub fn validate_name(name: &str) -> Result<(), ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::InvalidName(
                "name cannot be empty".to_string(),
            ));
        }
        if name.trim() != name {
            return Err(ValidationError::InvalidName(format!(
                "name has surrounding whitespace: {:?}",
                name
            )));
        }
        Ok(())
    }

    /// Validate a complete visual.
    pub fn validate_visual(visual: &PriorityVisual) -> Result<(), ValidationError> {
        Self::validate_name(&visual.name)?;
        Self::validate_color(&visual.color_hex)?;
        Self::validate_css_class(&visual.css_class)?;
        Self::validate_icon_id(&visual.icon_id)?;
        Ok(())
    }
}
