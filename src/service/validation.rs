//! Request body field rules.

use crate::error::AppError;

pub const MAX_TEXT_LENGTH: usize = 255;

pub struct RequestValidator;

impl RequestValidator {
    /// A required text field: not blank and at most `MAX_TEXT_LENGTH` characters.
    pub fn required_text(field: &str, value: &str) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} must not be blank", field)));
        }
        let len = value.chars().count();
        if len > MAX_TEXT_LENGTH {
            return Err(AppError::Validation(format!(
                "{} must be at most {} characters",
                field, MAX_TEXT_LENGTH
            )));
        }
        Ok(())
    }

    /// Same rule as `required_text`, applied only when the field was sent.
    pub fn optional_text(field: &str, value: Option<&str>) -> Result<(), AppError> {
        match value {
            Some(v) => Self::required_text(field, v),
            None => Ok(()),
        }
    }
}
