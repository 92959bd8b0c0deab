use validator::{Validate, ValidateEmail};

use crate::errors::ValidationError;

/// Champ obligatoire: absent, vide ou seulement des espaces => MissingField
pub fn required<'a>(value: &'a Option<String>, label: &'static str) -> Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(label)),
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.to_string();
    if email.contains(char::is_whitespace) || !email.validate_email() {
        return Err(ValidationError::InvalidFormat(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

/// Longueur minimale, comptée en caractères
pub fn validate_password(password: &str, min_length: usize) -> Result<(), ValidationError> {
    if password.chars().count() < min_length {
        return Err(ValidationError::PolicyViolation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}

/// Lance les règles `#[validate(...)]` d'un DTO et garde le premier message
pub fn validate_request<T: Validate>(request: &T) -> Result<(), ValidationError> {
    match request.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "Invalid request".to_string());
            Err(ValidationError::InvalidFormat(message))
        }
    }
}
