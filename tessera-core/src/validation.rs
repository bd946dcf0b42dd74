use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Practical subset of RFC 5322, compiled once.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Validates an email address before it is sent to the core or mailed to.
///
/// ```rust
/// use tessera_core::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField("email".to_string()));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

pub fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::MissingField("userId".to_string()));
    }
    Ok(())
}
