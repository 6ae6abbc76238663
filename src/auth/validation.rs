//! Input checks that run before any backend call

use regex::Regex;
use std::sync::LazyLock;

use crate::auth::FlowError;
use crate::models::{SignInRequest, SignUpRequest};

pub const MIN_PASSWORD_LENGTH: usize = 6;

// Loose `local@domain.tld` shape; the backend owns real validation
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// # Errors
///
/// Returns [`FlowError::Validation`] when email or password is missing or the
/// email is malformed.
pub fn validate_sign_in(request: &SignInRequest) -> Result<(), FlowError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(invalid("Email and password are required"));
    }
    validate_email(&request.email)
}

/// # Errors
///
/// Returns [`FlowError::Validation`] describing the first failed check.
pub fn validate_sign_up(request: &SignUpRequest) -> Result<(), FlowError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(invalid("Name, email, and password are required"));
    }
    validate_email(&request.email)?;
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(invalid("Password must be at least 6 characters long"));
    }
    if let Some(confirm) = &request.confirm_password {
        if confirm != &request.password {
            return Err(invalid("Passwords do not match"));
        }
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), FlowError> {
    if EMAIL_PATTERN.is_match(email.trim()) {
        Ok(())
    } else {
        Err(invalid("Please enter a valid email address"))
    }
}

fn invalid(message: &str) -> FlowError {
    FlowError::Validation(message.to_string())
}
