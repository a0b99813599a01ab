//! Registration form rules, checked before anything is sent.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use std::sync::LazyLock;

use regex::Regex;

/// Compiled once; a bad literal panics on first use instead of rejecting
/// every address.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is a valid regex"));

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Contents of the registration form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Every rule the form breaks, in display order. Empty means valid.
pub fn validate_registration(form: &RegistrationForm) -> Vec<String> {
    let mut errors = Vec::new();
    if form.username.chars().count() < MIN_USERNAME_CHARS {
        errors.push("Username must be at least 3 characters".to_owned());
    }
    if !looks_like_email(&form.email) {
        errors.push("Please enter a valid email".to_owned());
    }
    if form.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push("Password must be at least 6 characters".to_owned());
    }
    if form.password != form.confirm_password {
        errors.push("Passwords do not match".to_owned());
    }
    errors
}

/// Loose shape check: something, `@`, something, `.`, something.
pub fn looks_like_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
