//! Input checks shared by the minting and registration paths.

use once_cell::sync::Lazy;
use regex::Regex;

/// The only scheme a long URL may use.
pub const SECURE_SCHEME_PREFIX: &str = "https://";

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn has_secure_scheme(url: &str) -> bool {
    url.starts_with(SECURE_SCHEME_PREFIX)
}

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Login identities containing `@` are looked up by email.
pub fn looks_like_email(identity: &str) -> bool {
    identity.contains('@')
}

/// Returns the caller-facing reason a registration form is rejected.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), &'static str> {
    if username.trim().is_empty() || email.trim().is_empty() {
        return Err("username and email required");
    }
    if !is_valid_email(email) {
        return Err("Invalid email format");
    }
    if password.is_empty() {
        return Err("password is required");
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}
