//! Registration and profile field validation.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    // Local part, one @, domain with at least one dot. Deliberately loose;
    // the unique constraint and a confirmation flow are the real guards.
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

/// Validate an email address shape.
pub fn validate_email(email: &str) -> Result<()> {
    if email.len() < 5 || email.len() > 254 {
        anyhow::bail!("email must be between 5 and 254 characters");
    }
    if !EMAIL_RE.is_match(email) {
        anyhow::bail!("email address is not valid");
    }
    Ok(())
}

/// Validate a username: 3-50 characters, letters, digits, underscores and
/// hyphens only.
pub fn validate_username(username: &str) -> Result<()> {
    if username.len() < 3 {
        anyhow::bail!("username must be at least 3 characters long");
    }
    if username.len() > 50 {
        anyhow::bail!("username is too long");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        anyhow::bail!("username can only contain letters, numbers, underscores, and hyphens");
    }
    Ok(())
}

/// Validate password length bounds.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 6 {
        anyhow::bail!("password must be at least 6 characters long");
    }
    if password.len() > 128 {
        anyhow::bail!("password is too long");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("reader@example.com").is_ok());
        assert!(validate_email("a.b+c@mail.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
        assert!(validate_email("user@example.com ").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("bookworm").is_ok());
        assert!(validate_username("page_turner-42").is_ok());

        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
        assert!(validate_username("spaces here").is_err());
        assert!(validate_username("emoji📚").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password(&"p".repeat(128)).is_ok());

        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }
}
