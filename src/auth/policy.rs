//! Password strength policy

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Check whether a password is strong enough to be accepted at registration
///
/// A password is strong if it has at least [`MIN_PASSWORD_LENGTH`] characters,
/// at least one ASCII letter and at least one ASCII digit.
///
/// # Example
///
/// ```
/// use moneyflow_auth::auth::is_strong_password;
///
/// assert!(is_strong_password("abcdefg1"));
/// assert!(!is_strong_password("12345678"));
/// ```
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}
