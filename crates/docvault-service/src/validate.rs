use regex::Regex;

use crate::error::InputError;

const LOGIN_PATTERN: &str = r"^[A-Za-z0-9]{8,}$";
const MIN_PASSWORD_BYTES: usize = 8;

/// Login and password rules, compiled once and shared read-only.
///
/// A login is at least 8 ASCII letters or digits. A password is at least 8
/// bytes long (UTF-8) and contains an upper-case letter, a lower-case letter, a digit
/// and a symbol (anything that is not an ASCII letter or digit).
#[derive(Clone, Debug)]
pub struct CredentialValidator {
    login: Regex,
}

impl CredentialValidator {
    pub fn new() -> Self {
        Self {
            login: Regex::new(LOGIN_PATTERN).expect("login pattern compiles"),
        }
    }

    pub fn validate_login(&self, login: &str) -> Result<(), InputError> {
        if self.login.is_match(login) {
            Ok(())
        } else {
            Err(InputError::InvalidLogin)
        }
    }

    pub fn validate_password(&self, password: &str) -> Result<(), InputError> {
        let long_enough = password.len() >= MIN_PASSWORD_BYTES;
        let upper = password.chars().any(|c| c.is_ascii_uppercase());
        let lower = password.chars().any(|c| c.is_ascii_lowercase());
        let digit = password.chars().any(|c| c.is_ascii_digit());
        let symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());
        if long_enough && upper && lower && digit && symbol {
            Ok(())
        } else {
            Err(InputError::WeakPassword)
        }
    }
}

impl Default for CredentialValidator {
    fn default() -> Self {
        Self::new()
    }
}
