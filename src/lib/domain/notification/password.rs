//! SMTP password

use std::fmt;

/// An SMTP password that never shows up in logs or diagnostics
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wrap a raw password
    pub fn new(raw: &str) -> Self {
        Self(raw.to_string())
    }

    /// Get the password as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_display_obfuscates() {
        let password = Password::new("correcthorsebatterystaple");
        assert_eq!(format!("{}", password), "********");
    }

    #[test]
    fn test_password_debug_obfuscates() {
        let password = Password::new("correcthorsebatterystaple");
        assert_eq!(format!("{:?}", password), "********");
    }

    #[test]
    fn test_get_password_as_str() {
        let password = Password::new("correcthorsebatterystaple");
        assert_eq!(password.as_str(), "correcthorsebatterystaple");
    }
}
