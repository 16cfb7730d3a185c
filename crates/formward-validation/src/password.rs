//! Password strength validation

/// Password strength levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    /// 6+ characters
    Basic,
    /// 8+ chars with uppercase, lowercase, and digit
    Medium,
    /// Medium plus at least one special character
    Strong,
}

impl PasswordStrength {
    /// Parse a strength name. Unknown names fall back to `Medium`.
    ///
    /// ```
    /// use formward_validation::PasswordStrength;
    /// assert_eq!(PasswordStrength::parse("strong"), PasswordStrength::Strong);
    /// assert_eq!(PasswordStrength::parse("whatever"), PasswordStrength::Medium);
    /// ```
    pub fn parse(name: &str) -> Self {
        match name {
            "basic" => PasswordStrength::Basic,
            "strong" => PasswordStrength::Strong,
            _ => PasswordStrength::Medium,
        }
    }
}

const SPECIAL_CHARS: &[char] = &[
    '@', '$', '!', '%', '*', '?', '&', '#', '-', '_', '+', '=', '.', ',',
];

/// Checks a password against a strength level, returning the first unmet
/// requirement as a message.
pub fn check_password(password: &str, strength: PasswordStrength) -> Result<(), String> {
    let len = password.chars().count();

    if strength == PasswordStrength::Basic {
        return if len >= 6 {
            Ok(())
        } else {
            Err("Password must be at least 6 characters".to_string())
        };
    }

    if len < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(char::is_lowercase) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    if strength == PasswordStrength::Strong && !password.contains(SPECIAL_CHARS) {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

/// Default rule used by forms: medium strength.
pub fn is_acceptable_password(password: &str) -> bool {
    check_password(password, PasswordStrength::Medium).is_ok()
}
