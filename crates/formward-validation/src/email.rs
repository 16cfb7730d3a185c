//! Email validation functions

/// Validates the shape of an email address.
///
/// Accepts `local@domain.tld` where:
/// - there is exactly one `@`
/// - the local part is 1..=64 chars of alphanumerics or `._-+`
/// - the domain has at least one dot, no empty labels, and no label
///   starting or ending with a hyphen
/// - the top level label is at least 2 chars
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if domain.contains('@') {
        return false;
    }

    if local.is_empty() || local.len() > 64 {
        return false;
    }

    let local_ok = local
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'));
    if !local_ok {
        return false;
    }

    if domain.is_empty() || domain.len() > 255 {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    for label in &labels {
        if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return false;
        }
    }

    labels.last().map(|tld| tld.chars().count() >= 2).unwrap_or(false)
}

/// Lower-cased domain part of an address, if it has one.
pub fn email_domain(email: &str) -> Option<String> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase())
        .filter(|domain| !domain.is_empty())
}

/// Normalizes an address for comparisons (trimmed, lower-cased).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
