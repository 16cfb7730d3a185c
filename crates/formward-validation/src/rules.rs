//! Named validation rules and their failure messages
//!
//! A [`RuleBook`] pairs a map of rule name to [`Predicate`] with a map of
//! rule name to message. Built-in entries cover `email`, `phone` and
//! `password`; caller-supplied entries with the same name replace them.
//! The merge happens once, when the book is built.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::email::is_valid_email;
use crate::password::is_acceptable_password;
use crate::phone::PHONE_RE;

pub const RULE_EMAIL: &str = "email";
pub const RULE_PHONE: &str = "phone";
pub const RULE_PASSWORD: &str = "password";

/// Message-only keys (not predicates).
pub const MSG_REQUIRED: &str = "required";
pub const MSG_PASSWORD_MATCH: &str = "passwordMatch";
pub const MSG_FORM_INVALID: &str = "formInvalid";

/// Used when a custom rule has no message of its own.
pub const FALLBACK_MESSAGE: &str = "Please enter a valid value";

/// A predicate a field value must satisfy.
#[derive(Clone)]
pub enum Predicate {
    Pattern(Regex),
    Check(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Predicate {
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Predicate::Pattern)
    }

    pub fn check<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Predicate::Check(Arc::new(f))
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Predicate::Pattern(re) => re.is_match(value),
            Predicate::Check(f) => f(value),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Predicate::Check(_) => f.write_str("Check(<fn>)"),
        }
    }
}

impl From<Regex> for Predicate {
    fn from(re: Regex) -> Self {
        Predicate::Pattern(re)
    }
}

/// A resolved rule: predicate plus the message shown when it fails.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule<'a> {
    pub name: &'a str,
    pub predicate: &'a Predicate,
    pub message: &'a str,
}

impl<'a> FieldRule<'a> {
    /// `Err(message)` when the value does not satisfy the predicate.
    pub fn apply(&self, value: &str) -> Result<(), &'a str> {
        if self.predicate.matches(value) {
            Ok(())
        } else {
            Err(self.message)
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleBook {
    predicates: HashMap<String, Predicate>,
    messages: HashMap<String, String>,
}

impl RuleBook {
    /// Built-in rules and messages only.
    pub fn builtin() -> Self {
        let mut predicates = HashMap::new();
        predicates.insert(RULE_EMAIL.to_string(), Predicate::check(is_valid_email));
        predicates.insert(RULE_PHONE.to_string(), Predicate::Pattern(PHONE_RE.clone()));
        predicates.insert(
            RULE_PASSWORD.to_string(),
            Predicate::check(is_acceptable_password),
        );

        let messages = [
            (MSG_REQUIRED, "This field is required"),
            (RULE_EMAIL, "Please enter a valid email address"),
            (RULE_PHONE, "Please enter a valid phone number"),
            (
                RULE_PASSWORD,
                "Password must be at least 8 characters and include uppercase, lowercase and a number",
            ),
            (MSG_PASSWORD_MATCH, "Passwords do not match"),
            (MSG_FORM_INVALID, "Please correct the highlighted fields and try again"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            predicates,
            messages,
        }
    }

    /// Built-ins overlaid with caller entries. Caller entries win.
    pub fn with_overrides<P, M>(predicates: P, messages: M) -> Self
    where
        P: IntoIterator<Item = (String, Predicate)>,
        M: IntoIterator<Item = (String, String)>,
    {
        let mut book = Self::builtin();
        book.predicates.extend(predicates);
        book.messages.extend(messages);
        book
    }

    pub fn rule(&self, name: &str) -> Option<FieldRule<'_>> {
        let (name, predicate) = self.predicates.get_key_value(name)?;
        Some(FieldRule {
            name: name.as_str(),
            predicate,
            message: self.message(name),
        })
    }

    /// Message for a rule or message key, falling back to a generic text.
    pub fn message(&self, name: &str) -> &str {
        self.messages
            .get(name)
            .map(String::as_str)
            .unwrap_or(FALLBACK_MESSAGE)
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_rules() {
        let book = RuleBook::builtin();
        let email = book.rule(RULE_EMAIL).unwrap();
        assert!(email.apply("a@b.co").is_ok());
        assert_eq!(
            email.apply("not-an-email"),
            Err("Please enter a valid email address")
        );
        assert!(book.rule(RULE_PHONE).unwrap().apply("555-123-4567").is_ok());
        assert!(book.rule(RULE_PASSWORD).unwrap().apply("weak").is_err());
        assert!(book.rule("postcode").is_none());
    }

    #[test]
    fn test_overrides_replace_builtins() {
        let book = RuleBook::with_overrides(
            vec![
                (RULE_PHONE.to_string(), Predicate::pattern(r"^\d{5}$").unwrap()),
                ("postcode".to_string(), Predicate::check(|v| v.len() == 4)),
            ],
            vec![(MSG_REQUIRED.to_string(), "Needed".to_string())],
        );

        assert!(book.rule(RULE_PHONE).unwrap().apply("12345").is_ok());
        assert!(book.rule(RULE_PHONE).unwrap().apply("555-123-4567").is_err());
        assert_eq!(book.message(MSG_REQUIRED), "Needed");
        assert_eq!(book.message(RULE_EMAIL), "Please enter a valid email address");

        let postcode = book.rule("postcode").unwrap();
        assert_eq!(postcode.message, FALLBACK_MESSAGE);
        assert!(postcode.apply("2000").is_ok());
    }

    #[test]
    fn test_predicate_debug() {
        let p = Predicate::pattern("^a$").unwrap();
        assert_eq!(format!("{:?}", p), "Pattern(\"^a$\")");
        assert_eq!(format!("{:?}", Predicate::check(|_| true)), "Check(<fn>)");
    }
}
