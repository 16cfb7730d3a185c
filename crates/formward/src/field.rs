// File: src/field.rs
// Purpose: Form field descriptors and per-field validation state

use serde::{Deserialize, Serialize};

/// The `type` of an input, plus textarea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Password,
    Url,
    Number,
    Search,
    Date,
    TextArea,
    Hidden,
    Checkbox,
    Radio,
    Submit,
}

impl FieldKind {
    /// Map an HTML `type` attribute (or `textarea`) to a kind.
    /// Unknown types behave like text, as browsers do.
    pub fn parse(type_attr: &str) -> Self {
        match type_attr.to_ascii_lowercase().as_str() {
            "email" => FieldKind::Email,
            "tel" => FieldKind::Tel,
            "password" => FieldKind::Password,
            "url" => FieldKind::Url,
            "number" => FieldKind::Number,
            "search" => FieldKind::Search,
            "date" => FieldKind::Date,
            "textarea" => FieldKind::TextArea,
            "hidden" => FieldKind::Hidden,
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            "submit" => FieldKind::Submit,
            _ => FieldKind::Text,
        }
    }

    /// Fields the controller tracks and validates
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            FieldKind::Text
                | FieldKind::Email
                | FieldKind::Tel
                | FieldKind::Password
                | FieldKind::Url
                | FieldKind::Number
                | FieldKind::Search
                | FieldKind::Date
                | FieldKind::TextArea
        )
    }

    pub fn is_checkable(self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Radio)
    }
}

/// One control inside a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    /// Checked state from markup, restored on reset
    #[serde(default)]
    pub default_checked: bool,
    #[serde(default)]
    pub required: bool,
    /// Custom rule name from `data-validate`
    #[serde(default)]
    pub rule: Option<String>,
}

impl Field {
    /// A field whose id and name are both `name`
    pub fn new(kind: FieldKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            kind,
            value: String::new(),
            checked: false,
            default_checked: false,
            required: false,
            rule: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Text, name)
    }

    pub fn email(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Email, name)
    }

    pub fn tel(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Tel, name)
    }

    pub fn password(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Password, name)
    }

    pub fn textarea(name: impl Into<String>) -> Self {
        Self::new(FieldKind::TextArea, name)
    }

    /// A checkbox in group `name` with its own `id` and submitted `value`
    pub fn checkbox(name: impl Into<String>, id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(FieldKind::Checkbox, name).id(id).value(value)
    }

    /// A radio in group `name` with its own `id` and submitted `value`
    pub fn radio(name: impl Into<String>, id: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(FieldKind::Radio, name).id(id).value(value)
    }

    pub fn submit(id: impl Into<String>) -> Self {
        Self::new(FieldKind::Submit, id)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self.default_checked = true;
        self
    }

    /// Identity used for collection and autofill: name, else id
    pub fn key(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// Value a checked checkbox contributes; `on` like the browser default
    pub fn submitted_value(&self) -> &str {
        if self.value.is_empty() {
            "on"
        } else {
            &self.value
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Untouched,
    Valid,
    Invalid,
}

impl Validity {
    /// CSS class projected for this state
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Validity::Untouched => None,
            Validity::Valid => Some("is-valid"),
            Validity::Invalid => Some("is-invalid"),
        }
    }
}

/// Validation state of one tracked field. Values live on the [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldState {
    pub required: bool,
    pub validity: Validity,
    pub error: Option<String>,
}

impl FieldState {
    pub fn new(required: bool) -> Self {
        Self {
            required,
            ..Self::default()
        }
    }

    pub fn mark_valid(&mut self) {
        self.validity = Validity::Valid;
        self.error = None;
    }

    pub fn mark_invalid(&mut self, message: impl Into<String>) {
        self.validity = Validity::Invalid;
        self.error = Some(message.into());
    }

    pub fn clear(&mut self) {
        self.validity = Validity::Untouched;
        self.error = None;
    }
}
