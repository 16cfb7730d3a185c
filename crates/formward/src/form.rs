// File: src/form.rs
// Purpose: In-memory model of a form element and its fields

use serde::{Deserialize, Serialize};

use crate::field::{Field, FieldKind};

/// A form and its controls, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormElement {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl FormElement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            fields: Vec::new(),
        }
    }

    /// A form without an id; the controller falls back to a default identity
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Look a field up by id, then by name
    pub fn get(&self, id: &str) -> Option<&Field> {
        self.position(id).map(|i| &self.fields[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.position(id).map(move |i| &mut self.fields[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.id == id)
            .or_else(|| self.fields.iter().position(|f| f.name == id))
    }

    /// Text-like inputs and textareas
    pub fn tracked(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.kind.is_text_like())
    }

    pub fn submit_button(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.kind == FieldKind::Submit)
    }

    /// Current value of a field, empty when it does not exist
    pub fn value_of(&self, id: &str) -> &str {
        self.get(id).map(|f| f.value.as_str()).unwrap_or("")
    }
}
