//! Submission records and bounded submission history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Maximum number of records kept per form
pub const MAX_HISTORY: usize = 10;

/// Key the timestamp is stored under; never used for autofill
pub const TIMESTAMP_KEY: &str = "timestamp";

/// A collected value: plain text, or the checked values of a checkbox group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::Text(_) => None,
            FieldValue::List(items) => Some(items),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// The data of one submission, stored as a flat JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(flatten)]
    pub values: BTreeMap<String, FieldValue>,

    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            values: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        if key != TIMESTAMP_KEY {
            self.values.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(FieldValue::as_list)
    }
}

/// Past submissions of one form, oldest first, at most [`MAX_HISTORY`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionHistory {
    records: VecDeque<SubmissionRecord>,
}

impl SubmissionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, evicting the oldest beyond the limit
    pub fn push(&mut self, record: SubmissionRecord) {
        self.records.push_back(record);
        while self.records.len() > MAX_HISTORY {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&SubmissionRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubmissionRecord> {
        self.records.iter()
    }

    pub fn into_vec(self) -> Vec<SubmissionRecord> {
        self.records.into()
    }
}
