// File: src/controller.rs
// Purpose: Form validation and submission controller

use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use formward_validation::rules::{
    MSG_FORM_INVALID, MSG_PASSWORD_MATCH, MSG_REQUIRED, RULE_EMAIL, RULE_PASSWORD, RULE_PHONE,
};
use formward_validation::{Predicate, RuleBook};

use crate::config::{FieldConfig, FormwardConfig, TimingConfig};
use crate::field::{Field, FieldKind, FieldState};
use crate::form::FormElement;
use crate::notifier::Notifier;
use crate::record::{FieldValue, SubmissionHistory, SubmissionRecord, TIMESTAMP_KEY};
use crate::storage::{history_key, record_key, Storage, StorageError, StorageExt};
use crate::tasks::{Clock, TaskQueue};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Thank you! Your submission has been received.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuccessMessageType {
    /// Inline confirmation inside the form, always available
    #[default]
    Overlay,
    /// Delegated to the notifier, overlay when none is registered
    Toast,
}

/// What an `on_submit` hook wants to happen next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    Proceed,
    Abort,
}

impl From<bool> for SubmitDecision {
    fn from(proceed: bool) -> Self {
        if proceed {
            SubmitDecision::Proceed
        } else {
            SubmitDecision::Abort
        }
    }
}

impl From<()> for SubmitDecision {
    fn from(_: ()) -> Self {
        SubmitDecision::Proceed
    }
}

pub type RecordHook = Box<dyn FnMut(&SubmissionRecord)>;
pub type SubmitHook = Box<dyn FnMut(&SubmissionRecord) -> SubmitDecision>;

/// Construction options for [`FormController`]
pub struct FormOptions {
    /// Merged over the built-in `email`, `phone` and `password` rules
    pub validation_rules: HashMap<String, Predicate>,
    /// Merged over the built-in messages
    pub error_messages: HashMap<String, String>,
    pub on_submit: Option<SubmitHook>,
    pub on_success: Option<RecordHook>,
    pub on_error: Option<RecordHook>,
    pub show_success_message: bool,
    pub success_message_type: SuccessMessageType,
    pub success_message: String,
    pub timing: TimingConfig,
    pub fields: FieldConfig,
    pub default_form_id: String,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self::from_config(&FormwardConfig::default())
    }
}

impl fmt::Debug for FormOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("validation_rules", &self.validation_rules.keys().collect::<Vec<_>>())
            .field("error_messages", &self.error_messages)
            .field("on_submit", &self.on_submit.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("show_success_message", &self.show_success_message)
            .field("success_message_type", &self.success_message_type)
            .field("success_message", &self.success_message)
            .field("timing", &self.timing)
            .field("fields", &self.fields)
            .field("default_form_id", &self.default_form_id)
            .finish()
    }
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FormwardConfig) -> Self {
        Self {
            validation_rules: HashMap::new(),
            error_messages: HashMap::new(),
            on_submit: None,
            on_success: None,
            on_error: None,
            show_success_message: true,
            success_message_type: SuccessMessageType::Overlay,
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            timing: config.timing.clone(),
            fields: config.fields.clone(),
            default_form_id: config.storage.default_form_id.clone(),
        }
    }

    pub fn rule(mut self, name: impl Into<String>, predicate: Predicate) -> Self {
        self.validation_rules.insert(name.into(), predicate);
        self
    }

    pub fn message(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_messages.insert(name.into(), message.into());
        self
    }

    /// Hook run after validation passes. Returning `false` aborts the
    /// submission; returning `true` or `()` lets it continue.
    pub fn on_submit<F, R>(mut self, mut hook: F) -> Self
    where
        F: FnMut(&SubmissionRecord) -> R + 'static,
        R: Into<SubmitDecision>,
    {
        self.on_submit = Some(Box::new(move |record: &SubmissionRecord| -> SubmitDecision {
            hook(record).into()
        }));
        self
    }

    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&SubmissionRecord) + 'static,
    {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&SubmissionRecord) + 'static,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    pub fn success_message_type(mut self, kind: SuccessMessageType) -> Self {
        self.success_message_type = kind;
        self
    }

    pub fn hide_success_message(mut self) -> Self {
        self.show_success_message = false;
        self
    }
}

/// Where the controller is in its submission cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Collecting,
    Validating,
    /// Validation failed; the cycle ended
    Rejected,
    Submitting,
    /// The `on_submit` hook vetoed; the cycle ended
    Aborted,
    Persisting,
    Notifying,
    /// Waiting for the deferred reset
    Resetting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected,
    Aborted,
    /// `persisted` is false when any storage write failed
    Submitted { persisted: bool },
}

/// Built-in success confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub message: String,
    /// Set on the turn after the overlay is inserted
    pub visible: bool,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    RevealOverlay(u64),
    DismissOverlay(u64),
    ClearGeneralError(u64),
    Reset(u64),
}

enum Check {
    /// Optional and empty
    Skip,
    Valid,
    Invalid(String),
}

pub struct FormController {
    form: FormElement,
    form_id: String,
    options: FormOptions,
    rules: RuleBook,
    states: HashMap<String, FieldState>,
    general_error: Option<String>,
    overlay: Option<Overlay>,
    phase: SubmitPhase,
    /// Bumped per submit cycle; deferred resets from older cycles no-op
    generation: u64,
    /// Bumped per general error; older auto-clears no-op
    error_generation: u64,
    storage: Arc<dyn Storage>,
    notifier: Option<Arc<dyn Notifier>>,
    tasks: TaskQueue<Deferred>,
}

impl FormController {
    /// Bind to a form. Any stored record for this form's identity is used
    /// to fill matching fields before returning.
    pub fn new(form: FormElement, mut options: FormOptions, storage: Arc<dyn Storage>) -> Self {
        let rules = RuleBook::with_overrides(
            std::mem::take(&mut options.validation_rules),
            std::mem::take(&mut options.error_messages),
        );

        let form_id = form
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| options.default_form_id.clone());

        let states = form
            .tracked()
            .map(|f| (f.id.clone(), FieldState::new(f.required)))
            .collect();

        if form.submit_button().is_none() {
            tracing::debug!(form = %form_id, "form has no submit button");
        }

        let mut controller = Self {
            form,
            form_id,
            options,
            rules,
            states,
            general_error: None,
            overlay: None,
            phase: SubmitPhase::Idle,
            generation: 0,
            error_generation: 0,
            storage,
            notifier: None,
            tasks: TaskQueue::new(Clock::new()),
        };
        controller.autofill();
        controller
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Use a shared clock. Pending deferred work is dropped.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.tasks = TaskQueue::new(clock);
        self
    }

    pub fn form(&self) -> &FormElement {
        &self.form
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn field_state(&self, id: &str) -> Option<&FieldState> {
        let field = self.form.get(id)?;
        self.states.get(&field.id)
    }

    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn clock(&self) -> &Clock {
        self.tasks.clock()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Set a field's value from user input. Clears that field's error and
    /// validity marking only.
    pub fn handle_input(&mut self, id: &str, value: impl Into<String>) {
        let Some(field) = self.form.get_mut(id) else {
            tracing::debug!(form = %self.form_id, field = id, "input for unknown field");
            return;
        };
        field.value = value.into();
        let field_id = field.id.clone();

        if let Some(state) = self.states.get_mut(&field_id) {
            state.clear();
        }
    }

    pub fn handle_blur(&mut self, id: &str) -> bool {
        self.validate_field(id)
    }

    /// Check or uncheck a checkbox or radio. Checking a radio unchecks the
    /// rest of its group.
    pub fn set_checked(&mut self, id: &str, checked: bool) {
        let Some(pos) = self.form.position(id) else {
            return;
        };
        let (kind, group) = {
            let field = &self.form.fields[pos];
            (field.kind, field.name.clone())
        };
        if !kind.is_checkable() {
            return;
        }

        if kind == FieldKind::Radio && checked {
            for field in self
                .form
                .fields
                .iter_mut()
                .filter(|f| f.kind == FieldKind::Radio && f.name == group)
            {
                field.checked = false;
            }
        }
        self.form.fields[pos].checked = checked;
    }

    /// Validate one field and update its state. Unknown fields are invalid.
    pub fn validate_field(&mut self, id: &str) -> bool {
        let Some(field) = self.form.get(id) else {
            tracing::debug!(form = %self.form_id, field = id, "validate called for unknown field");
            return false;
        };
        if !field.kind.is_text_like() {
            return true;
        }

        let check = self.check(field);
        let state = self
            .states
            .entry(field.id.clone())
            .or_insert_with(|| FieldState::new(field.required));

        match check {
            Check::Skip => {
                state.clear();
                true
            }
            Check::Valid => {
                state.mark_valid();
                true
            }
            Check::Invalid(message) => {
                state.mark_invalid(message);
                false
            }
        }
    }

    /// Validate every required field and every field holding a value.
    /// All of them are checked so every error is displayed.
    pub fn validate_form(&mut self) -> bool {
        let ids: Vec<String> = self
            .form
            .tracked()
            .filter(|f| f.required || !f.trimmed().is_empty())
            .map(|f| f.id.clone())
            .collect();

        let mut valid = true;
        for id in ids {
            valid &= self.validate_field(&id);
        }
        valid
    }

    /// Run one submission cycle
    pub fn submit(&mut self) -> SubmitOutcome {
        self.generation += 1;
        let generation = self.generation;

        self.phase = SubmitPhase::Collecting;
        let record = self.collect();

        self.phase = SubmitPhase::Validating;
        if !self.validate_form() {
            self.phase = SubmitPhase::Rejected;
            let message = self.rules.message(MSG_FORM_INVALID).to_string();
            self.report_invalid(message);
            if let Some(hook) = self.options.on_error.as_mut() {
                hook(&record);
            }
            tracing::debug!(form = %self.form_id, generation, "submission rejected");
            return SubmitOutcome::Rejected;
        }
        self.clear_general_error();

        self.phase = SubmitPhase::Submitting;
        if let Some(hook) = self.options.on_submit.as_mut() {
            if hook(&record) == SubmitDecision::Abort {
                self.phase = SubmitPhase::Aborted;
                tracing::debug!(form = %self.form_id, generation, "submission aborted by hook");
                return SubmitOutcome::Aborted;
            }
        }

        self.phase = SubmitPhase::Persisting;
        let persisted = self.persist(&record);

        self.phase = SubmitPhase::Notifying;
        self.notify_success(generation);
        if let Some(hook) = self.options.on_success.as_mut() {
            hook(&record);
        }

        self.phase = SubmitPhase::Resetting;
        let delay = self.options.timing.reset_delay();
        self.tasks.schedule(delay, Deferred::Reset(generation));
        tracing::debug!(form = %self.form_id, generation, persisted, "submission accepted");

        SubmitOutcome::Submitted { persisted }
    }

    /// Clear values, validity and error displays. Stored data is untouched.
    pub fn reset(&mut self) {
        for field in &mut self.form.fields {
            if field.kind.is_checkable() {
                field.checked = field.default_checked;
            } else if field.kind.is_text_like() {
                field.value.clear();
            }
        }
        for state in self.states.values_mut() {
            state.clear();
        }
        self.clear_general_error();
        self.phase = SubmitPhase::Idle;
    }

    /// Move the clock forward and run deferred work that falls due
    pub fn advance(&mut self, by: Duration) {
        let deadline = self.tasks.deadline(by);
        while let Some(task) = self.tasks.pop_until(deadline) {
            self.run_deferred(task);
        }
        self.tasks.clock().advance_to(deadline);
    }

    /// Stored history for a form, oldest first. Read failures yield an
    /// empty list.
    pub fn submissions(storage: &dyn Storage, form_id: &str) -> Vec<SubmissionRecord> {
        match storage.get_json::<SubmissionHistory>(&history_key(form_id)) {
            Ok(history) => history.map(SubmissionHistory::into_vec).unwrap_or_default(),
            Err(err) => {
                tracing::warn!(form = form_id, error = %err, "failed to read submission history");
                Vec::new()
            }
        }
    }

    /// Remove both the autofill record and the history of a form
    pub fn clear_storage(storage: &dyn Storage, form_id: &str) -> Result<(), StorageError> {
        let slot = storage.remove_item(&record_key(form_id));
        let history = storage.remove_item(&history_key(form_id));
        slot.and(history)
    }

    fn check(&self, field: &Field) -> Check {
        let value = field.trimmed();

        if field.required && value.is_empty() {
            return Check::Invalid(self.rules.message(MSG_REQUIRED).to_string());
        }
        if value.is_empty() {
            return Check::Skip;
        }

        if field.kind == FieldKind::Email {
            if let Some(Err(message)) = self.rules.rule(RULE_EMAIL).map(|r| r.apply(value)) {
                return Check::Invalid(message.to_string());
            }
        }

        if let Some(rule) = field.rule.as_deref().and_then(|name| self.rules.rule(name)) {
            if let Err(message) = rule.apply(value) {
                return Check::Invalid(message.to_string());
            }
        }

        if field.kind == FieldKind::Tel {
            if let Some(Err(message)) = self.rules.rule(RULE_PHONE).map(|r| r.apply(value)) {
                return Check::Invalid(message.to_string());
            }
        }

        let reserved = &self.options.fields;
        if field.id == reserved.password_id {
            if let Some(Err(message)) = self.rules.rule(RULE_PASSWORD).map(|r| r.apply(value)) {
                return Check::Invalid(message.to_string());
            }
        }

        if field.id == reserved.confirm_password_id
            && field.value != self.form.value_of(&reserved.password_id)
        {
            return Check::Invalid(self.rules.message(MSG_PASSWORD_MATCH).to_string());
        }

        Check::Valid
    }

    fn collect(&self) -> SubmissionRecord {
        let remember_id = &self.options.fields.remember_id;
        let mut record = SubmissionRecord::new(Utc::now());

        for field in &self.form.fields {
            match field.kind {
                FieldKind::Submit => {}
                FieldKind::Checkbox => {
                    if &field.id == remember_id || field.key() == TIMESTAMP_KEY {
                        continue;
                    }
                    let group = record
                        .values
                        .entry(field.key().to_string())
                        .or_insert_with(|| FieldValue::List(Vec::new()));
                    if let (true, FieldValue::List(items)) = (field.checked, group) {
                        items.push(field.submitted_value().to_string());
                    }
                }
                FieldKind::Radio => {
                    if field.checked {
                        record.insert(field.key(), FieldValue::Text(field.value.clone()));
                    }
                }
                _ => record.insert(field.key(), FieldValue::Text(field.value.clone())),
            }
        }

        record
    }

    fn remember_opted_out(&self) -> bool {
        let remember_id = &self.options.fields.remember_id;
        self.form
            .fields
            .iter()
            .any(|f| f.kind == FieldKind::Checkbox && &f.id == remember_id && !f.checked)
    }

    /// Best effort: failures are logged and reported as `false`
    fn persist(&self, record: &SubmissionRecord) -> bool {
        let key = record_key(&self.form_id);
        let slot = if self.remember_opted_out() {
            self.storage.remove_item(&key)
        } else {
            self.storage.set_json(&key, record)
        };
        if let Err(err) = &slot {
            tracing::warn!(
                form = %self.form_id,
                backend = self.storage.name(),
                error = %err,
                "failed to save form data"
            );
        }

        let history = self.append_history(record);
        if let Err(err) = &history {
            tracing::warn!(
                form = %self.form_id,
                backend = self.storage.name(),
                error = %err,
                "failed to save submission history"
            );
        }

        slot.is_ok() && history.is_ok()
    }

    fn append_history(&self, record: &SubmissionRecord) -> Result<(), StorageError> {
        let key = history_key(&self.form_id);
        let mut history = match self.storage.get_json::<SubmissionHistory>(&key) {
            Ok(history) => history.unwrap_or_default(),
            Err(err @ StorageError::Serialization { .. }) => {
                tracing::warn!(form = %self.form_id, error = %err, "discarding unreadable history");
                SubmissionHistory::new()
            }
            Err(err) => return Err(err),
        };
        history.push(record.clone());
        self.storage.set_json(&key, &history)
    }

    fn autofill(&mut self) {
        let key = record_key(&self.form_id);
        let record = match self.storage.get_json::<SubmissionRecord>(&key) {
            Ok(Some(record)) => record,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(form = %self.form_id, error = %err, "failed to read saved form data");
                return;
            }
        };

        for (name, value) in &record.values {
            for field in self.form.fields.iter_mut().filter(|f| f.key() == name) {
                match (field.kind, value) {
                    (FieldKind::Radio, FieldValue::Text(text)) => {
                        field.checked = field.value == *text;
                    }
                    (FieldKind::Checkbox, FieldValue::List(items)) => {
                        field.checked = items.iter().any(|v| v == field.submitted_value());
                    }
                    (kind, FieldValue::Text(text)) if kind.is_text_like() || kind == FieldKind::Hidden => {
                        field.value = text.clone();
                    }
                    _ => {}
                }
            }
        }
        tracing::debug!(form = %self.form_id, fields = record.values.len(), "autofilled from saved data");
    }

    fn notify_success(&mut self, generation: u64) {
        if !self.options.show_success_message {
            return;
        }
        let message = self.options.success_message.clone();

        if self.options.success_message_type == SuccessMessageType::Toast {
            if let Some(notifier) = &self.notifier {
                notifier.success(&message);
                return;
            }
            tracing::debug!(form = %self.form_id, "no notifier registered, using overlay");
        }

        self.overlay = Some(Overlay {
            message,
            visible: false,
            generation,
        });
        self.tasks.defer(Deferred::RevealOverlay(generation));
        let duration = self.options.timing.overlay();
        self.tasks.schedule(duration, Deferred::DismissOverlay(generation));
    }

    fn report_invalid(&mut self, message: String) {
        if self.options.success_message_type == SuccessMessageType::Toast {
            if let Some(notifier) = &self.notifier {
                notifier.error(&message);
            }
        }

        self.error_generation += 1;
        self.general_error = Some(message);
        let duration = self.options.timing.general_error();
        self.tasks
            .schedule(duration, Deferred::ClearGeneralError(self.error_generation));
    }

    fn clear_general_error(&mut self) {
        self.general_error = None;
        self.error_generation += 1;
    }

    fn run_deferred(&mut self, task: Deferred) {
        match task {
            Deferred::RevealOverlay(generation) => {
                if let Some(overlay) = self.overlay.as_mut().filter(|o| o.generation == generation) {
                    overlay.visible = true;
                }
            }
            Deferred::DismissOverlay(generation) => {
                if self.overlay.as_ref().is_some_and(|o| o.generation == generation) {
                    self.overlay = None;
                }
            }
            Deferred::ClearGeneralError(generation) => {
                if generation == self.error_generation {
                    self.general_error = None;
                }
            }
            Deferred::Reset(generation) => {
                if generation == self.generation {
                    self.reset();
                } else {
                    tracing::debug!(form = %self.form_id, generation, "stale reset skipped");
                }
            }
        }
    }
}
