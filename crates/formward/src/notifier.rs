//! Toast notifications
//!
//! [`Notifier`] is the call contract forms and widgets use to surface
//! messages. [`ToastQueue`] keeps the active toasts in memory and expires
//! them against a [`Clock`]; presenting them is up to the host.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::config::TimingConfig;
use crate::tasks::Clock;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);
pub const DEFAULT_MAX_VISIBLE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastOptions {
    pub kind: ToastKind,
    /// Zero keeps the toast until removed
    pub duration: Duration,
}

impl ToastOptions {
    pub fn new(kind: ToastKind) -> Self {
        Self {
            kind,
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self::new(ToastKind::Info)
    }
}

pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, options: ToastOptions) -> ToastHandle;

    /// `true` if the toast was still active
    fn remove(&self, handle: ToastHandle) -> bool;

    /// Lifetime used by the shorthand methods below
    fn default_duration(&self) -> Duration {
        DEFAULT_TOAST_DURATION
    }

    fn success(&self, message: &str) -> ToastHandle {
        self.show(message, ToastOptions::new(ToastKind::Success).duration(self.default_duration()))
    }

    fn error(&self, message: &str) -> ToastHandle {
        self.show(message, ToastOptions::new(ToastKind::Error).duration(self.default_duration()))
    }

    fn warning(&self, message: &str) -> ToastHandle {
        self.show(message, ToastOptions::new(ToastKind::Warning).duration(self.default_duration()))
    }

    fn info(&self, message: &str) -> ToastHandle {
        self.show(message, ToastOptions::new(ToastKind::Info).duration(self.default_duration()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub handle: ToastHandle,
    pub kind: ToastKind,
    pub message: String,
    pub shown_at: Duration,
    pub duration: Duration,
}

impl Toast {
    pub fn is_expired(&self, now: Duration) -> bool {
        !self.duration.is_zero() && now >= self.shown_at + self.duration
    }
}

#[derive(Debug, Default)]
struct ToastState {
    next_handle: u64,
    toasts: Vec<Toast>,
}

/// In-memory toast stack
#[derive(Debug)]
pub struct ToastQueue {
    clock: Clock,
    max_visible: usize,
    default_duration: Duration,
    state: Mutex<ToastState>,
}

impl ToastQueue {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            max_visible: DEFAULT_MAX_VISIBLE,
            default_duration: DEFAULT_TOAST_DURATION,
            state: Mutex::default(),
        }
    }

    /// Queue using the configured toast lifetime
    pub fn from_config(clock: Clock, timing: &TimingConfig) -> Self {
        Self::new(clock).with_default_duration(timing.toast())
    }

    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.max_visible = max_visible.max(1);
        self
    }

    /// Toasts still visible now, oldest first
    pub fn active(&self) -> Vec<Toast> {
        let now = self.clock.now();
        self.lock()
            .toasts
            .iter()
            .filter(|t| !t.is_expired(now))
            .cloned()
            .collect()
    }

    /// Drop expired toasts, returning how many went
    pub fn prune(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();
        let before = state.toasts.len();
        state.toasts.retain(|t| !t.is_expired(now));
        before - state.toasts.len()
    }

    pub fn clear(&self) {
        self.lock().toasts.clear();
    }

    // Nothing in here can panic while the lock is held, so a poisoned lock
    // still holds consistent data.
    fn lock(&self) -> MutexGuard<'_, ToastState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Notifier for ToastQueue {
    fn default_duration(&self) -> Duration {
        self.default_duration
    }

    fn show(&self, message: &str, options: ToastOptions) -> ToastHandle {
        let now = self.clock.now();
        let mut state = self.lock();
        state.toasts.retain(|t| !t.is_expired(now));

        state.next_handle += 1;
        let handle = ToastHandle(state.next_handle);
        state.toasts.push(Toast {
            handle,
            kind: options.kind,
            message: message.to_string(),
            shown_at: now,
            duration: options.duration,
        });

        let overflow = state.toasts.len().saturating_sub(self.max_visible);
        state.toasts.drain(..overflow);

        tracing::debug!(handle = handle.0, kind = ?options.kind, "toast shown");
        handle
    }

    fn remove(&self, handle: ToastHandle) -> bool {
        let now = self.clock.now();
        let mut state = self.lock();
        let Some(pos) = state.toasts.iter().position(|t| t.handle == handle) else {
            return false;
        };
        let toast = state.toasts.remove(pos);
        !toast.is_expired(now)
    }
}
