// formward - interactivity layer for booking and marketing sites
// Form validation and submission, toasts, a local auth stub and course search

pub mod auth;
pub mod config;
pub mod controller;
pub mod field;
pub mod form;
pub mod notifier;
pub mod record;
pub mod render;
pub mod search;
pub mod storage;
pub mod tasks;

// Re-export core types
pub use controller::{
    FormController, FormOptions, Overlay, SubmitDecision, SubmitOutcome, SubmitPhase,
    SuccessMessageType,
};
pub use field::{Field, FieldKind, FieldState, Validity};
pub use form::FormElement;
pub use record::{FieldValue, SubmissionHistory, SubmissionRecord, MAX_HISTORY};

// Re-export collaborators
pub use notifier::{Notifier, Toast, ToastHandle, ToastKind, ToastOptions, ToastQueue};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageExt};
pub use tasks::{Clock, TaskQueue};

// Re-export widgets and config
pub use auth::{AuthError, AuthStore, Session};
pub use config::FormwardConfig;
pub use render::render_feedback;
pub use search::{highlight, Course, CourseSearch};

// Validation rules are shared with the validation crate
pub use formward_validation::{FieldRule, Predicate, RuleBook};
