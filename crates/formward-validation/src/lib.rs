//! formward validation
//!
//! Pure validators used by the form controller, plus the named rule book
//! that forms reference through their `data-validate` attribute.

pub mod email;
pub mod password;
pub mod phone;
pub mod rules;
pub mod string;

pub use email::*;
pub use password::*;
pub use phone::*;
pub use rules::{FieldRule, Predicate, RuleBook};
pub use string::*;
