//! Local authentication stub
//!
//! Keeps a user list and the current session in [`Storage`]. There is no
//! server; this only gates UI state. Passwords are kept as blake3 digests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use formward_validation::{check_password, is_blank, is_valid_email, normalize_email, PasswordStrength};

use crate::storage::{Storage, StorageError, StorageExt};

pub const USERS_KEY: &str = "users";
pub const SESSION_KEY: &str = "currentUser";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("name is required")]
    MissingName,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(String),

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredUser {
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub email: String,
    pub logged_in_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthStore {
    storage: Arc<dyn Storage>,
}

impl AuthStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        if is_blank(name) {
            return Err(AuthError::MissingName);
        }
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        check_password(password, PasswordStrength::Medium).map_err(AuthError::WeakPassword)?;

        let mut users = self.users()?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::EmailTaken);
        }

        users.push(StoredUser {
            name: name.trim().to_string(),
            email: email.clone(),
            password_hash: digest(&email, password),
            created_at: Utc::now(),
        });
        self.storage.set_json(USERS_KEY, &users)?;

        tracing::debug!(email = %email, "user registered");
        Ok(())
    }

    /// Check credentials and start a session
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        let users = self.users()?;
        let user = users
            .iter()
            .find(|u| u.email == email && u.password_hash == digest(&email, password))
            .ok_or(AuthError::InvalidCredentials)?;

        let session = Session {
            name: user.name.clone(),
            email: user.email.clone(),
            logged_in_at: Utc::now(),
        };
        self.storage.set_json(SESSION_KEY, &session)?;
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.storage.remove_item(SESSION_KEY)?;
        Ok(())
    }

    /// Current session; unreadable session data counts as logged out
    pub fn current_user(&self) -> Option<Session> {
        match self.storage.get_json::<Session>(SESSION_KEY) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable session");
                None
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    fn users(&self) -> Result<Vec<StoredUser>, AuthError> {
        Ok(self.storage.get_json::<Vec<StoredUser>>(USERS_KEY)?.unwrap_or_default())
    }
}

/// Salted with the normalized email so equal passwords differ per user
fn digest(email: &str, password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(email.as_bytes());
    hasher.update(&[0]);
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}
