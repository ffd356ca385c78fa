//! Session Store
//!
//! Holds the session key obtained at login. A store is owned by one transport
//! unless it is explicitly cloned into several.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An authenticated backend session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque key embedded in every request envelope
    pub key: String,
    /// When the login response was received
    pub established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            established_at: Utc::now(),
        }
    }
}

/// Login reply from the backend
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub sessionkey: String,
}

/// Shared single-slot session holder.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    slot: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current session
    pub fn set(&self, session: Session) {
        *self.slot.write() = Some(session);
    }

    pub fn current(&self) -> Option<Session> {
        self.slot.read().clone()
    }

    /// Current session key, if logged in
    pub fn key(&self) -> Option<String> {
        self.slot.read().as_ref().map(|s| s.key.clone())
    }

    pub fn is_established(&self) -> bool {
        self.slot.read().is_some()
    }
}
