use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::io::storage::{self, KeyStorage, StorageError};

/// Fixed storage key for the cached session record
pub const SESSION_KEY: &str = "session";

/// The authenticated identity, as cached between sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// Initial state, while the cached session has not been probed yet
    Loading,
    Anonymous,
    Authenticated(Identity),
}

/// Holds the current authenticated identity (or none) and gates every
/// entity container operation. Constructed once per session and shared
/// by `Arc`; the widget callbacks flip state through it.
pub struct AuthState {
    status: RwLock<AuthStatus>,
    storage: Arc<dyn KeyStorage>,
}

impl AuthState {
    /// Start in `Loading`, before the session cache has been probed.
    pub fn new(storage: Arc<dyn KeyStorage>) -> Self {
        AuthState {
            status: RwLock::new(AuthStatus::Loading),
            storage,
        }
    }

    /// Construct and immediately resolve the cached session.
    pub fn load(storage: Arc<dyn KeyStorage>) -> Self {
        let state = AuthState::new(storage);
        state.restore_session();
        state
    }

    /// Probe the session cache: a parseable cached identity means
    /// "likely authenticated" until contradicted by an explicit sign-out.
    pub fn restore_session(&self) {
        let next = match storage::read_json::<Identity>(self.storage.as_ref(), SESSION_KEY) {
            Some(identity) => {
                tracing::debug!(user = %identity.id, "restored cached session");
                AuthStatus::Authenticated(identity)
            }
            None => AuthStatus::Anonymous,
        };
        *self.status.write().unwrap() = next;
    }

    /// Successful sign-in callback from the identity widget. Caches the
    /// session; a cache write failure is logged but does not block the
    /// sign-in itself.
    pub fn handle_sign_in(&self, identity: Identity) {
        if let Err(e) = storage::write_json(self.storage.as_ref(), SESSION_KEY, &identity) {
            tracing::warn!(error = %e, "could not cache session");
        }
        *self.status.write().unwrap() = AuthStatus::Authenticated(identity);
    }

    /// Failed sign-in callback from the identity widget
    pub fn handle_sign_in_error(&self, message: &str) {
        tracing::warn!(message, "sign-in failed");
        *self.status.write().unwrap() = AuthStatus::Anonymous;
    }

    /// Explicit sign-out: clears the cached session
    pub fn sign_out(&self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_KEY)?;
        *self.status.write().unwrap() = AuthStatus::Anonymous;
        Ok(())
    }

    pub fn status(&self) -> AuthStatus {
        self.status.read().unwrap().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        match &*self.status.read().unwrap() {
            AuthStatus::Authenticated(identity) => Some(identity.clone()),
            _ => None,
        }
    }

    /// Pure predicate over the current state
    pub fn is_authenticated(&self) -> bool {
        matches!(&*self.status.read().unwrap(), AuthStatus::Authenticated(_))
    }
}
