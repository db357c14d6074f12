//! Session state shared by the HTTP client, the realtime manager and the UI.
//!
//! [`AuthStore`] is a cheap-to-clone handle. Reads are synchronous and every
//! change is published on a `watch` channel before the mutating call returns,
//! so subscribers never observe a state the store itself has moved past.
//! Durable writes go through a [`KeyValueStore`]; a failed write is logged and
//! never rolls back the in-memory session.

use crate::persistence::{KeyValueStore, PersistenceError, TOKEN_KEY, USER_KEY};
use rukun_core::{User, UserPatch};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Current identity. Authenticated iff both `token` and `user` are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

#[derive(Clone)]
pub struct AuthStore {
    state: Arc<watch::Sender<Session>>,
    storage: Arc<dyn KeyValueStore>,
}

impl AuthStore {
    /// Unauthenticated store backed by `storage`. Nothing is read from it.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            state: Arc::new(state),
            storage,
        }
    }

    /// Store seeded from durable storage.
    ///
    /// A session is restored only when both entries exist and the user record
    /// parses. Anything less counts as no session, and leftover entries are
    /// removed.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(storage);
        match store.read_persisted() {
            Ok(Some((token, user))) => {
                store.state.send_replace(Session {
                    token: Some(token),
                    user: Some(user),
                });
            }
            Ok(None) => store.remove_persisted(),
            Err(err) => {
                warn!(error = %err, "Failed to restore authentication");
                store.remove_persisted();
            }
        }
        store
    }

    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receiver that observes every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn set_auth(&self, token: impl Into<String>, user: User) {
        let token = token.into();
        if let Err(err) = self.persist(&token, &user) {
            warn!(error = %err, "Failed to persist session");
        }
        self.state.send_replace(Session {
            token: Some(token),
            user: Some(user),
        });
    }

    pub fn clear_auth(&self) {
        self.remove_persisted();
        self.state.send_replace(Session::default());
    }

    /// Merge `patch` into the current user.
    ///
    /// Returns `false`, leaving state and storage untouched, when nobody is
    /// signed in.
    pub fn update_user(&self, patch: &UserPatch) -> bool {
        let mut merged = None;
        let updated = self.state.send_if_modified(|session| match session.user.as_mut() {
            Some(user) => {
                patch.apply(user);
                merged = Some(user.clone());
                true
            }
            None => false,
        });
        if let Some(user) = merged {
            if let Err(err) = self.persist_user(&user) {
                warn!(error = %err, "Failed to persist updated user");
            }
        }
        updated
    }

    fn read_persisted(&self) -> Result<Option<(String, User)>, PersistenceError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;
        match (token, user) {
            (Some(token), Some(user)) => Ok(Some((token, serde_json::from_str(&user)?))),
            _ => Ok(None),
        }
    }

    fn persist(&self, token: &str, user: &User) -> Result<(), PersistenceError> {
        self.storage.set(TOKEN_KEY, token)?;
        self.persist_user(user)
    }

    fn persist_user(&self, user: &User) -> Result<(), PersistenceError> {
        let serialized = serde_json::to_string(user)?;
        self.storage.set(USER_KEY, &serialized)
    }

    fn remove_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(error = %err, key, "Failed to remove persisted session entry");
            }
        }
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.state.borrow();
        f.debug_struct("AuthStore")
            .field("authenticated", &session.is_authenticated())
            .field("user", &session.user.as_ref().map(|u| u.id.as_str()))
            .finish()
    }
}
