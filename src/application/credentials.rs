//! Process-wide holder of the current session credential.
//!
//! Backed by a `tokio::sync::watch` channel: reads never block on writers,
//! every write is a whole-value replacement that readers observe atomically,
//! and subscribers are woken on change so a UI can react to sign-out.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::sync::watch;

use crate::domain::credentials::{Credential, UserIdentity};

#[derive(Debug, Clone)]
pub struct CredentialStore {
    inner: Arc<watch::Sender<Credential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::with_credential(Credential::default())
    }

    pub fn with_credential(credential: Credential) -> Self {
        let (sender, _) = watch::channel(credential);
        Self {
            inner: Arc::new(sender),
        }
    }

    /// Snapshot of the current credential.
    pub fn current(&self) -> Credential {
        self.inner.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.borrow().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.borrow().refresh_token.clone()
    }

    /// Store a new token pair, keeping the known identity.
    pub fn set(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();
        self.inner.send_modify(|credential| {
            credential.access_token = Some(access_token);
            credential.refresh_token = Some(refresh_token);
        });
    }

    pub fn set_identity(&self, identity: UserIdentity) {
        self.inner.send_modify(|credential| {
            credential.identity = Some(identity);
        });
    }

    /// Drop tokens and identity.
    pub fn clear(&self) {
        self.inner.send_replace(Credential::default());
    }

    /// Swap in a whole credential, e.g. one restored from disk.
    pub fn replace(&self, credential: Credential) -> Credential {
        self.inner.send_replace(credential)
    }

    pub fn subscribe(&self) -> watch::Receiver<Credential> {
        self.inner.subscribe()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

static CREDENTIAL_STORE: Lazy<CredentialStore> = Lazy::new(CredentialStore::new);

/// Access the shared credential store, initialised empty on first use.
pub fn credential_store() -> CredentialStore {
    CREDENTIAL_STORE.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_identity_and_clear_drops_everything() {
        let store = CredentialStore::new();
        store.set_identity(UserIdentity::new("a@example.com"));
        store.set("access", "refresh");

        let current = store.current();
        assert_eq!(current.access_token.as_deref(), Some("access"));
        assert_eq!(current.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(
            current.identity.map(|identity| identity.email),
            Some("a@example.com".to_string())
        );

        store.clear();
        assert!(store.current().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let store = CredentialStore::new();
        let other = store.clone();
        other.set("a", "r");
        assert_eq!(store.access_token().as_deref(), Some("a"));
    }

    #[test]
    fn replace_returns_previous_value() {
        let store = CredentialStore::new();
        store.set("a", "r");
        let previous = store.replace(Credential::default());
        assert_eq!(previous.refresh_token.as_deref(), Some("r"));
        assert!(store.refresh_token().is_none());
    }

    #[tokio::test]
    async fn subscribers_observe_sign_out() {
        let store = CredentialStore::new();
        store.set("a", "r");
        let mut receiver = store.subscribe();

        store.clear();
        receiver.changed().await.expect("sender alive");
        assert!(receiver.borrow().is_empty());
    }

    #[test]
    fn shared_store_is_one_instance() {
        let first = credential_store();
        let second = credential_store();
        assert!(Arc::ptr_eq(&first.inner, &second.inner));
    }
}
