//! Credential store: the signed-in session, persisted between runs

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::authn::credential::Credential;
use crate::errors::StudioError;
use crate::storage::kv::KeyValueStore;

/// Durable key holding the raw bearer token
pub const CREDENTIAL_KEY: &str = "sheetify-token";

/// Message shown when a write is attempted while signed out
pub const SIGN_IN_REQUIRED: &str = "Please sign in first.";

/// Holds the optional credential and notifies subscribers when it changes
pub struct CredentialStore {
    backend: Arc<dyn KeyValueStore>,
    cell: watch::Sender<Option<Credential>>,
}

impl CredentialStore {
    /// Load the persisted credential, if any. A missing entry starts signed
    /// out; an expired JWT is removed and also starts signed out.
    pub async fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let initial = match backend.get(CREDENTIAL_KEY).await {
            Ok(Some(raw)) if !raw.trim().is_empty() => Some(Credential::new(raw.trim())),
            Ok(_) => None,
            Err(e) => {
                warn!("Unable to read stored credential, starting signed out: {}", e);
                None
            }
        };

        let initial = match initial {
            Some(credential) if credential.is_expired() => {
                info!("Stored credential has expired, signing out");
                if let Err(e) = backend.remove(CREDENTIAL_KEY).await {
                    warn!("Unable to remove expired credential: {}", e);
                }
                None
            }
            other => other,
        };

        debug!("Credential store loaded (signed in: {})", initial.is_some());
        let (cell, _) = watch::channel(initial);
        Self { backend, cell }
    }

    /// Current credential
    pub fn get(&self) -> Option<Credential> {
        self.cell.borrow().clone()
    }

    /// Current credential, or `AuthError` when signed out
    pub fn require(&self) -> Result<Credential, StudioError> {
        self.get()
            .ok_or_else(|| StudioError::AuthError(SIGN_IN_REQUIRED.to_string()))
    }

    pub fn is_signed_in(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// Replace the credential. The durable entry is written first, or removed
    /// for `None`; subscribers see the new value only once that succeeded.
    pub async fn set(&self, value: Option<Credential>) -> Result<(), StudioError> {
        match value.as_ref() {
            Some(credential) => self.backend.set(CREDENTIAL_KEY, credential.expose()).await?,
            None => self.backend.remove(CREDENTIAL_KEY).await?,
        }

        self.cell.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        Ok(())
    }

    /// Subscribe to credential changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.cell.subscribe()
    }
}
