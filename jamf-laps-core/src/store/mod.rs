//! Credential persistence.
//!
//! Secrets are stored per service name in a [`SecretStore`] backend, either
//! the OS keyring ([`KeyringStore`], `keyring-store` feature) or process
//! memory ([`MemoryStore`]). [`CredentialStore`] layers the account name on
//! top so a single lookup by service returns a full [`Credentials`] pair.
//!
//! ```rust,ignore
//! use jamf_laps_core::store::{create_store, CredentialStore, Secret, StoreBackend, DEFAULT_SERVICE};
//!
//! let credentials = CredentialStore::new(create_store(StoreBackend::Keyring));
//! credentials
//!     .save(DEFAULT_SERVICE, "admin", &Secret::new("hunter2"))
//!     .await?;
//!
//! let stored = credentials.retrieve(DEFAULT_SERVICE).await?;
//! assert_eq!(stored.unwrap().identifier, "admin");
//! ```
//!
//! [`Credentials`]: crate::model::Credentials

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

mod credentials;
mod memory;
#[cfg(feature = "keyring-store")]
mod keyring;

pub use credentials::{CredentialStore, DEFAULT_SERVICE};
pub use memory::MemoryStore;
#[cfg(feature = "keyring-store")]
pub use keyring::KeyringStore;

/// A password, client secret or token.
///
/// Formatting never shows the value and the buffer is wiped on drop; use
/// [`expose`](Secret::expose) at the point the value is sent.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(********)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

/// Errors from credential persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The OS refused access to the entry, e.g. a declined keychain prompt.
    #[error("access to the credentials for {service} was denied")]
    AccessDenied { service: String },

    /// The backend failed to read, write or delete.
    #[error("credential backend failed: {reason}")]
    Backend { reason: String },

    /// A saved entry could not be decoded.
    #[error("saved credentials are unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// No keyring service is reachable on this machine.
    #[error("keyring unavailable: {reason}")]
    Unavailable { reason: String },
}

/// A place to keep one secret per service name.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// The secret saved for `service`, or `None` if nothing is saved.
    async fn get(&self, service: &str) -> Result<Option<Secret>, StoreError>;

    /// Save `secret` for `service`, replacing any previous value.
    async fn set(&self, service: &str, secret: &Secret) -> Result<(), StoreError>;

    /// Remove the secret for `service`. Missing entries are not an error.
    async fn delete(&self, service: &str) -> Result<(), StoreError>;
}

/// Which backend [`create_store`] should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    /// The OS keyring, falling back to memory when it is unreachable.
    #[default]
    Keyring,
    /// Process memory only; nothing survives the run.
    Memory,
}

/// Open the secret store for `backend`.
pub fn create_store(backend: StoreBackend) -> Box<dyn SecretStore> {
    match backend {
        StoreBackend::Keyring => keyring_or_memory(),
        StoreBackend::Memory => {
            tracing::debug!("Using in-memory credential storage");
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(feature = "keyring-store")]
fn keyring_or_memory() -> Box<dyn SecretStore> {
    match KeyringStore::try_new("jamf-laps") {
        Ok(store) => {
            tracing::debug!("Using OS keyring for credential storage");
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!("{}; saved credentials will not outlive this run", e);
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(not(feature = "keyring-store"))]
fn keyring_or_memory() -> Box<dyn SecretStore> {
    tracing::warn!("Built without keyring support; saved credentials will not outlive this run");
    Box::new(MemoryStore::new())
}
