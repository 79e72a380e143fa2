//! OS keyring backend: Keychain on macOS, Secret Service on Linux and
//! Credential Manager on Windows.

use async_trait::async_trait;
use keyring::Entry;

use super::{Secret, SecretStore, StoreError};

/// Secrets kept in the platform keyring.
///
/// Each service name maps to a keyring entry whose user is `label`, so
/// saved server credentials appear as `com.jamf.jamf-laps` in Keychain Access.
#[derive(Debug)]
pub struct KeyringStore {
    label: String,
}

const PROBE_SERVICE: &str = "com.jamf.jamf-laps.probe";
const PROBE_VALUE: &str = "jamf-laps-probe";

impl KeyringStore {
    /// Open the keyring, checking that an entry written now can be read back.
    ///
    /// Fails with [`StoreError::Unavailable`] when no keyring service is
    /// reachable or when it accepts writes without persisting them.
    pub fn try_new(label: &str) -> Result<Self, StoreError> {
        let probe = Entry::new(PROBE_SERVICE, label).map_err(unavailable)?;
        probe.set_password(PROBE_VALUE).map_err(unavailable)?;

        let read_back = probe.get_password();
        if let Err(e) = probe.delete_credential() {
            tracing::debug!("Could not remove keyring probe entry: {}", e);
        }

        match read_back {
            Ok(value) if value == PROBE_VALUE => Ok(Self {
                label: label.to_string(),
            }),
            Ok(_) => Err(StoreError::Unavailable {
                reason: "keyring returned a different value than was stored".to_string(),
            }),
            Err(e) => Err(unavailable(e)),
        }
    }

    fn entry(&self, service: &str) -> Result<Entry, StoreError> {
        Entry::new(service, &self.label).map_err(backend_error)
    }
}

fn unavailable(e: keyring::Error) -> StoreError {
    StoreError::Unavailable {
        reason: e.to_string(),
    }
}

fn backend_error(e: keyring::Error) -> StoreError {
    StoreError::Backend {
        reason: e.to_string(),
    }
}

#[async_trait]
impl SecretStore for KeyringStore {
    async fn get(&self, service: &str) -> Result<Option<Secret>, StoreError> {
        match self.entry(service)?.get_password() {
            Ok(value) => Ok(Some(Secret::new(value))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(keyring::Error::NoStorageAccess(e)) => {
                tracing::debug!("Keyring refused access to {}: {}", service, e);
                Err(StoreError::AccessDenied {
                    service: service.to_string(),
                })
            }
            Err(e) => Err(backend_error(e)),
        }
    }

    async fn set(&self, service: &str, secret: &Secret) -> Result<(), StoreError> {
        self.entry(service)?
            .set_password(secret.expose())
            .map_err(backend_error)
    }

    async fn delete(&self, service: &str) -> Result<(), StoreError> {
        match self.entry(service)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(backend_error(e)),
        }
    }
}
