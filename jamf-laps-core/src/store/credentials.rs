//! Account and secret pairs saved under a service name.

use serde::{Deserialize, Serialize};

use super::{Secret, SecretStore, StoreError};
use crate::model::Credentials;

/// Service name the CLI saves its server credentials under.
pub const DEFAULT_SERVICE: &str = "com.jamf.jamf-laps";

/// On-disk shape of a saved credential.
#[derive(Serialize, Deserialize)]
struct StoredCredential {
    account: String,
    secret: Secret,
}

/// Saves and retrieves a single account/secret pair per service name.
///
/// The pair is serialized into one secret so that [`retrieve`](Self::retrieve)
/// needs only the service name, like a keychain lookup by service.
pub struct CredentialStore {
    store: Box<dyn SecretStore>,
}

impl CredentialStore {
    pub fn new(store: Box<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Save `account` and `secret` under `service`, replacing any previous pair.
    pub async fn save(
        &self,
        service: &str,
        account: &str,
        secret: &Secret,
    ) -> Result<(), StoreError> {
        let stored = StoredCredential {
            account: account.to_string(),
            secret: secret.clone(),
        };
        let blob = Secret::new(serde_json::to_string(&stored)?);
        self.store.set(service, &blob).await?;

        tracing::debug!("Saved credentials for {} under {}", account, service);
        Ok(())
    }

    /// Retrieve the pair saved under `service`.
    ///
    /// Returns `Ok(None)` if nothing was saved.
    pub async fn retrieve(&self, service: &str) -> Result<Option<Credentials>, StoreError> {
        let Some(blob) = self.store.get(service).await? else {
            return Ok(None);
        };

        let stored: StoredCredential = serde_json::from_str(blob.expose())?;
        Ok(Some(Credentials {
            identifier: stored.account,
            secret: stored.secret,
        }))
    }

    /// Remove the pair saved under `service`.
    pub async fn delete(&self, service: &str) -> Result<(), StoreError> {
        self.store.delete(service).await
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
