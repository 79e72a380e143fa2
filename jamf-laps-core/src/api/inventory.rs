//! Device resolution and LAPS password retrieval.
//!
//! A password is reached through three dependent lookups:
//!
//! 1. `GET /JSSResource/computers/serialnumber/{serial}` → computer ID
//! 2. `GET /api/v1/computers-inventory/{id}` → management ID
//! 3. `GET /api/v2/local-admin-password/{managementId}/account/{username}/password`
//!
//! Nothing is cached between lookups or calls.

use serde::Deserialize;

use super::{endpoint, read_json};
use crate::error::LapsError;
use crate::model::{BearerToken, ComputerId, LapsAccount, ManagementId, ResolutionStep};

#[derive(Deserialize)]
struct ComputerRecord {
    computer: ComputerDetail,
}

#[derive(Deserialize)]
struct ComputerDetail {
    general: ComputerGeneral,
}

#[derive(Deserialize)]
struct ComputerGeneral {
    id: i64,
}

#[derive(Deserialize)]
struct InventoryRecord {
    general: InventoryGeneral,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryGeneral {
    management_id: String,
}

#[derive(Deserialize)]
struct PasswordRecord {
    password: String,
}

/// Resolves serial numbers to LAPS password handles.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    http: reqwest::Client,
}

impl ResourceResolver {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Send an authenticated GET and decode the body, tagging failures with `step`.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        server_url: &str,
        token: &BearerToken,
        segments: &[&str],
        step: ResolutionStep,
    ) -> Result<T, LapsError> {
        let not_found = |status| {
            tracing::error!("No {} found", step);
            LapsError::NotFound { step, status }
        };

        let url = endpoint(server_url, segments).ok_or_else(|| not_found(None))?;
        let request = self.http.get(url).bearer_auth(token.value.expose());

        let (value, _status) = read_json(request, &step.to_string())
            .await
            .map_err(not_found)?;
        Ok(value)
    }

    /// Look up the inventory ID of the computer with `serial_number`.
    pub async fn get_computer_id(
        &self,
        server_url: &str,
        token: &BearerToken,
        serial_number: &str,
    ) -> Result<ComputerId, LapsError> {
        tracing::info!("Fetching computer id for {}", serial_number);

        let record: ComputerRecord = self
            .get(
                server_url,
                token,
                &["JSSResource", "computers", "serialnumber", serial_number],
                ResolutionStep::ComputerId,
            )
            .await?;

        let id = ComputerId(record.computer.general.id);
        tracing::info!("Computer id found: {}", id);
        Ok(id)
    }

    /// Look up the management ID of computer `id`.
    pub async fn get_management_id(
        &self,
        server_url: &str,
        token: &BearerToken,
        id: ComputerId,
    ) -> Result<ManagementId, LapsError> {
        tracing::info!("Fetching management id for computer id {}", id);

        let record: InventoryRecord = self
            .get(
                server_url,
                token,
                &["api", "v1", "computers-inventory", id.to_string().as_str()],
                ResolutionStep::ManagementId,
            )
            .await?;

        if record.general.management_id.is_empty() {
            tracing::error!("Computer {} has an empty management id", id);
            return Err(LapsError::NotFound {
                step: ResolutionStep::ManagementId,
                status: None,
            });
        }

        let management_id = ManagementId::new(record.general.management_id);
        tracing::info!("Management id found: {}", management_id);
        Ok(management_id)
    }

    /// Resolve `serial_number` all the way to its management ID.
    pub async fn resolve_password_handle(
        &self,
        server_url: &str,
        token: &BearerToken,
        serial_number: &str,
    ) -> Result<ManagementId, LapsError> {
        let id = self.get_computer_id(server_url, token, serial_number).await?;
        self.get_management_id(server_url, token, id).await
    }

    /// Fetch the current LAPS password of `account`.
    pub async fn fetch_password(
        &self,
        server_url: &str,
        token: &BearerToken,
        account: &LapsAccount,
    ) -> Result<String, LapsError> {
        tracing::info!(
            "Fetching LAPS password for management id {} and user {}",
            account.management_id,
            account.username
        );

        let record: PasswordRecord = self
            .get(
                server_url,
                token,
                &[
                    "api",
                    "v2",
                    "local-admin-password",
                    account.management_id.as_str(),
                    "account",
                    account.username.as_str(),
                    "password",
                ],
                ResolutionStep::Password,
            )
            .await?;

        if record.password.is_empty() {
            tracing::error!("Server returned an empty LAPS password");
            return Err(LapsError::NotFound {
                step: ResolutionStep::Password,
                status: None,
            });
        }

        tracing::info!("LAPS password received");
        Ok(record.password)
    }
}
