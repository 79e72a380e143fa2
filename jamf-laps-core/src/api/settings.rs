//! LAPS rotation policy read/write.

use reqwest::header::ACCEPT;

use super::{endpoint, read_json};
use crate::error::LapsError;
use crate::model::{BearerToken, RotationPolicy};

const SETTINGS_PATH: &[&str] = &["api", "v2", "local-admin-password", "settings"];

/// Reads and writes the server-side rotation policy.
#[derive(Debug, Clone)]
pub struct SettingsClient {
    http: reqwest::Client,
}

impl SettingsClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch the full rotation policy.
    ///
    /// Anything but HTTP 200 with a complete policy body is
    /// [`LapsError::FetchFailed`].
    pub async fn fetch_policy(
        &self,
        server_url: &str,
        token: &BearerToken,
    ) -> Result<RotationPolicy, LapsError> {
        tracing::info!("Fetching LAPS settings");

        let url = endpoint(server_url, SETTINGS_PATH)
            .ok_or(LapsError::FetchFailed { status: None })?;
        let request = self.http.get(url).bearer_auth(token.value.expose());

        let (policy, status) = read_json::<RotationPolicy>(request, "fetching LAPS settings")
            .await
            .map_err(|status| {
                tracing::error!("No LAPS settings received");
                LapsError::FetchFailed { status }
            })?;

        if status != 200 {
            tracing::error!("LAPS settings request returned {}", status);
            return Err(LapsError::FetchFailed {
                status: Some(status),
            });
        }

        tracing::info!("LAPS settings received");
        Ok(policy)
    }

    /// Replace the rotation policy with `policy`.
    ///
    /// Returns the status code on HTTP 200; any other outcome is
    /// [`LapsError::SaveFailed`] carrying the observed status.
    pub async fn save_policy(
        &self,
        server_url: &str,
        token: &BearerToken,
        policy: &RotationPolicy,
    ) -> Result<u16, LapsError> {
        tracing::info!("Saving LAPS settings");

        let url = endpoint(server_url, SETTINGS_PATH)
            .ok_or(LapsError::SaveFailed { status: None })?;

        let response = self
            .http
            .put(url)
            .bearer_auth(token.value.expose())
            .header(ACCEPT, "application/json")
            .json(policy)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Saving LAPS settings failed: {}", e);
                LapsError::SaveFailed {
                    status: e.status().map(|s| s.as_u16()),
                }
            })?;

        let status = response.status().as_u16();
        tracing::info!("Response code for saving LAPS settings: {}", status);

        if status != 200 {
            return Err(LapsError::SaveFailed {
                status: Some(status),
            });
        }

        Ok(status)
    }
}
