//! Jamf Pro REST API clients.
//!
//! - [`auth`] - Bearer token acquisition (Basic or OAuth client credentials)
//! - [`inventory`] - Serial number to management ID resolution and password fetch
//! - [`settings`] - LAPS rotation policy read/write
//!
//! Every call is a single attempt. Failures are reported as the HTTP status
//! that was observed, or `None` when no response arrived.

pub mod auth;
pub mod inventory;
pub mod settings;

use reqwest::header::ACCEPT;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::error::LapsError;

/// Build the shared HTTP client.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, LapsError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("jamf-laps/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LapsError::Internal {
            message: format!("failed to build HTTP client: {}", e),
        })
}

/// Build an endpoint URL from the server base URL and path segments.
///
/// Only scheme, host and port of `server_url` are kept; its path, query
/// and fragment are replaced. Each segment is percent-encoded, so a serial
/// number or username can't escape its position in the path.
///
/// Returns `None` if `server_url` is not an absolute URL.
pub(crate) fn endpoint(server_url: &str, segments: &[&str]) -> Option<Url> {
    let mut url = Url::parse(server_url.trim()).ok()?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return None;
    }

    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut().ok()?.clear().extend(segments);
    Some(url)
}

/// Send a request and decode a JSON body.
///
/// On failure returns the observed status code, if a response arrived.
/// The status is not checked here: a body that decodes is a success.
pub(crate) async fn read_json<T: DeserializeOwned>(
    request: RequestBuilder,
    what: &str,
) -> Result<(T, u16), Option<u16>> {
    let response = request
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| {
            tracing::debug!("Request for {} failed: {}", what, e);
            e.status().map(|s| s.as_u16())
        })?;

    let status = response.status().as_u16();
    tracing::info!("Response code for {}: {}", what, status);

    let body = response.text().await.map_err(|e| {
        tracing::debug!("Reading {} response failed: {}", what, e);
        Some(status)
    })?;

    let value = serde_json::from_str(&body).map_err(|e| {
        tracing::debug!("Decoding {} response failed: {}", what, e);
        Some(status)
    })?;

    Ok((value, status))
}
