//! Domain model types for Jamf LAPS.
//!
//! This module defines the core types used throughout the crate:
//! - [`Credentials`] - Identifier and secret exchanged for a bearer token
//! - [`AuthMode`] - Which credential scheme the server expects
//! - [`BearerToken`] - Short-lived token presented on API calls
//! - [`ComputerId`], [`ManagementId`], [`LapsAccount`] - Device resolution handles
//! - [`RotationPolicy`] - Server-side password rotation settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::store::Secret;

/// Identifier and secret used to authenticate against the server.
///
/// Depending on the [`AuthMode`] the identifier is either a Jamf Pro
/// username or an API client ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username or API client ID.
    pub identifier: String,

    /// Password or API client secret.
    pub secret: Secret,
}

impl Credentials {
    /// Create a new credential pair.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: Secret::new(secret),
        }
    }
}

/// Credential scheme used to obtain a bearer token.
///
/// # Examples
///
/// ```
/// use jamf_laps_core::AuthMode;
///
/// let mode: AuthMode = "client-credentials".parse().unwrap();
/// assert_eq!(mode, AuthMode::ClientCredentials);
/// assert_eq!(mode.labels(), ("Client ID:", "Client Secret:"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    /// Jamf Pro user account, exchanged with HTTP Basic authentication.
    #[default]
    Basic,

    /// API role client, exchanged with an OAuth client-credentials grant.
    ClientCredentials,
}

impl AuthMode {
    /// Get the auth mode as a string for configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::ClientCredentials => "client-credentials",
        }
    }

    /// Field labels for the identifier and secret inputs.
    pub fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Basic => ("Username:", "Password:"),
            Self::ClientCredentials => ("Client ID:", "Client Secret:"),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = ParseAuthModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "client-credentials" | "client_credentials" | "api-role" => {
                Ok(Self::ClientCredentials)
            }
            other => Err(ParseAuthModeError {
                value: other.to_string(),
            }),
        }
    }
}

/// Error parsing an [`AuthMode`] from a string.
#[derive(Debug, thiserror::Error)]
#[error("unknown auth mode '{value}', expected 'basic' or 'client-credentials'")]
pub struct ParseAuthModeError {
    value: String,
}

/// A bearer token issued by the server.
///
/// Tokens live for a single orchestrated operation and are never cached.
#[derive(Debug, Clone)]
pub struct BearerToken {
    /// The token value.
    pub value: Secret,

    /// HTTP status code of the token response.
    pub status: u16,

    /// When the server says the token expires, if it said so.
    pub expires_at: Option<DateTime<Utc>>,
}

impl BearerToken {
    /// Create a new token without expiry information.
    pub fn new(value: impl Into<String>, status: u16) -> Self {
        Self {
            value: Secret::new(value),
            status,
            expires_at: None,
        }
    }

    /// Attach an expiry timestamp.
    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }
}

/// Inventory identifier of a computer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComputerId(pub i64);

impl fmt::Display for ComputerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Management identifier assigned to an enrolled device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagementId(String);

impl ManagementId {
    /// Create a new management ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the management ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ManagementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ManagementId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A LAPS-managed local account on a specific device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LapsAccount {
    pub management_id: ManagementId,
    pub username: String,
}

impl LapsAccount {
    pub fn new(management_id: ManagementId, username: impl Into<String>) -> Self {
        Self {
            management_id,
            username: username.into(),
        }
    }
}

/// Server-side LAPS rotation policy.
///
/// Always fetched and written back as a whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationPolicy {
    /// Whether LAPS accounts are deployed automatically.
    pub auto_deploy_enabled: bool,

    /// Seconds after a password is viewed before it is rotated.
    pub password_rotation_time: i64,

    /// Whether passwords rotate on a schedule.
    pub auto_rotate_enabled: bool,

    /// Seconds before a password expires and is rotated.
    pub auto_rotate_expiration_time: i64,
}

/// Step of the serial number to password resolution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    ComputerId,
    ManagementId,
    Password,
}

impl fmt::Display for ResolutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ComputerId => "computer id",
            Self::ManagementId => "managementID",
            Self::Password => "LAPS password",
        };
        write!(f, "{}", name)
    }
}

/// Editable numeric fields of the rotation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyField {
    PasswordRotationTime,
    AutoRotateExpirationTime,
}

impl fmt::Display for PolicyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PasswordRotationTime => "password rotation time",
            Self::AutoRotateExpirationTime => "auto rotate expiration time",
        };
        write!(f, "{}", name)
    }
}

/// User-triggered operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchPassword,
    FetchSettings,
    SaveSettings,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchPassword => "fetch password",
            Self::FetchSettings => "fetch settings",
            Self::SaveSettings => "save settings",
        };
        write!(f, "{}", name)
    }
}
