//! Top-level error types for Jamf LAPS.

use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::model::{Operation, PolicyField, ResolutionStep};
use crate::store::StoreError;

fn status_text(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

/// Error type for every orchestrated operation.
///
/// Network and decode failures map to the failing operation's variant,
/// carrying the HTTP status when one was received.
#[derive(Debug, Error)]
pub enum LapsError {
    /// No bearer token could be obtained.
    #[error("authentication failed (status: {})", status_text(.status))]
    AuthenticationFailed { status: Option<u16> },

    /// A step of the serial number to password chain failed.
    #[error("{step} not found (status: {})", status_text(.status))]
    NotFound {
        step: ResolutionStep,
        status: Option<u16>,
    },

    /// A policy field is not a whole number of seconds.
    #[error("invalid {field}: {value:?} is not a whole number of seconds")]
    ValidationFailed { field: PolicyField, value: String },

    /// The rotation policy could not be read.
    #[error("could not fetch LAPS settings (status: {})", status_text(.status))]
    FetchFailed { status: Option<u16> },

    /// The rotation policy could not be written.
    #[error("could not save LAPS settings (status: {})", status_text(.status))]
    SaveFailed { status: Option<u16> },

    /// The same operation is still running.
    #[error("{operation} is already in progress")]
    OperationPending { operation: Operation },

    /// No credentials are saved for the server.
    #[error("no saved credentials for {service}")]
    MissingCredentials { service: String },

    /// Error from credential storage.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error loading or saving configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// A titled message to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

impl LapsError {
    /// The alert shown to the user for this error.
    pub fn alert(&self) -> Alert {
        match self {
            Self::AuthenticationFailed { .. } => Alert::new(
                "Authentication Error",
                "Could not authenticate. Please check the url and authentication details",
            ),
            Self::NotFound { step, .. } => match step {
                ResolutionStep::ComputerId => Alert::new(
                    "Computer Record",
                    "Could not find this computer, please check the serial number.",
                ),
                ResolutionStep::ManagementId => Alert::new(
                    "Management ID",
                    "Could not retrieve the managementID, please check the serial number.",
                ),
                ResolutionStep::Password => Alert::new(
                    "Password",
                    "Could not retrieve the password, please check the serial number and laps user name.",
                ),
            },
            Self::ValidationFailed { field, .. } => match field {
                PolicyField::PasswordRotationTime => Alert::new(
                    "Password Rotation Time",
                    "The Password Rotation Time does not appear to be valid amount of seconds.",
                ),
                PolicyField::AutoRotateExpirationTime => Alert::new(
                    "Auto Expiration Time",
                    "The Auto Rotate Expiration Time does not appear to be valid amount of seconds.",
                ),
            },
            Self::FetchFailed { status } => Alert::new(
                "Fetch Error",
                format!("Could not fetch LAPS settings. Error {}", status_text(status)),
            ),
            Self::SaveFailed { status } => Alert::new(
                "Save Error",
                format!("Could not save LAPS settings. Error {}", status_text(status)),
            ),
            Self::OperationPending { operation } => {
                Alert::new("Busy", format!("Please wait, {} is still running.", operation))
            }
            Self::MissingCredentials { .. } => Alert::new(
                "Authentication Error",
                "No saved credentials. Please save your authentication details first.",
            ),
            Self::Store(e) => Alert::new("Credentials Error", e.to_string()),
            Self::Config(e) => Alert::new("Configuration Error", e.to_string()),
            Self::Internal { message } => Alert::new("Error", message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_id_alert() {
        let err = LapsError::NotFound {
            step: ResolutionStep::ManagementId,
            status: Some(404),
        };
        let alert = err.alert();
        assert_eq!(alert.title, "Management ID");
        assert!(alert.message.contains("managementID"));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_expiration_validation_alert() {
        let err = LapsError::ValidationFailed {
            field: PolicyField::AutoRotateExpirationTime,
            value: "not-a-number".to_string(),
        };
        assert_eq!(err.alert().title, "Auto Expiration Time");
    }

    #[test]
    fn test_save_failed_reports_status_verbatim() {
        let alert = LapsError::SaveFailed { status: Some(403) }.alert();
        assert_eq!(alert.title, "Save Error");
        assert_eq!(alert.message, "Could not save LAPS settings. Error 403");

        let alert = LapsError::SaveFailed { status: None }.alert();
        assert_eq!(alert.message, "Could not save LAPS settings. Error none");
    }

    #[test]
    fn test_alert_display() {
        let alert = LapsError::FetchFailed { status: Some(500) }.alert();
        assert_eq!(
            alert.to_string(),
            "Fetch Error: Could not fetch LAPS settings. Error 500"
        );
    }
}
