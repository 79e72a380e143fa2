//! # Jamf LAPS Core
//!
//! Core library for retrieving Jamf Pro LAPS passwords and managing the
//! server's rotation policy.
//!
//! This crate provides:
//! - Domain types for credentials, tokens, device handles and the rotation policy
//! - REST clients for authentication, device resolution and LAPS settings
//! - An [`Orchestrator`] that sequences those clients per user operation
//! - Form state with pure reducers for front ends
//! - Keyring and in-memory credential storage, and a TOML configuration file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jamf_laps_core::{AuthMode, Credentials, Orchestrator, Session};
//! use std::time::Duration;
//!
//! async fn lookup() -> Result<String, jamf_laps_core::LapsError> {
//!     let session = Session::new(
//!         "https://example.jamfcloud.com",
//!         AuthMode::ClientCredentials,
//!         Credentials::new("client-id", "client-secret"),
//!     );
//!     let orchestrator = Orchestrator::new(session, Duration::from_secs(30))?;
//!     orchestrator.fetch_password("C02ABC123", "ladmin").await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod orchestrator;
pub mod store;

// Re-export commonly used types at crate root
pub use model::{
    AuthMode,
    BearerToken,
    ComputerId,
    Credentials,
    LapsAccount,
    ManagementId,
    Operation,
    PolicyField,
    ResolutionStep,
    RotationPolicy,
};

pub use api::{
    auth::{AuthClient, AuthGrant},
    inventory::ResourceResolver,
    settings::SettingsClient,
};

pub use store::{
    CredentialStore,
    MemoryStore,
    Secret,
    SecretStore,
    StoreBackend,
    StoreError,
    create_store,
    DEFAULT_SERVICE,
};

#[cfg(feature = "keyring-store")]
pub use store::KeyringStore;

pub use config::{AppConfig, ConfigError};

pub use error::{Alert, LapsError};

pub use form::{PasswordEvent, PasswordForm, PolicyEvent, PolicyFields, PolicyForm};

pub use orchestrator::{Orchestrator, Session};
