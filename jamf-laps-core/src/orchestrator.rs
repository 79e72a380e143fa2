//! Sequencing of user-triggered operations.
//!
//! Each operation authenticates once, passes that token to each of its
//! sub-calls, and stops at the first failure:
//!
//! - **fetch password**: token → computer ID → management ID → password
//! - **fetch settings**: token → rotation policy
//! - **save settings**: parse fields → token → write rotation policy
//!
//! Nothing is shared between operations.

use std::time::Duration;

use crate::api::auth::AuthClient;
use crate::api::http_client;
use crate::api::inventory::ResourceResolver;
use crate::api::settings::SettingsClient;
use crate::config::AppConfig;
use crate::error::LapsError;
use crate::form::{PasswordEvent, PasswordForm, PolicyEvent, PolicyFields, PolicyForm};
use crate::model::{AuthMode, BearerToken, Credentials, LapsAccount, Operation, RotationPolicy};

/// Server and credentials for the current run.
#[derive(Debug, Clone)]
pub struct Session {
    pub server_url: String,
    pub auth_mode: AuthMode,
    pub credentials: Credentials,
}

impl Session {
    pub fn new(
        server_url: impl Into<String>,
        auth_mode: AuthMode,
        credentials: Credentials,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            auth_mode,
            credentials,
        }
    }

    /// Combine the configured server with stored credentials.
    ///
    /// The configured username wins over the account saved with the secret.
    pub fn from_config(config: &AppConfig, stored: Credentials) -> Self {
        let credentials = if config.username.is_empty() {
            stored
        } else {
            Credentials {
                identifier: config.username.clone(),
                secret: stored.secret,
            }
        };

        Self::new(config.server_url.clone(), config.auth_mode, credentials)
    }
}

/// Runs LAPS operations against one server.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    session: Session,
    auth: AuthClient,
    resolver: ResourceResolver,
    settings: SettingsClient,
}

impl Orchestrator {
    /// Create an orchestrator with its own HTTP client.
    pub fn new(session: Session, timeout: Duration) -> Result<Self, LapsError> {
        Ok(Self::with_client(session, http_client(timeout)?))
    }

    /// Create an orchestrator sharing an existing HTTP client.
    pub fn with_client(session: Session, http: reqwest::Client) -> Self {
        Self {
            session,
            auth: AuthClient::new(http.clone()),
            resolver: ResourceResolver::new(http.clone()),
            settings: SettingsClient::new(http),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn authenticate(&self) -> Result<BearerToken, LapsError> {
        self.auth
            .authenticate(
                &self.session.server_url,
                &self.session.credentials,
                self.session.auth_mode,
            )
            .await
    }

    /// Retrieve the current LAPS password of `username` on the computer
    /// with `serial_number`.
    pub async fn fetch_password(
        &self,
        serial_number: &str,
        username: &str,
    ) -> Result<String, LapsError> {
        let server_url = &self.session.server_url;
        let token = self.authenticate().await?;

        let management_id = self
            .resolver
            .resolve_password_handle(server_url, &token, serial_number)
            .await?;

        let account = LapsAccount::new(management_id, username);
        self.resolver
            .fetch_password(server_url, &token, &account)
            .await
    }

    /// Read the rotation policy.
    pub async fn fetch_settings(&self) -> Result<RotationPolicy, LapsError> {
        let token = self.authenticate().await?;
        self.settings
            .fetch_policy(&self.session.server_url, &token)
            .await
    }

    /// Validate `fields` and write them as the rotation policy.
    ///
    /// Validation happens before any request is made.
    pub async fn save_settings(&self, fields: &PolicyFields) -> Result<u16, LapsError> {
        let policy = fields.parse()?;
        let token = self.authenticate().await?;
        self.settings
            .save_policy(&self.session.server_url, &token, &policy)
            .await
    }

    /// Run [`fetch_password`](Self::fetch_password) for `form`.
    ///
    /// The password field only changes on success; `busy` is cleared either way.
    pub async fn refresh_password(&self, form: &mut PasswordForm) -> Result<(), LapsError> {
        if form.busy {
            return Err(LapsError::OperationPending {
                operation: Operation::FetchPassword,
            });
        }

        form.dispatch(PasswordEvent::FetchStarted);
        let result = self
            .fetch_password(&form.serial_number, &form.username)
            .await;

        match result {
            Ok(password) => {
                form.dispatch(PasswordEvent::PasswordFetched(password));
                Ok(())
            }
            Err(e) => {
                form.dispatch(PasswordEvent::FetchFailed);
                Err(e)
            }
        }
    }

    /// Run [`fetch_settings`](Self::fetch_settings) and load the result into `form`.
    pub async fn refresh_policy(&self, form: &mut PolicyForm) -> Result<(), LapsError> {
        if form.busy {
            return Err(LapsError::OperationPending {
                operation: Operation::FetchSettings,
            });
        }

        form.dispatch(PolicyEvent::RequestStarted);
        match self.fetch_settings().await {
            Ok(policy) => {
                if form.fields.auto_deploy_enabled != policy.auto_deploy_enabled {
                    tracing::debug!("Server auto-deploy flag differs from local value");
                }
                form.dispatch(PolicyEvent::Loaded(policy));
                Ok(())
            }
            Err(e) => {
                form.dispatch(PolicyEvent::RequestFailed);
                Err(e)
            }
        }
    }

    /// Save the fields of `form`, marking it clean on success.
    pub async fn submit_policy(&self, form: &mut PolicyForm) -> Result<u16, LapsError> {
        if form.busy {
            return Err(LapsError::OperationPending {
                operation: Operation::SaveSettings,
            });
        }

        form.dispatch(PolicyEvent::RequestStarted);
        let result = self.save_settings(&form.fields).await;

        match result {
            Ok(status) => {
                form.dispatch(PolicyEvent::Saved);
                Ok(status)
            }
            Err(e) => {
                form.dispatch(PolicyEvent::RequestFailed);
                Err(e)
            }
        }
    }
}
