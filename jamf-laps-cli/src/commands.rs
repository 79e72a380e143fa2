//! Command handlers.
//!
//! Handlers return the text to print so they can be exercised without a
//! terminal. Core errors are converted to their user-facing alert.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use jamf_laps_core::{
    AppConfig, AuthMode, CredentialStore, DEFAULT_SERVICE, LapsError, Orchestrator,
    PasswordForm, PolicyEvent, PolicyForm, RotationPolicy, Secret, Session,
};
use serde::Serialize;
use tracing::{debug, info};

/// Output format for query commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Changes requested by `configure`.
#[derive(Debug, Clone, Default)]
pub struct ConfigureArgs {
    pub url: Option<String>,
    pub username: Option<String>,
    pub auth_mode: Option<AuthMode>,
    pub timeout: Option<u64>,
}

/// Edits requested by `settings set`.
#[derive(Debug, Clone, Default)]
pub struct PolicyEdits {
    pub auto_deploy: Option<bool>,
    pub auto_rotate: Option<bool>,
    pub rotation_time: Option<String>,
    pub expiration_time: Option<String>,
}

impl PolicyEdits {
    fn events(&self) -> Vec<PolicyEvent> {
        let mut events = Vec::new();
        if let Some(value) = self.auto_deploy {
            events.push(PolicyEvent::AutoDeployToggled(value));
        }
        if let Some(value) = self.auto_rotate {
            events.push(PolicyEvent::AutoRotateToggled(value));
        }
        if let Some(value) = &self.rotation_time {
            events.push(PolicyEvent::RotationTimeChanged(value.clone()));
        }
        if let Some(value) = &self.expiration_time {
            events.push(PolicyEvent::ExpirationTimeChanged(value.clone()));
        }
        events
    }
}

/// Convert a core error into the alert shown to the user.
pub fn alert(err: LapsError) -> anyhow::Error {
    debug!("Operation failed: {}", err);
    anyhow::anyhow!("{}", err.alert())
}

/// Update the configuration file at `path` and return a summary.
pub fn configure(path: &Path, args: ConfigureArgs) -> Result<String> {
    let mut config = AppConfig::load_from_path(path)
        .map_err(LapsError::from)
        .map_err(alert)?;

    if let Some(url) = args.url {
        config.server_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(username) = args.username {
        config.username = username;
    }
    if let Some(mode) = args.auth_mode {
        config.auth_mode = mode;
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }

    config
        .save_to_path(path)
        .map_err(LapsError::from)
        .map_err(alert)?;
    info!("Configuration saved to {}", path.display());

    Ok(describe_config(&config))
}

fn describe_config(config: &AppConfig) -> String {
    let (identifier_label, _) = config.auth_mode.labels();
    let server = if config.server_url.is_empty() {
        "(not set)"
    } else {
        config.server_url.as_str()
    };

    format!(
        "Server:  {}\nAuth:    {}\n{:<8} {}\nTimeout: {}s",
        server,
        config.auth_mode,
        identifier_label,
        config.username,
        config.request_timeout_secs,
    )
}

/// Save `secret` for the configured identifier.
pub async fn save_credentials(
    config: &AppConfig,
    store: &CredentialStore,
    secret: Secret,
) -> Result<String> {
    if config.username.is_empty() {
        let (label, _) = config.auth_mode.labels();
        bail!(
            "Credentials Error: no {} configured, run `jamf-laps configure --username <NAME>`",
            label.trim_end_matches(':')
        );
    }
    if secret.is_empty() {
        bail!("Credentials Error: the secret must not be empty");
    }

    store
        .save(DEFAULT_SERVICE, &config.username, &secret)
        .await
        .map_err(LapsError::from)
        .map_err(alert)?;

    Ok(format!("Saved credentials for {}", config.username))
}

/// Read a secret from the first line of `reader`.
pub fn read_secret(reader: impl BufRead) -> Result<Secret> {
    let line = reader
        .lines()
        .next()
        .transpose()
        .context("Failed to read secret")?
        .unwrap_or_default();

    Ok(Secret::new(line.trim_end_matches(['\r', '\n'])))
}

/// Remove any saved credentials.
pub async fn clear_credentials(store: &CredentialStore) -> Result<String> {
    store
        .delete(DEFAULT_SERVICE)
        .await
        .map_err(LapsError::from)
        .map_err(alert)?;
    Ok("Cleared saved credentials".to_string())
}

/// Build an orchestrator from configuration and saved credentials.
pub async fn connect(config: &AppConfig, store: &CredentialStore) -> Result<Orchestrator> {
    if !config.is_configured() {
        bail!(
            "Configuration Error: no server configured, run `jamf-laps configure --url <URL>`"
        );
    }

    let stored = store
        .retrieve(DEFAULT_SERVICE)
        .await
        .map_err(LapsError::from)
        .map_err(alert)?
        .ok_or_else(|| {
            alert(LapsError::MissingCredentials {
                service: DEFAULT_SERVICE.to_string(),
            })
        })?;

    let session = Session::from_config(config, stored);
    debug!(
        "Connecting to {} as {} ({})",
        session.server_url, session.credentials.identifier, session.auth_mode
    );

    Orchestrator::new(session, config.request_timeout()).map_err(alert)
}

#[derive(Serialize)]
struct PasswordOutput<'a> {
    serial_number: &'a str,
    username: &'a str,
    password: &'a str,
}

/// Look up a LAPS password.
pub async fn password(
    orchestrator: &Orchestrator,
    serial_number: &str,
    username: &str,
    format: OutputFormat,
) -> Result<String> {
    let mut form = PasswordForm::new(serial_number.trim(), username.trim());
    if !form.can_fetch() {
        bail!("Password: a serial number and LAPS user name are required");
    }

    orchestrator
        .refresh_password(&mut form)
        .await
        .map_err(alert)?;

    match format {
        OutputFormat::Text => Ok(form.password),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&PasswordOutput {
            serial_number: &form.serial_number,
            username: &form.username,
            password: &form.password,
        })?),
    }
}

/// Show the rotation policy.
pub async fn show_settings(orchestrator: &Orchestrator, format: OutputFormat) -> Result<String> {
    let policy = orchestrator.fetch_settings().await.map_err(alert)?;
    render_policy(&policy, format)
}

/// Apply `edits` on top of the server's policy and save the result.
pub async fn update_settings(orchestrator: &Orchestrator, edits: PolicyEdits) -> Result<String> {
    let mut form = PolicyForm::default();
    orchestrator
        .refresh_policy(&mut form)
        .await
        .map_err(alert)?;

    for event in edits.events() {
        form.dispatch(event);
    }

    if !form.can_save() {
        return Ok("No changes to save".to_string());
    }

    let status = orchestrator
        .submit_policy(&mut form)
        .await
        .map_err(alert)?;
    info!("LAPS settings saved with status {}", status);

    Ok("Saved LAPS settings".to_string())
}

fn render_policy(policy: &RotationPolicy, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(policy)?),
        OutputFormat::Text => Ok(format!(
            "Auto deploy:            {}\n\
             Password rotation time: {}s\n\
             Auto rotate:            {}\n\
             Auto rotate expiration: {}s",
            enabled(policy.auto_deploy_enabled),
            policy.password_rotation_time,
            enabled(policy.auto_rotate_enabled),
            policy.auto_rotate_expiration_time,
        )),
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag { "enabled" } else { "disabled" }
}
