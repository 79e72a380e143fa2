//! Jamf LAPS CLI
//!
//! Retrieve local administrator passwords from Jamf Pro and manage the
//! server's LAPS rotation settings.
//!
//! # Usage
//!
//! ```bash
//! # Point the client at a server
//! jamf-laps configure --url https://example.jamfcloud.com --username admin
//!
//! # Save the password or client secret to the system keyring
//! jamf-laps credentials save
//!
//! # Look up a password
//! jamf-laps password C02ABC123 ladmin
//!
//! # Enable automatic rotation
//! jamf-laps settings set --auto-rotate true
//! ```

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use jamf_laps_cli::commands::{self, ConfigureArgs, OutputFormat, PolicyEdits};
use jamf_laps_cli::init_logging;
use jamf_laps_core::{AppConfig, AuthMode, CredentialStore, Secret, create_store};

#[derive(Parser)]
#[command(name = "jamf-laps")]
#[command(about = "Retrieve Jamf Pro LAPS passwords and manage rotation settings")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the server, identity and request timeout
    Configure {
        /// Jamf Pro base URL
        #[arg(long)]
        url: Option<String>,

        /// Username, or client ID with client-credentials
        #[arg(long)]
        username: Option<String>,

        /// Authentication mode (basic, client-credentials)
        #[arg(long)]
        auth_mode: Option<AuthMode>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Manage the saved password or client secret
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },

    /// Retrieve the LAPS password for an account on a computer
    Password {
        /// Computer serial number
        serial_number: String,

        /// LAPS account name
        username: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show or change LAPS rotation settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum CredentialsAction {
    /// Save the password or client secret, read from the first line of stdin
    ///
    /// The secret is never accepted as an argument. Pipe it in for
    /// scripted use: `printenv JAMF_SECRET | jamf-laps credentials save`.
    Save,

    /// Remove the saved secret
    Clear,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Change settings, keeping unspecified values
    Set {
        #[arg(long)]
        auto_deploy: Option<bool>,

        #[arg(long)]
        auto_rotate: Option<bool>,

        /// Password rotation time in seconds
        #[arg(long)]
        rotation_time: Option<String>,

        /// Auto rotate expiration time in seconds
        #[arg(long)]
        expiration_time: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::default_path().map_err(|e| commands::alert(e.into()))?,
    };
    let config =
        AppConfig::load_from_path(&config_path).map_err(|e| commands::alert(e.into()))?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_logging(level);

    match cli.command {
        Commands::Configure {
            url,
            username,
            auth_mode,
            timeout,
        } => commands::configure(
            &config_path,
            ConfigureArgs {
                url,
                username,
                auth_mode,
                timeout,
            },
        ),
        Commands::Credentials { action } => {
            let store = credential_store(&config);
            match action {
                CredentialsAction::Save => {
                    let secret = prompt_secret(&config)?;
                    commands::save_credentials(&config, &store, secret).await
                }
                CredentialsAction::Clear => commands::clear_credentials(&store).await,
            }
        }
        Commands::Password {
            serial_number,
            username,
            format,
        } => {
            let store = credential_store(&config);
            let orchestrator = commands::connect(&config, &store).await?;
            commands::password(&orchestrator, &serial_number, &username, format).await
        }
        Commands::Settings { action } => {
            let store = credential_store(&config);
            let orchestrator = commands::connect(&config, &store).await?;
            match action {
                SettingsAction::Show { format } => {
                    commands::show_settings(&orchestrator, format).await
                }
                SettingsAction::Set {
                    auto_deploy,
                    auto_rotate,
                    rotation_time,
                    expiration_time,
                } => {
                    let edits = PolicyEdits {
                        auto_deploy,
                        auto_rotate,
                        rotation_time,
                        expiration_time,
                    };
                    commands::update_settings(&orchestrator, edits).await
                }
            }
        }
    }
}

fn credential_store(config: &AppConfig) -> CredentialStore {
    CredentialStore::new(create_store(config.credential_backend))
}

fn prompt_secret(config: &AppConfig) -> Result<Secret> {
    if io::stdin().is_terminal() {
        let (_, secret_label) = config.auth_mode.labels();
        eprint!("{} ", secret_label);
    }
    commands::read_secret(io::stdin().lock())
}
