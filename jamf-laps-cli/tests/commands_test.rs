//! Integration tests for the CLI command handlers
//!
//! These tests run the handlers against a temporary config file, an
//! in-memory credential store and a mock Jamf Pro server.

use jamf_laps_cli::commands::{self, ConfigureArgs, OutputFormat, PolicyEdits};
use jamf_laps_core::{
    AppConfig, AuthMode, CredentialStore, DEFAULT_SERVICE, KeyringStore, MemoryStore, Secret,
};
use tempfile::TempDir;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn memory_credentials() -> CredentialStore {
    CredentialStore::new(Box::new(MemoryStore::new()))
}

async fn configured(server: &MockServer) -> (AppConfig, CredentialStore) {
    let config = AppConfig {
        server_url: server.uri(),
        username: "admin".to_string(),
        ..AppConfig::default()
    };
    let store = memory_credentials();
    commands::save_credentials(&config, &store, Secret::new("pass"))
        .await
        .unwrap();
    (config, store)
}

async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-123",
            "expires": "2030-01-01T00:00:00Z"
        })))
        .mount(server)
        .await;
}

#[test]
fn test_configure_updates_only_given_fields() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.toml");

    commands::configure(
        &path,
        ConfigureArgs {
            url: Some("https://example.jamfcloud.com/".to_string()),
            username: Some("admin".to_string()),
            ..ConfigureArgs::default()
        },
    )
    .unwrap();

    let summary = commands::configure(
        &path,
        ConfigureArgs {
            auth_mode: Some(AuthMode::ClientCredentials),
            ..ConfigureArgs::default()
        },
    )
    .unwrap();
    assert!(summary.contains("Client ID:"));

    let config = AppConfig::load_from_path(&path).unwrap();
    assert_eq!(config.server_url, "https://example.jamfcloud.com");
    assert_eq!(config.username, "admin");
    assert_eq!(config.auth_mode, AuthMode::ClientCredentials);
    assert_eq!(config.request_timeout_secs, 30);
}

#[tokio::test]
async fn test_save_credentials_requires_username() {
    let store = memory_credentials();
    let err = commands::save_credentials(&AppConfig::default(), &store, Secret::new("pass"))
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Credentials Error"));
    assert!(store.retrieve(DEFAULT_SERVICE).await.unwrap().is_none());
}

#[tokio::test]
async fn test_clear_credentials_then_connect_fails() {
    let server = MockServer::start().await;
    let (config, store) = configured(&server).await;

    commands::clear_credentials(&store).await.unwrap();

    let err = commands::connect(&config, &store).await.unwrap_err();
    assert!(err.to_string().contains("No saved credentials"));
}

#[tokio::test]
async fn test_connect_requires_server() {
    let store = memory_credentials();
    let err = commands::connect(&AppConfig::default(), &store)
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Configuration Error"));
}

#[tokio::test]
async fn test_password_json_output() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/JSSResource/computers/serialnumber/C02ABC123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "computer": { "general": { "id": 101 } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/computers-inventory/101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "general": { "managementId": "abc-def" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/local-admin-password/abc-def/account/ladmin/password"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "password": "Xk9!q2" })),
        )
        .mount(&server)
        .await;

    let (config, store) = configured(&server).await;
    let orchestrator = commands::connect(&config, &store).await.unwrap();

    let output = commands::password(&orchestrator, "C02ABC123", "ladmin", OutputFormat::Json)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["password"], "Xk9!q2");
    assert_eq!(value["serial_number"], "C02ABC123");
}

#[tokio::test]
async fn test_password_failure_prints_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (config, store) = configured(&server).await;
    let orchestrator = commands::connect(&config, &store).await.unwrap();

    let err = commands::password(&orchestrator, "C02ABC123", "ladmin", OutputFormat::Text)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Authentication Error: Could not authenticate. Please check the url and authentication details"
    );
}

#[tokio::test]
async fn test_update_settings_merges_edits() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/local-admin-password/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "autoDeployEnabled": true,
            "passwordRotationTime": 3600,
            "autoRotateEnabled": false,
            "autoRotateExpirationTime": 7776000
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v2/local-admin-password/settings"))
        .and(body_json(serde_json::json!({
            "autoDeployEnabled": true,
            "passwordRotationTime": 3600,
            "autoRotateEnabled": true,
            "autoRotateExpirationTime": 7776000
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (config, store) = configured(&server).await;
    let orchestrator = commands::connect(&config, &store).await.unwrap();

    let output = commands::update_settings(
        &orchestrator,
        PolicyEdits {
            auto_rotate: Some(true),
            ..PolicyEdits::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(output, "Saved LAPS settings");
}

#[tokio::test]
async fn test_update_settings_without_changes_skips_put() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v2/local-admin-password/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "autoDeployEnabled": true,
            "passwordRotationTime": 3600,
            "autoRotateEnabled": false,
            "autoRotateExpirationTime": 7776000
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (config, store) = configured(&server).await;
    let orchestrator = commands::connect(&config, &store).await.unwrap();

    let output = commands::update_settings(
        &orchestrator,
        PolicyEdits {
            rotation_time: Some("3600".to_string()),
            ..PolicyEdits::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(output, "No changes to save");
}

#[tokio::test]
async fn test_clear_credentials_removes_keyring_entry() {
    // Only a keyring that persists entries can be opened
    let keyring_store = match KeyringStore::try_new("jamf-laps-test-clear") {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    let store = CredentialStore::new(Box::new(keyring_store));
    let config = AppConfig {
        username: "admin".to_string(),
        ..AppConfig::default()
    };

    commands::save_credentials(&config, &store, Secret::new("pass"))
        .await
        .unwrap();
    assert!(store.retrieve(DEFAULT_SERVICE).await.unwrap().is_some());

    commands::clear_credentials(&store).await.unwrap();
    assert!(store.retrieve(DEFAULT_SERVICE).await.unwrap().is_none());
}
