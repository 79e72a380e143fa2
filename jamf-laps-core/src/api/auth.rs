//! Bearer token acquisition.
//!
//! Two schemes are supported, selected by [`AuthMode`]:
//!
//! - **Basic**: `POST /api/v1/auth/token` with an `Authorization: Basic`
//!   header; the server answers `{"token": ..., "expires": ...}`.
//! - **Client credentials**: `POST /api/oauth/token` with a form body
//!   carrying `client_id`, `client_secret` and
//!   `grant_type=client_credentials`; the server answers
//!   `{"access_token": ..., "expires_in": ...}`.
//!
//! Tokens are never cached here.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use super::{endpoint, read_json};
use crate::error::LapsError;
use crate::model::{AuthMode, BearerToken, Credentials};
use crate::store::Secret;

const BASIC_TOKEN_PATH: &[&str] = &["api", "v1", "auth", "token"];
const OAUTH_TOKEN_PATH: &[&str] = &["api", "oauth", "token"];

#[derive(Deserialize)]
struct BasicTokenResponse {
    token: String,
    expires: String,
}

#[derive(Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    expires_in: i64,
}

/// A token request, tagged by scheme.
#[derive(Debug, Clone, Copy)]
pub enum AuthGrant<'a> {
    Basic {
        username: &'a str,
        password: &'a Secret,
    },
    ClientCredentials {
        client_id: &'a str,
        client_secret: &'a Secret,
    },
}

impl<'a> AuthGrant<'a> {
    /// Build the grant for `mode` from stored credentials.
    pub fn new(mode: AuthMode, credentials: &'a Credentials) -> Self {
        match mode {
            AuthMode::Basic => Self::Basic {
                username: &credentials.identifier,
                password: &credentials.secret,
            },
            AuthMode::ClientCredentials => Self::ClientCredentials {
                client_id: &credentials.identifier,
                client_secret: &credentials.secret,
            },
        }
    }

    /// Path segments of the token endpoint for this scheme.
    pub fn token_path(&self) -> &'static [&'static str] {
        match self {
            Self::Basic { .. } => BASIC_TOKEN_PATH,
            Self::ClientCredentials { .. } => OAUTH_TOKEN_PATH,
        }
    }
}

/// Exchanges credentials for bearer tokens.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Obtain a bearer token from `server_url`.
    ///
    /// An unparseable URL, a transport failure or an unexpected body all
    /// yield [`LapsError::AuthenticationFailed`].
    pub async fn authenticate(
        &self,
        server_url: &str,
        credentials: &Credentials,
        mode: AuthMode,
    ) -> Result<BearerToken, LapsError> {
        tracing::info!("About to fetch authentication token ({})", mode);

        let grant = AuthGrant::new(mode, credentials);
        let url = endpoint(server_url, grant.token_path()).ok_or_else(|| {
            tracing::error!("Server URL {:?} is not usable", server_url);
            LapsError::AuthenticationFailed { status: None }
        })?;

        let request = self.http.post(url);
        let failed = |status| {
            tracing::error!("No authentication token received");
            LapsError::AuthenticationFailed { status }
        };

        let token = match grant {
            AuthGrant::Basic { username, password } => {
                let request = request.basic_auth(username, Some(password.expose()));
                let (body, status) = read_json::<BasicTokenResponse>(request, "authentication")
                    .await
                    .map_err(failed)?;

                BearerToken::new(body.token, status).with_expiry(parse_expires(&body.expires))
            }
            AuthGrant::ClientCredentials {
                client_id,
                client_secret,
            } => {
                let request = request.form(&[
                    ("client_id", client_id),
                    ("client_secret", client_secret.expose()),
                    ("grant_type", "client_credentials"),
                ]);
                let (body, status) = read_json::<OAuthTokenResponse>(request, "authentication")
                    .await
                    .map_err(failed)?;

                let expires_at = Duration::try_seconds(body.expires_in)
                    .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
                BearerToken::new(body.access_token, status).with_expiry(expires_at)
            }
        };

        tracing::info!("Authentication token received");
        Ok(token)
    }
}

fn parse_expires(expires: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(expires)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
