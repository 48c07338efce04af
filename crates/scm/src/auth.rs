//! GitHub App authentication.
//!
//! A webhook delivery is processed with either a static override token (for
//! local and manual runs) or a short-lived installation token obtained by
//! signing an app JWT and exchanging it at
//! `POST /app/installations/{id}/access_tokens`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::client::default_headers;
use crate::error::AuthError;
use crate::types::GitHubErrorBody;

/// Environment variable holding a static token that bypasses the
/// installation-token exchange.
pub const OVERRIDE_TOKEN_ENV: &str = "personal_access_token";

/// GitHub rejects app JWTs valid for more than ten minutes.
const JWT_LIFETIME_SECS: i64 = 9 * 60;
/// Backdating absorbs clock drift between us and GitHub.
const JWT_BACKDATE_SECS: i64 = 60;

/// GitHub App identity used for the installation-token exchange.
#[derive(Clone, Default)]
pub struct AppCredentials {
    pub app_id: Option<u64>,
    /// PEM-encoded RSA private key
    pub private_key: Option<String>,
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Exchanges app credentials for an installation token.
#[async_trait]
pub trait InstallationTokenExchange: Send + Sync {
    async fn exchange_installation_token(
        &self,
        app_id: u64,
        installation_id: u64,
        private_key: &str,
    ) -> Result<String, AuthError>;
}

#[derive(Debug, Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Debug, Deserialize)]
struct InstallationTokenResponse {
    token: String,
}

/// Production [`InstallationTokenExchange`] talking to the GitHub REST API.
#[derive(Debug, Clone)]
pub struct AppAuthenticator {
    client: reqwest::Client,
    base_url: String,
}

impl AppAuthenticator {
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sign the RS256 JWT that identifies the app itself.
    pub fn app_jwt(app_id: u64, private_key: &str) -> Result<String, AuthError> {
        let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(AuthError::InvalidKey)?;

        let now = Utc::now();
        let claims = AppClaims {
            iat: (now - Duration::seconds(JWT_BACKDATE_SECS)).timestamp(),
            exp: (now + Duration::seconds(JWT_LIFETIME_SECS)).timestamp(),
            iss: app_id.to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(AuthError::Jwt)
    }
}

#[async_trait]
impl InstallationTokenExchange for AppAuthenticator {
    #[instrument(skip(self, private_key))]
    async fn exchange_installation_token(
        &self,
        app_id: u64,
        installation_id: u64,
        private_key: &str,
    ) -> Result<String, AuthError> {
        let jwt = Self::app_jwt(app_id, private_key)?;
        let url = format!(
            "{}/app/installations/{installation_id}/access_tokens",
            self.base_url
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {jwt}"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GitHubErrorBody>(&body)
                .map(|error| error.message)
                .unwrap_or(body);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let token: InstallationTokenResponse = response.json().await?;
        debug!("Obtained installation token");
        Ok(token.token)
    }
}

/// Produces the bearer token for one webhook delivery.
#[derive(Clone)]
pub struct TokenResolver {
    override_token: Option<String>,
    exchange: Arc<dyn InstallationTokenExchange>,
}

impl TokenResolver {
    /// An empty override counts as unset.
    pub fn new(override_token: Option<String>, exchange: Arc<dyn InstallationTokenExchange>) -> Self {
        Self {
            override_token: override_token.filter(|token| !token.is_empty()),
            exchange,
        }
    }

    /// Read the override token from [`OVERRIDE_TOKEN_ENV`].
    pub fn from_env(exchange: Arc<dyn InstallationTokenExchange>) -> Self {
        let resolver = Self::new(std::env::var(OVERRIDE_TOKEN_ENV).ok(), exchange);
        if resolver.has_override() {
            info!("Using {OVERRIDE_TOKEN_ENV} for all GitHub calls; installation tokens disabled");
        }
        resolver
    }

    #[must_use]
    pub fn has_override(&self) -> bool {
        self.override_token.is_some()
    }

    /// Return the override token verbatim when set, otherwise exchange the
    /// app credentials for an installation token.
    pub async fn resolve(
        &self,
        installation_id: Option<u64>,
        credentials: &AppCredentials,
    ) -> Result<String, AuthError> {
        if let Some(token) = &self.override_token {
            return Ok(token.clone());
        }

        let installation_id = installation_id.ok_or(AuthError::MissingInstallation)?;
        let app_id = credentials.app_id.ok_or(AuthError::MissingAppId)?;
        let private_key = credentials
            .private_key
            .as_deref()
            .ok_or(AuthError::MissingPrivateKey)?;

        self.exchange
            .exchange_installation_token(app_id, installation_id, private_key)
            .await
    }
}

impl std::fmt::Debug for TokenResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResolver")
            .field("override_token", &self.override_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
