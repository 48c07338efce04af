//! Configuration for the signoff service.

use std::env;
use std::path::PathBuf;

use scm::{AppCredentials, AuthError, DEFAULT_API_URL};

use crate::description::DEFAULT_DESCRIPTION_LABEL;

/// Service configuration, read from the environment by [`Config::default`].
#[derive(Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// GitHub App id.
    pub application_id: Option<u64>,
    /// PEM private key material.
    pub private_key: Option<String>,
    /// File holding the PEM private key, used when `private_key` is unset.
    pub private_key_path: Option<PathBuf>,
    /// Contributing guide linked from comments. Derived per repository when unset.
    pub contributing_url: Option<String>,
    /// Label for pull requests opened without a description.
    pub description_label: String,
    /// GitHub REST root (GitHub Enterprise: `https://host/api/v3`).
    pub api_url: String,
    /// Run the sign-off enforcer.
    pub dco_check: bool,
    /// Run the description enforcer.
    pub description_check: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            application_id: env::var("APPLICATION_ID")
                .ok()
                .and_then(|s| s.trim().parse().ok()),
            private_key: non_empty_var("PRIVATE_KEY"),
            private_key_path: non_empty_var("PRIVATE_KEY_PATH").map(PathBuf::from),
            contributing_url: non_empty_var("CONTRIBUTING_URL"),
            description_label: non_empty_var("DESCRIPTION_LABEL")
                .unwrap_or_else(|| DEFAULT_DESCRIPTION_LABEL.to_string()),
            api_url: non_empty_var("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            dco_check: flag_var("DCO_CHECK", true),
            description_check: flag_var("DESCRIPTION_CHECK", true),
        }
    }
}

impl Config {
    /// App credentials for the installation-token exchange. Reads
    /// `private_key_path` when no inline key is configured.
    pub fn app_credentials(&self) -> Result<AppCredentials, AuthError> {
        let private_key = match (&self.private_key, &self.private_key_path) {
            (Some(key), _) => Some(key.clone()),
            (None, Some(path)) => Some(std::fs::read_to_string(path).map_err(|source| {
                AuthError::KeyFile {
                    path: path.clone(),
                    source,
                }
            })?),
            (None, None) => None,
        };

        Ok(AppCredentials {
            app_id: self.application_id,
            private_key,
        })
    }

    /// Contributing guide for a repository.
    #[must_use]
    pub fn contributing_url_for(&self, owner: &str, repo: &str) -> String {
        self.contributing_url.clone().unwrap_or_else(|| {
            format!("https://github.com/{owner}/{repo}/blob/master/CONTRIBUTING.md")
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("application_id", &self.application_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("contributing_url", &self.contributing_url)
            .field("description_label", &self.description_label)
            .field("api_url", &self.api_url)
            .field("dco_check", &self.dco_check)
            .field("description_check", &self.description_check)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn flag_var(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}
