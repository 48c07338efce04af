//! Construction of authenticated API clients.

use std::sync::Arc;

use crate::api::GitHubApi;
use crate::client::GitHubClient;
use crate::error::ApiError;
use crate::DEFAULT_API_URL;

/// Builds a [`GitHubApi`] bound to a resolved token.
pub trait ClientFactory: Send + Sync {
    fn make_client(&self, token: &str) -> Result<Arc<dyn GitHubApi>, ApiError>;
}

/// Factory for [`GitHubClient`]s against one API root.
#[derive(Debug, Clone)]
pub struct GitHubClientFactory {
    base_url: String,
}

impl GitHubClientFactory {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for GitHubClientFactory {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientFactory for GitHubClientFactory {
    fn make_client(&self, token: &str) -> Result<Arc<dyn GitHubApi>, ApiError> {
        Ok(Arc::new(GitHubClient::new(token, &self.base_url)?))
    }
}
