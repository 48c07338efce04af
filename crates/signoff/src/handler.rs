//! Per-delivery pipeline: token → client → enforcers.

use std::sync::Arc;

use scm::{
    AppAuthenticator, AppCredentials, AuthError, ClientFactory, GitHubClientFactory,
    InstallationTokenExchange, TokenResolver,
};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::dco::{SignOffEnforcer, SignOffReport};
use crate::description::{DescriptionEnforcer, DescriptionOutcome};
use crate::error::{log_api_failure, HandlerError};
use crate::event::{PullRequestEvent, CLOSED_ACTION};

/// Result of handling one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HandlerReport {
    Ignored {
        reason: String,
    },
    Processed {
        /// `None` when the sign-off check is disabled
        signoff: Option<SignOffReport>,
        /// `None` when the description check is disabled
        description: Option<DescriptionOutcome>,
    },
}

/// Handles `pull_request` deliveries. Holds no per-delivery state.
pub struct PullRequestHandler {
    config: Config,
    tokens: TokenResolver,
    clients: Arc<dyn ClientFactory>,
}

impl PullRequestHandler {
    pub fn new(config: Config, tokens: TokenResolver, clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            config,
            tokens,
            clients,
        }
    }

    /// Wire the production GitHub collaborators for `config`.
    pub fn from_config(config: Config) -> Result<Self, HandlerError> {
        let exchange: Arc<dyn InstallationTokenExchange> =
            Arc::new(AppAuthenticator::new(&config.api_url)?);
        let tokens = TokenResolver::from_env(exchange);
        let clients = Arc::new(GitHubClientFactory::new(config.api_url.clone()));
        Ok(Self::new(config, tokens, clients))
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one delivery. The first failure ends processing and is
    /// returned; nothing already applied is rolled back.
    #[instrument(skip_all, fields(
        owner = %event.owner(),
        repo = %event.repo(),
        pr_number = event.number(),
        action = %event.action,
    ))]
    pub async fn handle(&self, event: &PullRequestEvent) -> Result<HandlerReport, HandlerError> {
        if event.action == CLOSED_ACTION {
            return Ok(HandlerReport::Ignored {
                reason: "pull request closed".to_string(),
            });
        }
        if !self.config.dco_check && !self.config.description_check {
            return Ok(HandlerReport::Ignored {
                reason: "all checks disabled".to_string(),
            });
        }

        let token = self
            .resolve_token(event)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to obtain installation token"))?;
        let api = self
            .clients
            .make_client(&token)
            .inspect_err(log_api_failure)?;

        let contributing_url = self
            .config
            .contributing_url_for(event.owner(), event.repo());

        let signoff = if self.config.dco_check {
            Some(
                SignOffEnforcer::new(api.as_ref(), &contributing_url)
                    .enforce(event)
                    .await?,
            )
        } else {
            None
        };

        let description = if self.config.description_check {
            Some(
                DescriptionEnforcer::new(
                    api.as_ref(),
                    &self.config.description_label,
                    &contributing_url,
                )
                .enforce(event)
                .await?,
            )
        } else {
            None
        };

        info!(?signoff, ?description, "Pull request processed");
        Ok(HandlerReport::Processed {
            signoff,
            description,
        })
    }

    async fn resolve_token(&self, event: &PullRequestEvent) -> Result<String, AuthError> {
        // The key file is only needed for the exchange.
        let credentials = if self.tokens.has_override() {
            AppCredentials::default()
        } else {
            self.config.app_credentials()?
        };
        self.tokens
            .resolve(event.installation_id(), &credentials)
            .await
    }
}
