//! Pull request description enforcement.
//!
//! Only newly opened pull requests are checked. The label is never removed
//! afterwards, even if a description is added later.

use scm::{ApiError, GitHubApi};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::log_api_failure;
use crate::event::PullRequestEvent;

/// Label applied to pull requests opened without a description.
pub const DEFAULT_DESCRIPTION_LABEL: &str = "invalid";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DescriptionOutcome {
    /// The action was not `opened`
    NotChecked,
    Present,
    Flagged { label: String },
}

#[must_use]
pub fn missing_description_comment(contributing_url: &str) -> String {
    format!(
        "Thank you for your contribution. I've just checked and your Pull Request doesn't \
         appear to have any description.\n\
         That's something we need before your Pull Request can be merged. \
         Please see our [contributing guide]({contributing_url})."
    )
}

pub struct DescriptionEnforcer<'a> {
    api: &'a dyn GitHubApi,
    label: &'a str,
    contributing_url: &'a str,
}

impl<'a> DescriptionEnforcer<'a> {
    pub fn new(api: &'a dyn GitHubApi, label: &'a str, contributing_url: &'a str) -> Self {
        Self {
            api,
            label,
            contributing_url,
        }
    }

    #[instrument(skip_all, fields(owner = %event.owner(), repo = %event.repo(), pr_number = event.number()))]
    pub async fn enforce(&self, event: &PullRequestEvent) -> Result<DescriptionOutcome, ApiError> {
        if !event.is_opened() {
            return Ok(DescriptionOutcome::NotChecked);
        }
        if event.pull_request.has_description() {
            debug!("Pull request has a description");
            return Ok(DescriptionOutcome::Present);
        }

        let (owner, repo, number) = (event.owner(), event.repo(), event.number());
        info!(label = %self.label, "Applying label for missing description");
        self.api
            .add_labels(owner, repo, number, &[self.label.to_string()])
            .await
            .inspect_err(log_api_failure)?;

        let rate = self
            .api
            .create_comment(
                owner,
                repo,
                number,
                &missing_description_comment(self.contributing_url),
            )
            .await
            .inspect_err(log_api_failure)?;
        if let Some(rate) = rate {
            debug!(%rate, "Posted description comment");
        }

        Ok(DescriptionOutcome::Flagged {
            label: self.label.to_string(),
        })
    }
}
