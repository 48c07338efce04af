//! Commit sign-off (DCO) enforcement.
//!
//! The `no-dco` label is driven by an explicit state machine:
//!
//! | label   | commits      | action                 | label after |
//! |---------|--------------|------------------------|-------------|
//! | absent  | has unsigned | add label + comment    | present     |
//! | present | has unsigned | none                   | present     |
//! | present | all signed   | remove label           | absent      |
//! | absent  | all signed   | none                   | absent      |
//!
//! The starting state is re-read from GitHub on every delivery.

use scm::{ApiError, Commit, GitHubApi, Issue, COMMITS_PER_PAGE};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::log_api_failure;
use crate::event::PullRequestEvent;

pub const NO_DCO_LABEL: &str = "no-dco";
pub const NEW_CONTRIBUTOR_LABEL: &str = "new-contributor";

const SIGN_OFF_TRAILER: &str = "Signed-off-by:";

/// Whether a commit message carries a sign-off trailer.
#[must_use]
pub fn is_signed(message: &str) -> bool {
    message.contains(SIGN_OFF_TRAILER)
}

/// True if any commit lacks a message or a sign-off.
#[must_use]
pub fn has_unsigned(commits: &[Commit]) -> bool {
    commits
        .iter()
        .any(|commit| !commit.message.as_deref().is_some_and(is_signed))
}

/// Presence of the `no-dco` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelState {
    Absent,
    Present,
}

impl LabelState {
    #[must_use]
    pub fn of(issue: &Issue) -> Self {
        if issue.has_label(NO_DCO_LABEL) {
            Self::Present
        } else {
            Self::Absent
        }
    }
}

/// Sign-off status of a pull request's commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    AllSigned,
    HasUnsigned,
}

impl CommitStatus {
    #[must_use]
    pub fn from_commits(commits: &[Commit]) -> Self {
        if has_unsigned(commits) {
            Self::HasUnsigned
        } else {
            Self::AllSigned
        }
    }
}

/// Mutation the state machine asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAction {
    None,
    AddLabelAndComment,
    RemoveLabel,
}

/// Apply the transition table. Returns the action and the resulting state.
#[must_use]
pub const fn transition(state: LabelState, status: CommitStatus) -> (LabelAction, LabelState) {
    match (state, status) {
        (LabelState::Absent, CommitStatus::HasUnsigned) => {
            (LabelAction::AddLabelAndComment, LabelState::Present)
        }
        (LabelState::Present, CommitStatus::HasUnsigned) => (LabelAction::None, LabelState::Present),
        (LabelState::Present, CommitStatus::AllSigned) => (LabelAction::RemoveLabel, LabelState::Absent),
        (LabelState::Absent, CommitStatus::AllSigned) => (LabelAction::None, LabelState::Absent),
    }
}

/// Comment posted when the `no-dco` label is first applied.
#[must_use]
pub fn unsigned_commits_comment(contributing_url: &str) -> String {
    format!(
        "Thank you for your contribution. I've just checked and your commit doesn't appear to be \
         signed-off. That's something we need before your Pull Request can be merged. \
         Please see our [contributing guide]({contributing_url}).\n\
         Tip: if you only have one commit so far then run: `git commit --amend --signoff` \
         and then `git push --force`."
    )
}

/// What one sign-off pass observed and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignOffReport {
    pub commits_checked: usize,
    pub status: CommitStatus,
    pub previous_state: LabelState,
    pub action: LabelAction,
    pub new_contributor_labelled: bool,
}

/// Keeps the `no-dco` label in step with the commits on a pull request.
pub struct SignOffEnforcer<'a> {
    api: &'a dyn GitHubApi,
    contributing_url: &'a str,
}

impl<'a> SignOffEnforcer<'a> {
    pub fn new(api: &'a dyn GitHubApi, contributing_url: &'a str) -> Self {
        Self {
            api,
            contributing_url,
        }
    }

    /// Run one pass. Any API failure ends the pass immediately; mutations
    /// already made are kept.
    #[instrument(skip_all, fields(owner = %event.owner(), repo = %event.repo(), pr_number = event.number()))]
    pub async fn enforce(&self, event: &PullRequestEvent) -> Result<SignOffReport, ApiError> {
        let (owner, repo, number) = (event.owner(), event.repo(), event.number());

        let commits = self.list_all_commits(owner, repo, number).await?;
        let status = CommitStatus::from_commits(&commits);
        debug!(commits = commits.len(), ?status, "Checked commit sign-offs");

        let new_contributor =
            event.is_opened() && event.pull_request.is_first_time_contributor();
        if new_contributor {
            info!(label = NEW_CONTRIBUTOR_LABEL, "Labelling first-time contributor");
            self.api
                .add_labels(owner, repo, number, &[NEW_CONTRIBUTOR_LABEL.to_string()])
                .await
                .inspect_err(log_api_failure)?;
        }

        let issue = self
            .api
            .get_issue(owner, repo, number)
            .await
            .inspect_err(log_api_failure)?;
        debug!(labels = ?issue.value.labels, "Current labels");

        let previous_state = LabelState::of(&issue.value);
        let (action, next_state) = transition(previous_state, status);

        match action {
            LabelAction::None => {
                debug!(state = ?previous_state, "No-dco label already up to date");
            }
            LabelAction::AddLabelAndComment => {
                info!(label = NO_DCO_LABEL, "Applying label");
                self.api
                    .add_labels(owner, repo, number, &[NO_DCO_LABEL.to_string()])
                    .await
                    .inspect_err(log_api_failure)?;

                let rate = self
                    .api
                    .create_comment(
                        owner,
                        repo,
                        number,
                        &unsigned_commits_comment(self.contributing_url),
                    )
                    .await
                    .inspect_err(log_api_failure)?;
                if let Some(rate) = rate {
                    debug!(%rate, "Posted sign-off comment");
                }
            }
            LabelAction::RemoveLabel => {
                info!(label = NO_DCO_LABEL, "All commits signed, removing label");
                self.api
                    .remove_label(owner, repo, number, NO_DCO_LABEL)
                    .await
                    .inspect_err(log_api_failure)?;
            }
        }
        debug!(state = ?next_state, "Sign-off check complete");

        Ok(SignOffReport {
            commits_checked: commits.len(),
            status,
            previous_state,
            action,
            new_contributor_labelled: new_contributor,
        })
    }

    /// Fetch every page of commits; a short page ends the listing.
    async fn list_all_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Commit>, ApiError> {
        let mut commits = Vec::new();
        let mut page = 1;
        loop {
            let batch = self
                .api
                .list_commits(owner, repo, number, page)
                .await
                .inspect_err(log_api_failure)?;
            if let Some(rate) = batch.rate {
                debug!(page, %rate, "Listed commits");
            }

            let fetched = batch.value.len();
            commits.extend(batch.value);
            if fetched < COMMITS_PER_PAGE {
                return Ok(commits);
            }
            page += 1;
        }
    }
}
