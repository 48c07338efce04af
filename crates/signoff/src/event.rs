//! GitHub `pull_request` webhook payload (the subset the enforcers read).

use serde::Deserialize;

pub const OPENED_ACTION: &str = "opened";
pub const CLOSED_ACTION: &str = "closed";

const FIRST_TIME_CONTRIBUTOR: &str = "FIRST_TIME_CONTRIBUTOR";

/// A `pull_request` event delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    /// Action type (opened, synchronize, reopened, closed, ...)
    pub action: String,
    pub pull_request: PullRequest,
    pub repository: Repository,
    /// Absent for deliveries not routed through an app installation
    #[serde(default)]
    pub installation: Option<Installation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    /// GitHub sends `null` for an empty description
    #[serde(default)]
    pub body: Option<String>,
    /// Author's relationship to the repository (OWNER, CONTRIBUTOR, ...)
    #[serde(default)]
    pub author_association: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Installation {
    pub id: u64,
}

impl PullRequest {
    #[must_use]
    pub fn is_first_time_contributor(&self) -> bool {
        self.author_association.as_deref() == Some(FIRST_TIME_CONTRIBUTOR)
    }

    /// Whether the body has any non-whitespace content.
    #[must_use]
    pub fn has_description(&self) -> bool {
        self.body.as_deref().is_some_and(|body| !body.trim().is_empty())
    }
}

impl PullRequestEvent {
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.repository.owner.login
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repository.name
    }

    #[must_use]
    pub fn number(&self) -> u64 {
        self.pull_request.number
    }

    #[must_use]
    pub fn installation_id(&self) -> Option<u64> {
        self.installation.map(|installation| installation.id)
    }

    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.action == OPENED_ACTION
    }
}
