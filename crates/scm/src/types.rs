//! GitHub entities as seen by the enforcers.

use serde::{Deserialize, Serialize};

/// A commit on a pull request. Only the message is consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub message: Option<String>,
}

impl Commit {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// A commit whose message GitHub did not return.
    #[must_use]
    pub const fn without_message() -> Self {
        Self { message: None }
    }
}

/// Issue (or pull request) label state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub labels: Vec<String>,
}

impl Issue {
    #[must_use]
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }
}

// Wire shapes returned by the REST API.

#[derive(Debug, Deserialize)]
pub(crate) struct CommitEntry {
    #[serde(default)]
    commit: Option<CommitDetail>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: Option<String>,
}

impl From<CommitEntry> for Commit {
    fn from(entry: CommitEntry) -> Self {
        Self {
            message: entry.commit.and_then(|detail| detail.message),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueResponse {
    #[serde(default)]
    labels: Vec<LabelResponse>,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    name: String,
}

impl From<IssueResponse> for Issue {
    fn from(issue: IssueResponse) -> Self {
        Self {
            labels: issue.labels.into_iter().map(|label| label.name).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubErrorBody {
    pub message: String,
}
