//! Error types for GitHub access.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::rate::RateInfo;

/// GitHub API operations issued by the enforcers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListCommits,
    GetIssue,
    AddLabels,
    RemoveLabel,
    CreateComment,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListCommits => "list_commits",
            Self::GetIssue => "get_issue",
            Self::AddLabels => "add_labels",
            Self::RemoveLabel => "remove_label",
            Self::CreateComment => "create_comment",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GitHub API call failed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or undecodable response body
    #[error("{operation} request failed: {source}")]
    Http {
        operation: Operation,
        #[source]
        source: reqwest::Error,
        rate: Option<RateInfo>,
    },

    /// GitHub answered with a non-success status
    #[error("{operation} failed: GitHub API error {status} - {message}")]
    Status {
        operation: Operation,
        status: u16,
        message: String,
        rate: Option<RateInfo>,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build GitHub HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Rate-limit state reported alongside the failure, when GitHub sent one.
    #[must_use]
    pub fn rate(&self) -> Option<&RateInfo> {
        match self {
            Self::Http { rate, .. } | Self::Status { rate, .. } => rate.as_ref(),
            Self::Client(_) => None,
        }
    }

    #[must_use]
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Http { operation, .. } | Self::Status { operation, .. } => Some(*operation),
            Self::Client(_) => None,
        }
    }
}

/// Installation token acquisition failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("event carries no installation id")]
    MissingInstallation,

    #[error("GitHub App id is not configured")]
    MissingAppId,

    #[error("GitHub App private key is not configured")]
    MissingPrivateKey,

    #[error("failed to read private key {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GitHub App private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign GitHub App JWT: {0}")]
    Jwt(#[source] jsonwebtoken::errors::Error),

    #[error("installation token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("installation token exchange rejected: {status} - {message}")]
    Rejected { status: u16, message: String },
}
