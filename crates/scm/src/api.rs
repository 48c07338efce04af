//! Capability set the enforcers consume from GitHub.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::rate::RateInfo;
use crate::types::{Commit, Issue};

/// A response value together with the rate-limit state it was served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rated<T> {
    pub value: T,
    pub rate: Option<RateInfo>,
}

impl<T> Rated<T> {
    pub const fn new(value: T, rate: Option<RateInfo>) -> Self {
        Self { value, rate }
    }
}

/// GitHub issue and pull request operations.
///
/// `number` is the pull request number; GitHub addresses labels and comments
/// of a pull request through its issue.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// List one page (1-based) of commits on a pull request.
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        page: u32,
    ) -> Result<Rated<Vec<Commit>>, ApiError>;

    /// Fetch the issue backing a pull request, with its current labels.
    async fn get_issue(&self, owner: &str, repo: &str, number: u64)
        -> Result<Rated<Issue>, ApiError>;

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<Option<RateInfo>, ApiError>;

    async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<Option<RateInfo>, ApiError>;

    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<Option<RateInfo>, ApiError>;
}
