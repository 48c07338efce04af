//! `reqwest` implementation of [`GitHubApi`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use crate::api::{GitHubApi, Rated};
use crate::error::{ApiError, Operation};
use crate::rate::RateInfo;
use crate::types::{Commit, CommitEntry, GitHubErrorBody, Issue, IssueResponse};
use crate::COMMITS_PER_PAGE;

pub(crate) const USER_AGENT_VALUE: &str = concat!("signoff/", env!("CARGO_PKG_VERSION"));

/// Headers GitHub expects on every REST call.
pub(crate) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        "X-GitHub-Api-Version",
        HeaderValue::from_static("2022-11-28"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers
}

/// GitHub REST client bound to one bearer token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a client for `base_url` (e.g. `https://api.github.com` or a
    /// GitHub Enterprise `/api/v3` root).
    pub fn new(token: &str, base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn issue_url(&self, owner: &str, repo: &str, number: u64) -> String {
        format!("{}/repos/{owner}/{repo}/issues/{number}", self.base_url)
    }

    /// Send a request, failing on non-success statuses. Returns the response
    /// with the rate-limit state it carried.
    async fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<(Response, Option<RateInfo>), ApiError> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|source| ApiError::Http {
                operation,
                source,
                rate: None,
            })?;

        let rate = RateInfo::from_headers(response.headers());
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GitHubErrorBody>(&body)
                .map(|error| error.message)
                .unwrap_or(body);
            return Err(ApiError::Status {
                operation,
                status: status.as_u16(),
                message,
                rate,
            });
        }

        Ok((response, rate))
    }

    async fn read_json<T: DeserializeOwned>(
        operation: Operation,
        response: Response,
        rate: Option<RateInfo>,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|source| ApiError::Http {
                operation,
                source,
                rate,
            })
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self))]
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        page: u32,
    ) -> Result<Rated<Vec<Commit>>, ApiError> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}/commits", self.base_url);
        let request = self.client.get(&url).query(&[
            ("per_page", COMMITS_PER_PAGE.to_string()),
            ("page", page.to_string()),
        ]);

        let (response, rate) = self.send(Operation::ListCommits, request).await?;
        let entries: Vec<CommitEntry> =
            Self::read_json(Operation::ListCommits, response, rate).await?;

        debug!(count = entries.len(), "Listed pull request commits");
        Ok(Rated::new(
            entries.into_iter().map(Commit::from).collect(),
            rate,
        ))
    }

    #[instrument(skip(self))]
    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Rated<Issue>, ApiError> {
        let request = self.client.get(self.issue_url(owner, repo, number));

        let (response, rate) = self.send(Operation::GetIssue, request).await?;
        let issue: IssueResponse = Self::read_json(Operation::GetIssue, response, rate).await?;

        Ok(Rated::new(Issue::from(issue), rate))
    }

    #[instrument(skip(self))]
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<Option<RateInfo>, ApiError> {
        let url = format!("{}/labels", self.issue_url(owner, repo, number));
        let request = self.client.post(&url).json(&json!({ "labels": labels }));

        let (_, rate) = self.send(Operation::AddLabels, request).await?;
        Ok(rate)
    }

    #[instrument(skip(self))]
    async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<Option<RateInfo>, ApiError> {
        let url = format!(
            "{}/labels/{}",
            self.issue_url(owner, repo, number),
            urlencoding::encode(label)
        );
        let request = self.client.delete(&url);

        let (_, rate) = self.send(Operation::RemoveLabel, request).await?;
        Ok(rate)
    }

    #[instrument(skip(self, body))]
    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<Option<RateInfo>, ApiError> {
        let url = format!("{}/comments", self.issue_url(owner, repo, number));
        let request = self.client.post(&url).json(&json!({ "body": body }));

        let (_, rate) = self.send(Operation::CreateComment, request).await?;
        Ok(rate)
    }
}
