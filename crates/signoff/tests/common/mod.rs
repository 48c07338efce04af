//! In-memory GitHub used by the enforcer, handler and server tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scm::{
    ApiError, AuthError, ClientFactory, Commit, GitHubApi, InstallationTokenExchange, Issue,
    Operation, RateInfo, Rated,
};
use serde_json::json;
use signoff::PullRequestEvent;

/// A recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListCommits { page: u32 },
    GetIssue,
    AddLabels(Vec<String>),
    RemoveLabel(String),
    CreateComment(String),
}

const RATE: RateInfo = RateInfo {
    limit: 5000,
    remaining: 4321,
    reset: None,
};

#[derive(Default)]
struct State {
    labels: Vec<String>,
    calls: Vec<Call>,
}

/// Fake pull request: paged commits, a mutable label set, and an optional
/// operation that fails.
pub struct FakeGitHub {
    pages: Vec<Vec<Commit>>,
    fail_on: Option<Operation>,
    state: Mutex<State>,
}

impl FakeGitHub {
    pub fn new(messages: &[&str], labels: &[&str]) -> Self {
        Self::with_pages(
            vec![messages.iter().map(|m| Commit::new(*m)).collect()],
            labels,
        )
    }

    pub fn with_pages(pages: Vec<Vec<Commit>>, labels: &[&str]) -> Self {
        Self {
            pages,
            fail_on: None,
            state: Mutex::new(State {
                labels: labels.iter().map(ToString::to_string).collect(),
                calls: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub fn failing_on(mut self, operation: Operation) -> Self {
        self.fail_on = Some(operation);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.state.lock().unwrap().labels.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, operation: Operation, call: Call) -> Result<(), ApiError> {
        self.state.lock().unwrap().calls.push(call);
        if self.fail_on == Some(operation) {
            return Err(ApiError::Status {
                operation,
                status: 502,
                message: "Server Error".to_string(),
                rate: Some(RATE),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn list_commits(
        &self,
        _owner: &str,
        _repo: &str,
        _number: u64,
        page: u32,
    ) -> Result<Rated<Vec<Commit>>, ApiError> {
        self.record(Operation::ListCommits, Call::ListCommits { page })?;
        let index = usize::try_from(page).unwrap() - 1;
        let commits = self.pages.get(index).cloned().unwrap_or_default();
        Ok(Rated::new(commits, Some(RATE)))
    }

    async fn get_issue(
        &self,
        _owner: &str,
        _repo: &str,
        _number: u64,
    ) -> Result<Rated<Issue>, ApiError> {
        self.record(Operation::GetIssue, Call::GetIssue)?;
        Ok(Rated::new(
            Issue {
                labels: self.labels(),
            },
            Some(RATE),
        ))
    }

    async fn add_labels(
        &self,
        _owner: &str,
        _repo: &str,
        _number: u64,
        labels: &[String],
    ) -> Result<Option<RateInfo>, ApiError> {
        self.record(Operation::AddLabels, Call::AddLabels(labels.to_vec()))?;
        let mut state = self.state.lock().unwrap();
        for label in labels {
            if !state.labels.contains(label) {
                state.labels.push(label.clone());
            }
        }
        Ok(Some(RATE))
    }

    async fn remove_label(
        &self,
        _owner: &str,
        _repo: &str,
        _number: u64,
        label: &str,
    ) -> Result<Option<RateInfo>, ApiError> {
        self.record(Operation::RemoveLabel, Call::RemoveLabel(label.to_string()))?;
        self.state.lock().unwrap().labels.retain(|l| l != label);
        Ok(Some(RATE))
    }

    async fn create_comment(
        &self,
        _owner: &str,
        _repo: &str,
        _number: u64,
        body: &str,
    ) -> Result<Option<RateInfo>, ApiError> {
        self.record(Operation::CreateComment, Call::CreateComment(body.to_string()))?;
        Ok(Some(RATE))
    }
}

/// Hands out the same fake for every token and remembers the tokens seen.
pub struct FakeFactory {
    pub api: Arc<FakeGitHub>,
    pub tokens: Mutex<Vec<String>>,
}

impl FakeFactory {
    pub fn new(api: Arc<FakeGitHub>) -> Self {
        Self {
            api,
            tokens: Mutex::new(Vec::new()),
        }
    }
}

impl ClientFactory for FakeFactory {
    fn make_client(&self, token: &str) -> Result<Arc<dyn GitHubApi>, ApiError> {
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(self.api.clone())
    }
}

/// Exchange that always succeeds or always fails.
pub struct FakeExchange {
    pub fail: bool,
    pub calls: Mutex<Vec<(u64, u64)>>,
}

impl FakeExchange {
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl InstallationTokenExchange for FakeExchange {
    async fn exchange_installation_token(
        &self,
        app_id: u64,
        installation_id: u64,
        _private_key: &str,
    ) -> Result<String, AuthError> {
        self.calls.lock().unwrap().push((app_id, installation_id));
        if self.fail {
            return Err(AuthError::Rejected {
                status: 401,
                message: "Bad credentials".to_string(),
            });
        }
        Ok("ghs_installation".to_string())
    }
}

/// Build a `pull_request` event for octo/widgets#42.
pub fn pr_event(action: &str, body: Option<&str>, association: &str) -> PullRequestEvent {
    serde_json::from_value(pr_payload(action, body, association)).unwrap()
}

pub fn pr_payload(action: &str, body: Option<&str>, association: &str) -> serde_json::Value {
    json!({
        "action": action,
        "number": 42,
        "pull_request": {
            "number": 42,
            "body": body,
            "author_association": association
        },
        "repository": {
            "name": "widgets",
            "owner": { "login": "octo" }
        },
        "installation": { "id": 99 }
    })
}

pub const GUIDE: &str = "https://example.com/CONTRIBUTING.md";
pub const SIGNED: &str = "feat: x\nSigned-off-by: a <a@b.com>";
