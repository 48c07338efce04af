//! GitHub access layer for the signoff bot.
//!
//! This crate provides:
//! - The [`GitHubApi`] capability trait consumed by the enforcers
//! - A `reqwest`-backed [`GitHubClient`] implementing it
//! - Rate-limit extraction from GitHub response headers
//! - GitHub App authentication (JWT signing + installation token exchange)
//! - [`TokenResolver`] and [`ClientFactory`] used once per webhook delivery

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Every API call can fail

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod factory;
pub mod rate;
pub mod types;

pub use api::{GitHubApi, Rated};
pub use auth::{
    AppAuthenticator, AppCredentials, InstallationTokenExchange, TokenResolver,
    OVERRIDE_TOKEN_ENV,
};
pub use client::GitHubClient;
pub use error::{ApiError, AuthError, Operation};
pub use factory::{ClientFactory, GitHubClientFactory};
pub use rate::RateInfo;
pub use types::{Commit, Issue};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size used when listing pull request commits (GitHub's maximum).
pub const COMMITS_PER_PAGE: usize = 100;
