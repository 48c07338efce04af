//! Pull request policy bot for GitHub.
//!
//! This crate provides:
//! - Webhook payload types for `pull_request` events
//! - The sign-off (DCO) enforcer: an explicit label state machine driven by
//!   commit inspection
//! - The description enforcer for newly opened pull requests
//! - The per-delivery handler pipeline (token → client → enforcers)
//! - An HTTP server receiving GitHub deliveries

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dco;
pub mod description;
pub mod error;
pub mod event;
pub mod handler;
pub mod server;

pub use config::Config;
pub use dco::{CommitStatus, LabelAction, LabelState, SignOffEnforcer, SignOffReport};
pub use description::{DescriptionEnforcer, DescriptionOutcome};
pub use error::HandlerError;
pub use event::PullRequestEvent;
pub use handler::{HandlerReport, PullRequestHandler};
