//! Error types for webhook handling.

use scm::{ApiError, AuthError};
use thiserror::Error;
use tracing::error;

/// A webhook delivery could not be processed.
///
/// Mutations applied before the failure are left in place.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No credential could be obtained; no API call was attempted
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// A GitHub API call failed; later steps were skipped
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Log an API failure with the rate-limit state GitHub reported for it.
pub(crate) fn log_api_failure(err: &ApiError) {
    let operation = err.operation().map_or("client", |op| op.as_str());
    match err.rate() {
        Some(rate) => error!(
            operation,
            limit = rate.limit,
            remaining = rate.remaining,
            error = %err,
            "GitHub API call failed"
        ),
        None => error!(operation, error = %err, "GitHub API call failed"),
    }
}
