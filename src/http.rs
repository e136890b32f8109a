//! Shared HTTP client construction.

use crate::error::{Result, SudError};
use std::time::Duration;

/// Timeout applied to every outbound request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build an HTTP client with a bounded timeout.
pub(crate) fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("sud/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SudError::Config(format!("Failed to create HTTP client: {}", e)))
}
