//! Public IP detection.

use crate::error::{Result, SudError};
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Well-known endpoint answering with the caller's public IPv4 address.
pub const CHECK_IP_URL: &str = "https://checkip.amazonaws.com/";

/// Source of the caller's current public address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressDiscovery: Send + Sync {
    /// Return the current public IPv4 address in dotted-quad form.
    async fn discover_address(&self) -> Result<String>;
}

/// IP detector backed by a plain-text "what is my IP" service.
pub struct IpDetector {
    client: reqwest::Client,
    url: String,
}

impl IpDetector {
    /// Create a detector querying [`CHECK_IP_URL`].
    pub fn new() -> Result<Self> {
        Self::with_url(CHECK_IP_URL.to_string())
    }

    /// Create a detector querying a custom service.
    pub fn with_url(url: String) -> Result<Self> {
        Ok(Self {
            client: crate::http::client()?,
            url,
        })
    }
}

#[async_trait]
impl AddressDiscovery for IpDetector {
    async fn discover_address(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SudError::AddressDiscovery(e.to_string()))?;

        let text = response
            .text()
            .await
            .map_err(|e| SudError::AddressDiscovery(e.to_string()))?;
        let address = text.trim();

        address.parse::<Ipv4Addr>().map_err(|_| {
            SudError::AddressDiscovery(format!("unexpected response from {}: {:?}", self.url, address))
        })?;

        tracing::debug!("Detected {} from {}", address, self.url);
        Ok(address.to_string())
    }
}
