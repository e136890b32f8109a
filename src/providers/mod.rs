//! DNS provider clients.

mod scaleway;


pub use scaleway::ScalewayClient;

use crate::error::Result;
use crate::record::ARecordInfo;
use async_trait::async_trait;

/// Client for the "A" record of a single hostname.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordClient: Send + Sync {
    /// Look up the record matching `info.name` in `info.domain`.
    ///
    /// Returns `None` when the zone has no A record with exactly that name.
    async fn get_record(&self, info: &ARecordInfo) -> Result<Option<ARecordInfo>>;

    /// Create the record pointing at `address`.
    async fn add_record(&self, info: &ARecordInfo, address: &str) -> Result<ARecordInfo>;

    /// Replace the data of the existing record with `address`.
    async fn change_record(&self, info: &ARecordInfo, address: &str) -> Result<ARecordInfo>;
}
