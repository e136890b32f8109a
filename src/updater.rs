//! Reconciliation of the managed A record with the current public address.

use crate::config::Config;
use crate::detector::{AddressDiscovery, IpDetector};
use crate::error::Result;
use crate::notifier::{Notifier, TelegramNotifier};
use crate::providers::{RecordClient, ScalewayClient};
use crate::record::ARecordInfo;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// What a reconciliation cycle did to the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    /// No record existed, one was created.
    Created { address: String },
    /// Record already pointed at the current address.
    Unchanged { address: String },
    /// Record pointed elsewhere and was changed.
    Changed { previous: String, address: String },
}

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub hostname: String,
    #[serde(flatten)]
    pub status: UpdateStatus,
    pub timestamp: DateTime<Utc>,
}

/// Keeps the A record of the configured hostname pointed at the current
/// public address.
pub struct Updater {
    config: Config,
    discovery: Box<dyn AddressDiscovery>,
    records: Box<dyn RecordClient>,
    notifier: Box<dyn Notifier>,
}

impl Updater {
    /// Create an updater talking to Scaleway, checkip and Telegram.
    pub fn new(config: Config) -> Result<Self> {
        let discovery = IpDetector::new()?;
        let records = ScalewayClient::new(config.api_secret().to_string())?;
        let notifier = TelegramNotifier::new(config.telegram().cloned())?;

        Ok(Self::with_components(
            config,
            Box::new(discovery),
            Box::new(records),
            Box::new(notifier),
        ))
    }

    /// Create an updater from explicit collaborators.
    pub fn with_components(
        config: Config,
        discovery: Box<dyn AddressDiscovery>,
        records: Box<dyn RecordClient>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            discovery,
            records,
            notifier,
        }
    }

    /// Run a single reconciliation cycle.
    ///
    /// Notification failures are logged and never fail the cycle.
    pub async fn update(&self) -> Result<UpdateReport> {
        let hostname = self.config.hostname();
        let info = ARecordInfo::from_hostname(hostname)?;

        let previous = self.records.get_record(&info).await?;
        let detected = self.discovery.discover_address().await?;

        let status = match previous.and_then(|record| record.address) {
            None => {
                info!("No 'A' record found for {}", hostname);
                let record = self.records.add_record(&info, &detected).await?;
                info!(
                    "'A' record added for {}: {}",
                    hostname,
                    record.address.as_deref().unwrap_or(&detected)
                );
                self.notify(&detected, None).await;
                UpdateStatus::Created { address: detected }
            }
            Some(previous) if previous == detected => {
                info!("No IP change detected for {}: {}", hostname, previous);
                UpdateStatus::Unchanged { address: previous }
            }
            Some(previous) => {
                info!(
                    "IP address for {} has changed: {} -> {}",
                    hostname, previous, detected
                );
                let record = self.records.change_record(&info, &detected).await?;
                info!(
                    "'A' record modified for {}: {} -> {}",
                    hostname,
                    previous,
                    record.address.as_deref().unwrap_or(&detected)
                );
                self.notify(&detected, Some(&previous)).await;
                UpdateStatus::Changed {
                    previous,
                    address: detected,
                }
            }
        };

        Ok(UpdateReport {
            hostname: hostname.to_string(),
            status,
            timestamp: Utc::now(),
        })
    }

    /// Run reconciliation cycles until `shutdown` completes.
    ///
    /// A failing cycle is logged and the loop carries on after the usual
    /// wait. The wait itself is interrupted by `shutdown`.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.cycle() => {}
            }
        }

        info!("Exiting...");
    }

    async fn cycle(&self) {
        if let Err(e) = self.update().await {
            error!("Error while updating: {}", e);
        }

        let frequency = self.config.frequency();
        info!(
            "Wait {} before next check ..zzZZ..",
            natural_delay(frequency)
        );
        tokio::time::sleep(frequency).await;
    }

    async fn notify(&self, address: &str, previous: Option<&str>) {
        if let Err(e) = self
            .notifier
            .notify(self.config.hostname(), address, previous)
            .await
        {
            warn!("{}", e);
        }
    }
}

/// Human-friendly rendering of a delay, e.g. "5 minutes".
fn natural_delay(delay: Duration) -> String {
    let secs = delay.as_secs();
    let (count, unit) = match secs {
        0..=59 => (secs, "second"),
        60..=3599 => (secs / 60, "minute"),
        3600..=86399 => (secs / 3600, "hour"),
        _ => (secs / 86400, "day"),
    };

    match count {
        1 if unit == "hour" => "an hour".to_string(),
        1 => format!("a {}", unit),
        n => format!("{} {}s", n, unit),
    }
}
