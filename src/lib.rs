//! # sud
//!
//! A small dynamic DNS updater for zones hosted on Scaleway DNS.
//!
//! ## Features
//!
//! - Periodic public IPv4 discovery
//! - Creates or updates a single "A" record through the Scaleway API
//! - Optional Telegram notification when the record changes
//! - Daemon mode with configurable check frequency and clean shutdown
//!
//! ## Usage
//!
//! ```bash
//! # Write /etc/sud/sud-config.toml interactively
//! sud init
//!
//! # Reconcile once
//! sud update
//!
//! # Reconcile forever
//! sud run
//! ```

pub mod config;
pub mod detector;
pub mod error;
mod http;
pub mod notifier;
pub mod providers;
pub mod record;
pub mod updater;

pub use config::{Config, ConfigBuilder, TelegramConfig};
pub use detector::{AddressDiscovery, IpDetector};
pub use error::{Result, SudError};
pub use notifier::{Notifier, TelegramNotifier};
pub use providers::{RecordClient, ScalewayClient};
pub use record::ARecordInfo;
pub use updater::{UpdateReport, UpdateStatus, Updater};
