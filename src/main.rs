//! sud - Scaleway dynamic DNS updater.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use std::path::PathBuf;
use sud::config::{self, Config, DEFAULT_FREQUENCY_SECS};
use sud::record::ARecordInfo;
use sud::updater::{UpdateReport, UpdateStatus, Updater};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "sud")]
#[command(about = "Keep a Scaleway DNS A record pointed at your public IP")]
#[command(version)]
struct Cli {
    /// Load the configuration file from a specific location
    #[arg(short, long = "config-file", global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a new configuration file
    Init {
        /// Fully-qualified hostname of the A record
        #[arg(short = 'H', long)]
        hostname: Option<String>,

        /// Scaleway API secret key
        #[arg(short = 's', long)]
        api_secret: Option<String>,

        /// Check frequency in seconds
        #[arg(short, long, default_value_t = DEFAULT_FREQUENCY_SECS)]
        frequency: u64,

        /// Send Telegram notifications to a chat using a bot token
        #[arg(
            long,
            num_args = 2,
            value_names = ["CHAT_ID", "TOKEN"],
            allow_hyphen_values = true
        )]
        telegram_notifications: Option<Vec<String>>,
    },

    /// Check and update the record forever
    Run,

    /// Check and update the record once
    Update {
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config_file.unwrap_or_else(config::default_path);

    match cli.command {
        Commands::Init {
            hostname,
            api_secret,
            frequency,
            telegram_notifications,
        } => {
            cmd_init(
                config_path,
                hostname,
                api_secret,
                frequency,
                telegram_notifications,
            )?;
        }
        Commands::Run => {
            let config = Config::load_from(&config_path)?;
            cmd_run(config).await?;
        }
        Commands::Update { json } => {
            let config = Config::load_from(&config_path)?;
            cmd_update(config, json).await?;
        }
    }

    Ok(())
}

fn cmd_init(
    config_path: PathBuf,
    hostname: Option<String>,
    api_secret: Option<String>,
    frequency: u64,
    telegram: Option<Vec<String>>,
) -> anyhow::Result<()> {
    let hostname = match hostname {
        Some(hostname) => hostname,
        None => Input::<String>::new()
            .with_prompt("Hostname")
            .validate_with(|input: &String| {
                ARecordInfo::from_hostname(input)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()?,
    };

    let api_secret = match api_secret {
        Some(secret) => secret,
        None => Password::new()
            .with_prompt("Scaleway API secret")
            .with_confirmation(
                "Repeat for confirmation",
                "Error: the two entered values do not match.",
            )
            .interact()?,
    };

    let mut builder = Config::builder()
        .hostname(hostname)
        .api_secret(api_secret)
        .frequency(frequency);

    if let Some([chat_id, token]) = telegram.as_deref() {
        let chat_id: i64 = chat_id
            .parse()
            .with_context(|| format!("Invalid Telegram chat id: {}", chat_id))?;
        builder = builder.telegram(chat_id, token.clone());
    }

    let config = builder.build()?;
    config
        .save_to(&config_path)
        .with_context(|| format!("Cannot write {}", config_path.display()))?;

    println!("Configuration written to {}", config_path.display());
    Ok(())
}

async fn cmd_run(config: Config) -> anyhow::Result<()> {
    info!(
        hostname = config.hostname(),
        frequency_secs = config.frequency().as_secs(),
        notifications = config.telegram().is_some(),
        "Starting sud"
    );

    let updater = Updater::new(config)?;
    updater
        .run_until(async {
            let signal = shutdown_signal().await;
            info!("Received shutdown signal: {}", signal);
        })
        .await;

    Ok(())
}

async fn cmd_update(config: Config, json: bool) -> anyhow::Result<()> {
    let updater = Updater::new(config)?;
    let report = updater.update().await?;

    println!("{}", render_report(&report, json)?);
    Ok(())
}

fn render_report(report: &UpdateReport, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    Ok(match &report.status {
        UpdateStatus::Created { address } => {
            format!("{}: created ({})", report.hostname, address)
        }
        UpdateStatus::Unchanged { address } => {
            format!("{}: unchanged ({})", report.hostname, address)
        }
        UpdateStatus::Changed { previous, address } => {
            format!("{}: changed ({} -> {})", report.hostname, previous, address)
        }
    })
}

/// Wait for SIGTERM or SIGINT.
#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("Failed to setup signal handlers, falling back to Ctrl-C: {}", e);
            return ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

/// Wait for Ctrl-C.
#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "SIGINT",
        Err(e) => {
            tracing::error!("Failed to wait for Ctrl-C: {}", e);
            std::future::pending().await
        }
    }
}
