//! Configuration management for sud.

use crate::error::{Result, SudError};
use crate::record::ARecordInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default check frequency in seconds.
pub const DEFAULT_FREQUENCY_SECS: u64 = 300;

/// Smallest check frequency accepted by [`ConfigBuilder`].
pub const MIN_FREQUENCY_SECS: u64 = 60;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sud/sud-config.toml";

/// Runtime configuration, validated once at load time.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    hostname: String,

    /// Scaleway API secret key (or environment variable name if prefixed with $).
    #[serde(default)]
    api_secret: String,

    /// Check frequency in seconds.
    #[serde(default = "default_frequency")]
    frequency: u64,

    #[serde(default, skip_serializing_if = "Notifications::is_empty")]
    notifications: Notifications,
}

fn default_frequency() -> u64 {
    DEFAULT_FREQUENCY_SECS
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Notifications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    telegram: Option<TelegramConfig>,
}

impl Notifications {
    fn is_empty(&self) -> bool {
        self.telegram.is_none()
    }
}

/// Telegram bot settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Chat or channel receiving the messages.
    pub chat_id: i64,
    /// Bot token (or environment variable name if prefixed with $).
    pub token: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("chat_id", &self.chat_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("hostname", &self.hostname)
            .field("api_secret", &"<redacted>")
            .field("frequency", &self.frequency)
            .field("telegram", &self.notifications.telegram)
            .finish()
    }
}

impl Config {
    /// Start building a configuration from scratch.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Fully-qualified hostname of the managed record.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Scaleway API secret key.
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Delay between two reconciliation cycles.
    pub fn frequency(&self) -> Duration {
        Duration::from_secs(self.frequency)
    }

    /// Telegram settings, if notifications are enabled.
    pub fn telegram(&self) -> Option<&TelegramConfig> {
        self.notifications.telegram.as_ref()
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SudError::Config(format!(
                "Configuration file {} not found, run `sud init` first",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;

        config.hostname = config.hostname.trim().to_string();
        config.api_secret = resolve_env(&config.api_secret);
        if let Some(telegram) = config.notifications.telegram.as_mut() {
            telegram.token = resolve_env(&telegram.token);
        }

        config.validate()?;

        if config.frequency < MIN_FREQUENCY_SECS {
            tracing::warn!(
                "Frequency of {}s is below the recommended minimum of {}s",
                config.frequency,
                MIN_FREQUENCY_SECS
            );
        }

        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.frequency == 0 {
            return Err(SudError::Config(
                "Frequency must be at least one second".to_string(),
            ));
        }

        ARecordInfo::from_hostname(&self.hostname)
            .map_err(|e| SudError::Config(e.to_string()))?;

        if self.api_secret.trim().is_empty() {
            return Err(SudError::Config("API secret is required".to_string()));
        }

        if let Some(telegram) = &self.notifications.telegram {
            if telegram.token.trim().is_empty() {
                return Err(SudError::Config("Telegram bot token is required".to_string()));
            }
        }

        Ok(())
    }
}

/// Builder used by the setup flow to produce a validated [`Config`].
#[derive(Default)]
pub struct ConfigBuilder {
    hostname: Option<String>,
    api_secret: Option<String>,
    frequency: Option<u64>,
    telegram: Option<TelegramConfig>,
}

impl ConfigBuilder {
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = Some(api_secret.into());
        self
    }

    /// Check frequency in seconds.
    pub fn frequency(mut self, frequency: u64) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn telegram(mut self, chat_id: i64, token: impl Into<String>) -> Self {
        self.telegram = Some(TelegramConfig {
            chat_id,
            token: token.into(),
        });
        self
    }

    pub fn build(self) -> Result<Config> {
        let frequency = self.frequency.unwrap_or(DEFAULT_FREQUENCY_SECS);
        if frequency < MIN_FREQUENCY_SECS {
            return Err(SudError::Config(format!(
                "Minimum frequency is once per minute ({} seconds).",
                MIN_FREQUENCY_SECS
            )));
        }

        let config = Config {
            hostname: self.hostname.unwrap_or_default().trim().to_string(),
            api_secret: self.api_secret.unwrap_or_default(),
            frequency,
            notifications: Notifications {
                telegram: self.telegram,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// Resolve the configuration file to use when none is given explicitly.
pub fn default_path() -> PathBuf {
    let candidates = [
        dirs::config_dir().map(|p| p.join("sud").join("sud-config.toml")),
        Some(PathBuf::from(DEFAULT_CONFIG_PATH)),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Resolve environment variable references (values starting with $).
fn resolve_env(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| {
            tracing::warn!("Environment variable {} not set", var_name);
            value.to_string()
        })
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    const BASIC: &str = r#"
hostname = "my.host.name"
api_secret = "my-secret-key"
"#;

    const FULL: &str = r#"
hostname = "my.host.name"
api_secret = "my-secret-key"
frequency = 123

[notifications.telegram]
chat_id = -1234567890
token = "my-bot-token"
"#;

    #[test]
    fn test_load_basic_config() {
        let config = Config::from_toml(BASIC).unwrap();
        assert_eq!(config.hostname(), "my.host.name");
        assert_eq!(config.api_secret(), "my-secret-key");
        assert_eq!(config.frequency(), Duration::from_secs(300));
        assert!(config.telegram().is_none());
    }

    #[test]
    fn test_load_full_config() {
        let config = Config::from_toml(FULL).unwrap();
        assert_eq!(config.frequency(), Duration::from_secs(123));
        assert_eq!(
            config.telegram(),
            Some(&TelegramConfig {
                chat_id: -1234567890,
                token: "my-bot-token".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_error() {
        let err = Config::from_toml("hostname = ").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration file"));
    }

    #[test]
    fn test_missing_hostname() {
        let err = Config::from_toml(r#"api_secret = "x""#).unwrap_err();
        assert!(matches!(err, SudError::Config(_)));
        assert!(err.to_string().contains("hostname is required"));
    }

    #[test]
    fn test_missing_secret() {
        assert_err!(Config::from_toml(r#"hostname = "my.host.name""#));
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let err = Config::from_toml(
            r#"
hostname = "my.host.name"
api_secret = "my-secret-key"
frequency = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SudError::Config(_)));
        assert!(err.to_string().contains("at least one second"));
    }

    #[test]
    fn test_low_frequency_accepted_at_load() {
        let config = Config::from_toml(
            r#"
hostname = "my.host.name"
api_secret = "my-secret-key"
frequency = 30
"#,
        )
        .unwrap();
        assert_eq!(config.frequency(), Duration::from_secs(30));
    }

    #[test]
    fn test_hostname_trimmed_at_load() {
        let config = Config::from_toml(
            r#"
hostname = "  my.host.name "
api_secret = "my-secret-key"
"#,
        )
        .unwrap();
        assert_eq!(config.hostname(), "my.host.name");
    }

    #[test]
    fn test_hostname_trimmed_by_builder() {
        let config = Config::builder()
            .hostname(" my.host.name\n")
            .api_secret("super-duper-secret")
            .build()
            .unwrap();
        assert_eq!(config.hostname(), "my.host.name");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/sud-config.toml")).unwrap_err();
        assert!(err.to_string().contains("sud init"));
    }

    #[test]
    fn test_builder_defaults() {
        let config = assert_ok!(Config::builder()
            .hostname("my.host.name")
            .api_secret("super-duper-secret")
            .build());
        assert_eq!(config.frequency(), Duration::from_secs(DEFAULT_FREQUENCY_SECS));
        assert!(config.telegram().is_none());
    }

    #[test]
    fn test_builder_rejects_low_frequency() {
        let err = Config::builder()
            .hostname("my.host.name")
            .api_secret("super-duper-secret")
            .frequency(1)
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Minimum frequency is once per minute (60 seconds)."
        );
    }

    #[test]
    fn test_builder_rejects_invalid_hostname() {
        assert_err!(Config::builder().hostname("xxxx").api_secret("s").build());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sud-config.toml");

        let config = Config::builder()
            .hostname("my.host.name")
            .api_secret("super-duper-secret")
            .frequency(600)
            .telegram(-1234, "tg-token")
            .build()
            .unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.hostname(), "my.host.name");
        assert_eq!(loaded.api_secret(), "super-duper-secret");
        assert_eq!(loaded.frequency(), Duration::from_secs(600));
        assert_eq!(loaded.telegram().map(|t| t.chat_id), Some(-1234));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_toml(FULL).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("my-secret-key"));
        assert!(!debug.contains("my-bot-token"));
    }

    #[test]
    fn test_secret_from_env() {
        std::env::set_var("TEST_SUD_API_SECRET", "resolved-secret");
        let config = Config::from_toml(
            r#"
hostname = "my.host.name"
api_secret = "$TEST_SUD_API_SECRET"
"#,
        )
        .unwrap();
        assert_eq!(config.api_secret(), "resolved-secret");
        std::env::remove_var("TEST_SUD_API_SECRET");
    }

    #[test]
    fn test_resolve_env_with_value() {
        assert_eq!(resolve_env("plain_value"), "plain_value");
    }

    #[test]
    fn test_resolve_env_with_missing_var() {
        assert_eq!(resolve_env("$NONEXISTENT_SUD_VAR_12345"), "$NONEXISTENT_SUD_VAR_12345");
    }
}
