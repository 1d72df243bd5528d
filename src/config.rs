use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONTROLLER_KEY: &str = "controller_flagship_key_2025";
pub const DEFAULT_BOT_KEY: &str = "bot_flagship_access_2026_secure_alpha92";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Pre-shared secrets, compared by exact string equality
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub controller_key: String,
    pub bot_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            controller_key: DEFAULT_CONTROLLER_KEY.to_string(),
            bot_key: DEFAULT_BOT_KEY.to_string(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("controller_key", &"<redacted>")
            .field("bot_key", &"<redacted>")
            .finish()
    }
}

/// Timeouts and bounds of the relay stores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Lifetime of an unexecuted remote trade signal
    #[serde(default = "default_trade_signal_ttl_ms")]
    pub trade_signal_ttl_ms: u64,
    /// Delay before force-close is written back to false
    #[serde(default = "default_force_close_reset_ms")]
    pub force_close_reset_ms: u64,
    /// Delay before an unconfirmed break-even command deactivates
    #[serde(default = "default_break_even_timeout_ms")]
    pub break_even_timeout_ms: u64,
    /// Bots not seen for this long are evicted
    #[serde(default = "default_bot_idle_secs")]
    pub bot_idle_secs: u64,
    /// Command log entries older than this are purged
    #[serde(default = "default_command_retention_secs")]
    pub command_retention_secs: u64,
    /// Maximum number of retained command log entries
    #[serde(default = "default_command_log_capacity")]
    pub command_log_capacity: usize,
}

fn default_trade_signal_ttl_ms() -> u64 {
    5_000
}

fn default_force_close_reset_ms() -> u64 {
    5_000
}

fn default_break_even_timeout_ms() -> u64 {
    10_000
}

fn default_bot_idle_secs() -> u64 {
    5 * 60
}

fn default_command_retention_secs() -> u64 {
    6 * 60 * 60
}

fn default_command_log_capacity() -> usize {
    50
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            trade_signal_ttl_ms: default_trade_signal_ttl_ms(),
            force_close_reset_ms: default_force_close_reset_ms(),
            break_even_timeout_ms: default_break_even_timeout_ms(),
            bot_idle_secs: default_bot_idle_secs(),
            command_retention_secs: default_command_retention_secs(),
            command_log_capacity: default_command_log_capacity(),
        }
    }
}

impl TimingConfig {
    pub fn trade_signal_ttl(&self) -> Duration {
        Duration::from_millis(self.trade_signal_ttl_ms)
    }

    pub fn force_close_reset(&self) -> Duration {
        Duration::from_millis(self.force_close_reset_ms)
    }

    pub fn break_even_timeout(&self) -> Duration {
        Duration::from_millis(self.break_even_timeout_ms)
    }
}

/// Background sweep cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Expired/executed signal and idle bot sweep interval
    #[serde(default = "default_signal_interval_secs")]
    pub signal_interval_secs: u64,
    /// Command log retention sweep interval
    #[serde(default = "default_retention_interval_secs")]
    pub retention_interval_secs: u64,
}

fn default_signal_interval_secs() -> u64 {
    10
}

fn default_retention_interval_secs() -> u64 {
    60
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            signal_interval_secs: default_signal_interval_secs(),
            retention_interval_secs: default_retention_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rolling log files; console only when unset
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            timing: TimingConfig::default(),
            sweep: SweepConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("auth.controller_key", DEFAULT_CONTROLLER_KEY)?
            .set_default("auth.bot_key", DEFAULT_BOT_KEY)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("RELAY_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (RELAY_AUTH__BOT_KEY, etc.)
            .add_source(
                Environment::with_prefix("RELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        // Hosting platforms hand out the listen port through PORT
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.trim().parse::<u16>().ok())
        {
            builder = builder.set_override("server.port", port)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.auth.controller_key.trim().is_empty() {
            errors.push("auth.controller_key must not be empty".to_string());
        }

        if self.auth.bot_key.trim().is_empty() {
            errors.push("auth.bot_key must not be empty".to_string());
        }

        if !self.auth.controller_key.is_empty() && self.auth.controller_key == self.auth.bot_key {
            errors.push("auth.controller_key and auth.bot_key must differ".to_string());
        }

        if self.timing.trade_signal_ttl_ms == 0 {
            errors.push("timing.trade_signal_ttl_ms must be positive".to_string());
        }

        if self.timing.force_close_reset_ms == 0 {
            errors.push("timing.force_close_reset_ms must be positive".to_string());
        }

        if self.timing.break_even_timeout_ms == 0 {
            errors.push("timing.break_even_timeout_ms must be positive".to_string());
        }

        if self.timing.command_log_capacity == 0 {
            errors.push("timing.command_log_capacity must be positive".to_string());
        }

        if self.sweep.signal_interval_secs == 0 || self.sweep.retention_interval_secs == 0 {
            errors.push("sweep intervals must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timing.trade_signal_ttl(), Duration::from_secs(5));
        assert_eq!(config.timing.break_even_timeout(), Duration::from_secs(10));
        assert_eq!(config.timing.command_log_capacity, 50);
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let mut config = AppConfig::default();
        config.auth.bot_key = config.auth.controller_key.clone();
        config.timing.command_log_capacity = 0;
        config.timing.trade_signal_ttl_ms = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_auth_debug_is_redacted() {
        let rendered = format!("{:?}", AuthConfig::default());
        assert!(!rendered.contains(DEFAULT_BOT_KEY));
        assert!(!rendered.contains(DEFAULT_CONTROLLER_KEY));
    }
}
