use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use vigil_sender::HttpSenderConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application runtime mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Production,
    #[default]
    Development,
}

/// Validated agent configuration.
///
/// Loaded from a TOML file with serde defaults for every key; the
/// file itself is optional. Invalid values are rejected here, before
/// any component sees them.
#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub mode: Mode,
    /// Collection endpoint URL; required in production mode.
    #[serde(default)]
    pub endpoint: String,
    /// Static bearer credential; required in production mode.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub sender: SenderConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
pub struct SenderConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,
    #[serde(default = "default_max_retry_delay_ms")]
    pub max_retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_client_timeout_secs")]
    pub client_timeout_secs: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            max_retry_delay_ms: default_max_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            client_timeout_secs: default_client_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Human-readable console output; JSON lines when false.
    #[serde(default = "default_log_pretty")]
    pub pretty: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            pretty: default_log_pretty(),
        }
    }
}

fn default_agent_id() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown-host".to_string())
}

fn default_interval_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_retry_delay_ms() -> u64 {
    1000
}

fn default_max_retry_delay_ms() -> u64 {
    30_000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_client_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_pretty() -> bool {
    true
}

impl AgentConfig {
    /// Loads and validates the configuration at `path`; a missing file
    /// yields the pure-default configuration.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let mut config: Self = if Path::new(path).exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path}"))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse config file {path}"))?
        } else {
            toml::from_str("").context("failed to build default config")?
        };
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn normalize(&mut self) {
        self.log.level = self.log.level.to_lowercase();
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.agent_id.is_empty() {
            anyhow::bail!("agent_id is required");
        }
        if self.interval_secs == 0 {
            anyhow::bail!("interval_secs must be > 0");
        }
        if self.mode == Mode::Production {
            if self.endpoint.is_empty() {
                anyhow::bail!("endpoint is required in production mode");
            }
            if self.token.is_empty() {
                anyhow::bail!("token is required in production mode");
            }
            if self.log.pretty {
                anyhow::bail!("log.pretty is not allowed in production mode");
            }
        }
        if self.sender.initial_retry_delay_ms == 0 || self.sender.max_retry_delay_ms == 0 {
            anyhow::bail!("sender retry delays must be > 0");
        }
        if self.sender.request_timeout_secs == 0 || self.sender.client_timeout_secs == 0 {
            anyhow::bail!("sender timeouts must be > 0");
        }
        if !VALID_LOG_LEVELS.contains(&self.log.level.as_str()) {
            anyhow::bail!(
                "invalid log.level: {} (valid: trace, debug, info, warn, error)",
                self.log.level
            );
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Sender tunables in the form the HTTP sender consumes.
    pub fn http_sender_config(&self) -> HttpSenderConfig {
        HttpSenderConfig {
            max_retries: self.sender.max_retries,
            initial_retry_delay: Duration::from_millis(self.sender.initial_retry_delay_ms),
            max_retry_delay: Duration::from_millis(self.sender.max_retry_delay_ms),
            request_timeout: Duration::from_secs(self.sender.request_timeout_secs),
            client_timeout: Duration::from_secs(self.sender.client_timeout_secs),
        }
    }
}
