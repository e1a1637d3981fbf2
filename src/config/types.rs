//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::{
    GUEST_PASSWORD, default_channel_user_capacity, default_log_dir, default_retries,
    default_server_type, default_true, guest_nickname,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Channels joined (staggered) once the server finishes its welcome.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Logging and state options.
    #[serde(default)]
    pub options: ClientOptions,
    /// Login identity. Absent means an anonymous guest login.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Server selection and reconnect policy.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Optional record store used by the binary.
    pub store: Option<StoreConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// `[options]`
#[derive(Debug, Clone, Deserialize)]
pub struct ClientOptions {
    /// Lower the default log level to `debug`.
    #[serde(default)]
    pub debug: bool,
    /// Also write logs to `<log_dir>/status.log`.
    #[serde(default)]
    pub logging: bool,
    /// Emit JSON log lines instead of the human format.
    #[serde(default)]
    pub json_logs: bool,
    /// Directory for the status log file.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Maximum user records kept per channel before the least recently
    /// active one is evicted.
    #[serde(default = "default_channel_user_capacity", alias = "channelUserCapacity")]
    pub channel_user_capacity: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            debug: false,
            logging: false,
            json_logs: false,
            log_dir: default_log_dir(),
            channel_user_capacity: default_channel_user_capacity(),
        }
    }
}

impl ClientOptions {
    /// Path of the status log file.
    pub fn status_log_path(&self) -> PathBuf {
        Path::new(&self.log_dir).join("status.log")
    }
}

/// `[identity]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Resolved login credentials for one connection attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub nickname: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("nickname", &self.nickname)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl IdentityConfig {
    /// Credentials for the next login.
    ///
    /// Without a username this is a guest login with a fresh random nickname
    /// every call. A missing or empty password falls back to the guest
    /// password either way.
    pub fn credentials(&self) -> Credentials {
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => Credentials {
                nickname: username.to_string(),
                password: self
                    .password
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| GUEST_PASSWORD.to_string()),
            },
            _ => Credentials {
                nickname: guest_nickname(),
                password: GUEST_PASSWORD.to_string(),
            },
        }
    }

    /// Whether this identity logs in anonymously.
    pub fn is_guest(&self) -> bool {
        self.username.as_deref().is_none_or(str::is_empty)
    }
}

/// `[connection]`
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Fixed host that bypasses the server list.
    #[serde(default, alias = "preferredServer")]
    pub preferred_server: Option<String>,
    /// Port for the preferred host, or the list port (80 or 443).
    #[serde(default, alias = "preferredPort")]
    pub preferred_port: Option<u16>,
    /// Server list to pick from: `chat`, `events` or `groups`.
    #[serde(default = "default_server_type", alias = "serverType")]
    pub server_type: String,
    /// Reconnect after transport errors.
    #[serde(default = "default_true")]
    pub reconnect: bool,
    /// Reconnect attempts; `-1` is unlimited.
    #[serde(default = "default_retries")]
    pub retries: i64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            preferred_server: None,
            preferred_port: None,
            server_type: default_server_type(),
            reconnect: true,
            retries: default_retries(),
        }
    }
}

/// `[store]`
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// SQLite file path, or `:memory:`.
    pub path: String,
}
