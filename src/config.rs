use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::terminal::{Dimensions, FontMetrics};
use crate::transport::Endpoint;

pub const CONFIG_FILE_NAME: &str = "devstack.toml";
pub const CONFIG_PATH_ENV: &str = "DEVSTACK_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub terminal: TerminalConfig,
    pub logs: LogsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub terminal_path: String,
    pub logs_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 8000,
            secure: false,
            terminal_path: "/ws/terminal".to_owned(),
            logs_path: "/ws/logs".to_owned(),
        }
    }
}

impl ServerConfig {
    pub fn terminal_endpoint(&self) -> Endpoint {
        Endpoint::new(self.secure, &self.host, self.port, &self.terminal_path)
    }

    pub fn log_endpoint(&self, service: &str) -> Endpoint {
        let path = format!(
            "{}/{}",
            self.logs_path.trim_end_matches('/'),
            urlencoding::encode(service)
        );
        Endpoint::new(self.secure, &self.host, self.port, path)
    }

    /// REST base URL; follows the same transport security as the sockets.
    pub fn api_url(&self, path: &str) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!(
            "{scheme}://{}:{}/{}",
            self.host,
            self.port,
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalConfig {
    pub rows: u16,
    pub cols: u16,
    pub scrollback: usize,
    pub settle_delay_ms: u64,
    pub cell_width: u16,
    pub cell_height: u16,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            scrollback: 1000,
            settle_delay_ms: 100,
            cell_width: 1,
            cell_height: 1,
        }
    }
}

impl TerminalConfig {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.rows, self.cols)
    }

    pub fn font_metrics(&self) -> FontMetrics {
        FontMetrics::new(self.cell_width, self.cell_height)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogsConfig {
    pub max_entries: usize,
    pub auto_scroll: bool,
    /// Zero disables automatic reconnection.
    pub reconnect_delay_ms: u64,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            max_entries: 5000,
            auto_scroll: true,
            reconnect_delay_ms: 0,
        }
    }
}

impl LogsConfig {
    pub fn reconnect_delay(&self) -> Option<Duration> {
        (self.reconnect_delay_ms > 0).then(|| Duration::from_millis(self.reconnect_delay_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: Some(PathBuf::from("devstack.log")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value `{value}` for {key}")]
    InvalidOverride { key: String, value: String },
    #[error("invalid configuration: {key} {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

impl Config {
    /// Loads configuration from `explicit`, `$DEVSTACK_CONFIG`, or
    /// `./devstack.toml`, falling back to defaults when none exist, then
    /// applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let path = match (explicit, env_path) {
            (Some(path), _) => Some(path.to_path_buf()),
            (None, Some(path)) => Some(path),
            (None, None) => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                local.is_file().then_some(local)
            }
        };
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DEVSTACK_HOST").filter(|value| !value.trim().is_empty()) {
            self.server.host = host.trim().to_owned();
        }
        if let Some(port) = lookup("DEVSTACK_PORT") {
            self.server.port =
                port.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidOverride {
                        key: "DEVSTACK_PORT".to_owned(),
                        value: port.clone(),
                    })?;
        }
        if let Some(secure) = lookup("DEVSTACK_SECURE") {
            self.server.secure = match secure.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidOverride {
                        key: "DEVSTACK_SECURE".to_owned(),
                        value: secure,
                    })
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                key: "server.port",
                reason: "must be non-zero",
            });
        }
        if self.terminal.rows == 0 || self.terminal.cols == 0 {
            return Err(ConfigError::Invalid {
                key: "terminal.rows/cols",
                reason: "must be non-zero",
            });
        }
        if self.terminal.cell_width == 0 || self.terminal.cell_height == 0 {
            return Err(ConfigError::Invalid {
                key: "terminal.cell_width/cell_height",
                reason: "must be non-zero",
            });
        }
        if self.logs.max_entries == 0 {
            return Err(ConfigError::Invalid {
                key: "logs.max_entries",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
