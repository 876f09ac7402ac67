//! Serde data structures for the grafana-proxy configuration file.
//!
//! Contains [`Config`] (the root), [`GrafanaConfig`], [`ServerConfig`],
//! and [`LogConfig`]. Every field has a default so an empty file is a
//! valid config. Unknown keys are rejected via `deny_unknown_fields`.

use serde::{Deserialize, Serialize};

fn default_url() -> String {
    "http://localhost:3000".to_string()
}

const fn default_datasource() -> u64 {
    1
}

fn default_address() -> String {
    "localhost:8080".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub grafana: GrafanaConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GrafanaConfig {
    /// Upstream base URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// CA certificate file or directory. Empty means the system roots.
    #[serde(default)]
    pub cacerts: String,

    #[serde(default = "default_datasource")]
    pub datasource: u64,

    /// Bearer token sent on every upstream request.
    #[serde(default)]
    pub key: String,

    /// Upstream response timeout in milliseconds. `0` disables it.
    #[serde(default)]
    pub timeout: u64,
}

impl Default for GrafanaConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            cacerts: String::new(),
            datasource: default_datasource(),
            key: String::new(),
            timeout: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
}

impl ServerConfig {
    /// Address to bind. An empty host (`:8080`) listens on all interfaces.
    #[must_use]
    pub fn bind_address(&self) -> String {
        match self.address.strip_prefix(':') {
            Some(port) => format!("0.0.0.0:{port}"),
            None => self.address.clone(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl LogConfig {
    /// Unrecognized levels fall back to `info`.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        match self.level.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "warning" | "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
