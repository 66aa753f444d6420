use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::http::parser::Limits;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "OUTFLOW_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Max level for log output (`trace` .. `error`).
    pub log_level: String,
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Allow connections to be reused at all.
    pub keep_alive: bool,
    /// Seconds an idle keep-alive connection stays open; also sent in `Keep-Alive`.
    pub keep_alive_timeout: u64,
    /// Requests served on one connection before it is closed. 0 = unlimited.
    pub max_keep_alive_requests: usize,
    /// `Server` header value. Empty or missing leaves the header out.
    pub server_token: Option<String>,
    /// Largest request line plus headers accepted, in bytes.
    pub max_head_size: usize,
    /// Largest request body accepted, in bytes.
    pub max_body_size: usize,
    /// Seconds a client gets to finish sending a request once it has started.
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub document_root: PathBuf,
    /// File served for directory targets.
    pub index: String,
    /// Keep loaded files in memory.
    pub cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            keep_alive: true,
            keep_alive_timeout: 10,
            max_keep_alive_requests: 100,
            server_token: Some(concat!("outflow/", env!("CARGO_PKG_VERSION")).to_string()),
            max_head_size: 8 * 1024,
            max_body_size: 1024 * 1024,
            request_timeout: 30,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            document_root: PathBuf::from("./public"),
            index: "index.html".to_string(),
            cache: true,
        }
    }
}

impl Config {
    /// Load from the file named by `OUTFLOW_CONFIG` (defaults when unset),
    /// then apply the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let mut cfg: Config = serde_yaml::from_str(raw).context("failed to parse YAML config")?;
        cfg.log_level()?;

        // Timeouts are whole seconds; zero would close every connection at once.
        cfg.server.keep_alive_timeout = cfg.server.keep_alive_timeout.max(1);
        cfg.server.request_timeout = cfg.server.request_timeout.max(1);
        Ok(cfg)
    }

    pub fn log_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown log level: {}", self.log_level))
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_head_size: self.server.max_head_size,
            max_body_size: self.server.max_body_size,
        }
    }

    /// Server token with empty strings treated as absent.
    pub fn server_token(&self) -> Option<&str> {
        self.server
            .server_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}
