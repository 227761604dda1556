use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Environment variable naming a YAML configuration file.
pub const CONFIG_ENV: &str = "MOTE_CONFIG";

/// Environment variable overriding the listen address (`host:port`).
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Where a fatal error report is persisted
    pub error_log: PathBuf,
    /// Page served at `/`
    pub index_page: PathBuf,
    pub restart_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deadline for reading one request after accept
    pub recv_timeout_ms: u64,
    /// Deadline for sending one response
    pub send_timeout_ms: u64,
    /// Sleep between two polls of the listener
    pub poll_interval_ms: u64,
    /// Upper bound for a single socket read
    pub read_chunk: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            error_log: PathBuf::from("error.log"),
            index_page: PathBuf::from("templates/index.html"),
            restart_delay_ms: 1000,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            recv_timeout_ms: 1000,
            send_timeout_ms: 1000,
            poll_interval_ms: 100,
            read_chunk: 64,
        }
    }
}

impl ServerConfig {
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// `host:port`, as used for logging and the `LISTEN` override.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn apply_listen(&mut self, listen: &str) -> anyhow::Result<()> {
        let (host, port) = listen
            .rsplit_once(':')
            .with_context(|| format!("{} must be host:port, got {:?}", LISTEN_ENV, listen))?;
        self.port = port
            .parse()
            .with_context(|| format!("invalid port in {}: {:?}", LISTEN_ENV, port))?;
        self.host = host.trim_start_matches('[').trim_end_matches(']').to_string();
        Ok(())
    }
}

impl Config {
    /// Loads the file named by `MOTE_CONFIG` (defaults when unset), then
    /// applies the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Ok(listen) = std::env::var(LISTEN_ENV) {
            cfg.server.apply_listen(&listen)?;
        }

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}
