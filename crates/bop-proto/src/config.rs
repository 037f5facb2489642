use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

/// Host and port of the queue server. Read from these after the file.
pub const HOST_ENV: &str = "BOP_HOST";
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_mouse")]
    pub mouse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Cover width is the terminal width divided by this.
    #[serde(default = "default_width_divisor")]
    pub width_divisor: u16,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            mouse: default_mouse(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            width_divisor: default_width_divisor(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    3
}

fn default_theme() -> String {
    "kanagawa-dragon".to_string()
}

fn default_mouse() -> bool {
    true
}

fn default_width_divisor() -> u16 {
    3
}

fn default_concurrency() -> usize {
    8
}

impl Config {
    /// Load the config file (writing defaults on first run), then apply
    /// `BOP_HOST` / `PORT` from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        let mut config = if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            config
        } else {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Overlay environment values. Blank values are ignored; an unparsable
    /// port is logged and ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.trim().is_empty()) {
            self.remote.host = Some(host.trim().to_string());
        }
        if let Some(port) = lookup(PORT_ENV).filter(|p| !p.trim().is_empty()) {
            match port.trim().parse::<u16>() {
                Ok(p) => self.remote.port = Some(p),
                Err(e) => tracing::warn!("ignoring {}={:?}: {}", PORT_ENV, port, e),
            }
        }
    }

    /// `http://host:port` of the queue server.
    pub fn base_url(&self) -> anyhow::Result<String> {
        let Some(host) = self.remote.host.as_deref() else {
            anyhow::bail!("no server host configured (set {} or remote.host)", HOST_ENV);
        };
        let Some(port) = self.remote.port else {
            anyhow::bail!("no server port configured (set {} or remote.port)", PORT_ENV);
        };
        Ok(format!("http://{}:{}", host, port))
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.remote.timeout_secs.max(1))
    }
}
