//! Gateway configuration

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub metadata: MetadataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Shared directory; every request path resolves under it
    pub root_dir: PathBuf,
    /// Address the HTTP layer listens on (reported by status)
    pub listen_addr: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            listen_addr: "0.0.0.0:80".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log files older than this are removed at startup
    pub retention_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { retention_days: 7 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Set the hidden attribute on metadata files (Windows only)
    pub hide_files: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self { hide_files: true }
    }
}

#[cfg(windows)]
fn default_root_dir() -> PathBuf {
    PathBuf::from(r"D:\Fire")
}

#[cfg(not(windows))]
fn default_root_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join("Fire"))
        .unwrap_or_else(|| PathBuf::from("./Fire"))
}

impl GatewayConfig {
    /// Configuration rooted at `root` with everything else at defaults
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        let mut config = Self::default();
        config.general.root_dir = root.into();
        config
    }

    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file
    ///
    /// A missing file yields defaults; an unreadable or malformed one is an
    /// error.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Cannot read {}", config_path.display()))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            config
        } else {
            tracing::info!("Using default configuration");
            Self::default()
        };

        config.absolutize_root()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "FireShare", "FireGateway")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Create the root directory if it does not exist yet
    pub fn ensure_root(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.general.root_dir)?;
        Ok(())
    }

    /// Make a relative root absolute against the current directory
    pub fn absolutize_root(&mut self) -> anyhow::Result<()> {
        if self.general.root_dir.is_relative() {
            self.general.root_dir = std::env::current_dir()?.join(&self.general.root_dir);
        }
        Ok(())
    }
}
