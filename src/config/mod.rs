// Configuration management for lovenest
// Handles loading/saving settings, with sensible defaults when config is missing

use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Uploads above this size are refused before anything touches disk.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub player: PlayerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Built front-end; unknown paths fall back to its index.html
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,    // settings.json, photos.json, music.json
    pub uploads_dir: PathBuf, // photos/, music/, covers/, avatars/, backgrounds/
    pub max_upload_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub restart_threshold_secs: u64,
    pub frame_interval_ms: u64,
    pub album_name: String,
    pub default_artwork: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lovenest");

        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::rooted_at(&base_dir),
            player: PlayerConfig::default(),
            logging: LoggingConfig {
                log_dir: base_dir.join("logs"),
                file_name: "lovenest.log".to_string(),
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            web_dir: None,
        }
    }
}

impl StorageConfig {
    /// Lays out `data/` and `uploads/` below a single base directory.
    pub fn rooted_at(base_dir: &Path) -> Self {
        Self {
            data_dir: base_dir.join("data"),
            uploads_dir: base_dir.join("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            restart_threshold_secs: 3,
            frame_interval_ms: 16, // roughly one animation frame
            album_name: "Ngày Yêu Thương".to_string(),
            default_artwork: "/default-cover.png".to_string(),
        }
    }
}

impl PlayerConfig {
    pub fn restart_threshold(&self) -> Duration {
        Duration::from_secs(self.restart_threshold_secs)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from an explicit path, writing the defaults there when it does not exist yet.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("lovenest");

        Ok(config_dir.join("config.toml"))
    }
}
