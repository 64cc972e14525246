use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/booster/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoosterConfig {
    /// Number of ranges a download is split into by default.
    pub chunk_count: u64,
    /// Default chunk size in bytes for size-driven planning.
    pub chunk_size: u64,
    /// Optional cap on concurrent range fetches (missing = one per range).
    #[serde(default)]
    pub max_concurrent: Option<usize>,
    /// Optional whole-job timeout in seconds (missing = no deadline).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self {
            chunk_count: 4,
            chunk_size: 1024 * 1024,
            max_concurrent: None,
            timeout_secs: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("booster")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BoosterConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BoosterConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BoosterConfig = toml::from_str(&data)?;
    Ok(cfg)
}
