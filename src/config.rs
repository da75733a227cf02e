use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BillError, Result};
use crate::utils::app_data_dir;

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub language: String,
    pub default_currency: String,
    pub notifications_enabled: bool,
    /// Overrides the database location under the data directory.
    pub database_path: Option<String>,
    pub upcoming_window_days: i64,
    pub backup_keep_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            default_currency: "USD".to_string(),
            notifications_enabled: true,
            database_path: None,
            upcoming_window_days: 7,
            backup_keep_count: 10,
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(app_data_dir()?.join(CONFIG_FILE_NAME))
}

/// Missing or unreadable files give the defaults.
pub async fn load_config(path: &Path) -> AppConfig {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(_) => return AppConfig::default(),
    };
    match serde_json::from_str::<AppConfig>(&data) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
            AppConfig::default()
        }
    }
}

pub async fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    let config_json = serde_json::to_string_pretty(config)
        .map_err(|e| BillError::Configuration(format!("Failed to serialize config: {}", e)))?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, config_json).await?;
    Ok(())
}
