use serde::{Deserialize, Serialize};
use tokio::fs;
use std::path::PathBuf;
use directories::ProjectDirs;

use crate::shared::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub endpoint: String,
    pub api_key: String,
    pub api_host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub default_target_lang: String,
    pub history_page_size: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                endpoint: "https://openl-translate.p.rapidapi.com/translate".to_string(),
                api_key: String::new(),
                api_host: "openl-translate.p.rapidapi.com".to_string(),
            },
            preferences: UserPreferences {
                default_target_lang: "fr".to_string(),
                history_page_size: 30,
            },
        }
    }
}

impl AppSettings {
    pub fn settings_path() -> AppResult<PathBuf> {
        ProjectDirs::from("com", "antigravity", "lingo")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| AppError::System("Failed to determine config directory".to_string()))
    }

    /// Directory holding the history database.
    pub fn data_dir() -> AppResult<PathBuf> {
        ProjectDirs::from("com", "antigravity", "lingo")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| AppError::System("Failed to determine data directory".to_string()))
    }

    pub async fn load() -> AppResult<Self> {
        let path = Self::settings_path()?;

        if !path.exists() {
            let settings = Self::default();
            settings.save().await?;
            return Ok(settings);
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| AppError::Validation(format!("Failed to parse settings: {}", e)))
    }

    pub async fn save(&self) -> AppResult<()> {
        let path = Self::settings_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Io(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;

        fs::write(&path, content)
            .await
            .map_err(|e| AppError::Io(format!("Failed to write settings file: {}", e)))
    }

    /// API key with the environment override applied.
    ///
    /// `LINGO_API_KEY` takes precedence over the settings file so the key
    /// never has to be written to disk.
    pub fn resolved_api_key(&self) -> String {
        if let Ok(env_key) = std::env::var("LINGO_API_KEY") {
            if !env_key.trim().is_empty() {
                return env_key;
            }
        }
        self.api.api_key.clone()
    }
}
