//! Configuration management
//!
//! Settings live in settings.json under the data directory:
//! ```json
//! {
//!   "apiKey": "...",
//!   "demoMode": false,
//!   "imageModel": "imagen-4.0-generate-001"
//! }
//! ```
//! A damaged file is treated as empty rather than blocking every command,
//! and saving preserves fields this crate does not manage.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::adapters::gemini::{DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL, DEFAULT_VIDEO_MODEL};
use crate::domain::result::Result;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default)]
    demo_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chat_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_model: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Easel configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the generation service; env vars override the file
    pub api_key: Option<String>,
    pub demo_mode: bool,
    pub image_model: String,
    pub chat_model: String,
    pub video_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            demo_mode: false,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The API key resolves in order: GEMINI_API_KEY, EASEL_API_KEY, then
    /// the settings file. Demo mode can be forced either way with
    /// EASEL_DEMO_MODE (for CI/testing).
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = Self::read_raw(data_dir)?;

        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .or_else(|| std::env::var("EASEL_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .or(raw.api_key);

        let demo_mode = match std::env::var("EASEL_DEMO_MODE").ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.demo_mode,
        };

        Ok(Self {
            api_key,
            demo_mode,
            image_model: raw.image_model.unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            chat_model: raw.chat_model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            video_model: raw.video_model.unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
        })
    }

    /// Save config to the data directory
    ///
    /// Re-reads the file first so fields this crate does not manage
    /// survive the write. The resolved view is what gets written, including
    /// a key that came from the environment.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = Self::read_raw(data_dir)?;

        settings.api_key = self.api_key.clone();
        settings.demo_mode = self.demo_mode;
        settings.image_model = Some(self.image_model.clone());
        settings.chat_model = Some(self.chat_model.clone());
        settings.video_model = Some(self.video_model.clone());

        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join("settings.json"), content)?;
        Ok(())
    }

    fn read_raw(data_dir: &Path) -> Result<SettingsFile> {
        let settings_path = data_dir.join("settings.json");
        if !settings_path.exists() {
            return Ok(SettingsFile::default());
        }
        let content = std::fs::read_to_string(&settings_path)?;
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }

    /// The stored key with the middle elided, for display
    pub fn masked_key(&self) -> Option<String> {
        self.api_key.as_deref().map(|key| {
            if key.len() <= 8 {
                "********".to_string()
            } else {
                format!("{}...{}", &key[..4], &key[key.len() - 4..])
            }
        })
    }
}
