//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "demoMode": false },
//!   "api": { "baseUrl": "https://api.scamguard.app/v1", "timeoutSecs": 30 }
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_API_URL: &str = "https://api.scamguard.app/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    api: ApiSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// ScamGuard configuration (resolved view of settings + environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub demo_mode: bool,
    pub api_base_url: String,
    pub api_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            api_base_url: DEFAULT_API_URL.to_string(),
            api_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Environment overrides (for CI/testing):
    /// - `SCAMGUARD_DEMO_MODE` - true/1/yes or false/0/no
    /// - `SCAMGUARD_API_URL` - backend base URL
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        Ok(Self::resolve(&raw, |key| std::env::var(key).ok()))
    }

    fn resolve(raw: &SettingsFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let demo_mode = match env("SCAMGUARD_DEMO_MODE").as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.app.demo_mode,
        };

        let api_base_url = env("SCAMGUARD_API_URL")
            .filter(|url| !url.trim().is_empty())
            .or_else(|| raw.api.base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = raw
            .api
            .timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            demo_mode,
            api_base_url,
            api_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Save config to the data directory
    ///
    /// Only `app.demoMode` is written. API settings stay as the user left
    /// them in the file, so environment overrides are never persisted.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        let mut settings = read_settings(data_dir)?;
        settings.app.demo_mode = self.demo_mode;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Enable demo mode
    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    /// Disable demo mode
    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {:?}", settings_path))?;
    Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(error = %e, "settings.json is invalid; using defaults");
        SettingsFile::default()
    }))
}
