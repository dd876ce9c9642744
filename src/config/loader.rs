use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::ClientError;

use super::{paths, Config};

const ENV_OVERRIDES: [&str; 4] = [
    "EINK_API_URL",
    "EINK_DEVICE_TOKEN",
    "EINK_WIFI_SSID",
    "EINK_WIFI_PASSWORD",
];

impl Config {
    /// Load configuration from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let config_path = paths::get_config_path();
        let mut config = Self::load_from(&config_path).await;
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Same as [`Config::load`] for an explicit path, without environment overrides.
    pub async fn load_from(path: &Path) -> Self {
        match Self::try_load(path).await {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    api_url = %config.api_url,
                    ssid = %config.wifi_ssid,
                    "Loaded configuration"
                );
                config
            }
            Err(err) => {
                warn!(error = %err, "Failed to load config.json, using defaults");
                Self::default()
            }
        }
    }

    async fn try_load(path: &Path) -> Result<Self, ClientError> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|err| ClientError::Config(format!("Failed to read config file: {err}")))?;

        serde_json::from_str(&contents)
            .map_err(|err| ClientError::Config(format!("Failed to parse config.json: {err}")))
    }

    /// Apply `EINK_*` overrides; blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ENV_OVERRIDES {
            let Some(value) = lookup(key) else {
                continue;
            };
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            let target = match key {
                "EINK_API_URL" => &mut self.api_url,
                "EINK_DEVICE_TOKEN" => &mut self.device_token,
                "EINK_WIFI_SSID" => &mut self.wifi_ssid,
                _ => &mut self.wifi_password,
            };
            *target = trimmed.to_string();
            info!(key, "Applied environment override");
        }
    }
}
