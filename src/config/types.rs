use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the device joins its wireless network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WifiBackend {
    /// Drive NetworkManager through `nmcli`.
    #[default]
    Nmcli,
    /// The network is managed by something else; treat the link as up.
    AssumeConnected,
}

/// Device configuration, constructed once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_wifi_ssid")]
    pub wifi_ssid: String,

    #[serde(default = "default_wifi_password")]
    pub wifi_password: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_device_token")]
    pub device_token: String,

    #[serde(default = "default_resolution")]
    pub resolution: String,

    #[serde(default = "default_refresh_interval_secs")]
    pub default_refresh_interval_secs: u64,

    /// No timeout unless set.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub wifi_backend: WifiBackend,

    #[serde(default)]
    pub wifi_interface: Option<String>,

    #[serde(default = "default_wifi_join_timeout_secs")]
    pub wifi_join_timeout_secs: u64,

    #[serde(default = "default_wifi_poll_interval_secs")]
    pub wifi_poll_interval_secs: u64,

    /// Power-supply `capacity` file; the fixed placeholder level is used when unset.
    #[serde(default)]
    pub battery_capacity_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wifi_ssid: default_wifi_ssid(),
            wifi_password: default_wifi_password(),
            api_url: default_api_url(),
            device_token: default_device_token(),
            resolution: default_resolution(),
            default_refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: None,
            wifi_backend: WifiBackend::default(),
            wifi_interface: None,
            wifi_join_timeout_secs: default_wifi_join_timeout_secs(),
            wifi_poll_interval_secs: default_wifi_poll_interval_secs(),
            battery_capacity_path: None,
        }
    }
}

impl Config {
    pub fn default_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.default_refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn wifi_join_timeout(&self) -> Duration {
        Duration::from_secs(self.wifi_join_timeout_secs)
    }

    pub fn wifi_poll_interval(&self) -> Duration {
        Duration::from_secs(self.wifi_poll_interval_secs.max(1))
    }
}

fn default_wifi_ssid() -> String {
    "Your_WiFi_SSID".to_string()
}

fn default_wifi_password() -> String {
    "Your_WiFi_Password".to_string()
}

fn default_api_url() -> String {
    "http://YOUR_LOCAL_IP:8080/api/eink/relevant".to_string()
}

fn default_device_token() -> String {
    "your_secure_device_token".to_string()
}

fn default_resolution() -> String {
    "800x600".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    1800
}

fn default_wifi_join_timeout_secs() -> u64 {
    60
}

fn default_wifi_poll_interval_secs() -> u64 {
    1
}
