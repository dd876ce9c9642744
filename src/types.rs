use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Command failed: {0}")]
    Command(String),
    #[error("Could not join WiFi network `{ssid}` within {waited_secs}s")]
    WifiTimeout { ssid: String, waited_secs: u64 },
    #[error("Battery read failed: {0}")]
    Battery(String),
}

/// Why a poll produced no payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Status code {code}")]
    Status { code: u16, message: Option<String> },
    #[error("{0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),
}

// The request URL carries the device token, so it never rides along.
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.without_url())
    }
}
