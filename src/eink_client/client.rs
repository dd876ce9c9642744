use reqwest::{Client, Request, StatusCode};
use tracing::{debug, warn};

use crate::config::Config;
use crate::types::{ClientError, FetchError};

use super::api_types::{ErrorBody, PollQuery, PollResponse};

/// Polls the workspace endpoint on behalf of one device.
#[derive(Clone)]
pub struct EinkClient {
    http: Client,
    api_url: String,
    token: String,
    resolution: String,
}

impl EinkClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Http)?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            token: config.device_token.clone(),
            resolution: config.resolution.clone(),
        })
    }

    /// `GET <api_url>?token=..&bat=..&res=..`
    pub fn build_request(&self, battery: u8) -> Result<Request, reqwest::Error> {
        let query = PollQuery {
            token: &self.token,
            bat: battery,
            res: &self.resolution,
        };
        self.http.get(&self.api_url).query(&query).build()
    }

    /// One fetch reflecting the current battery level.
    /// - Only HTTP 200 counts as success
    /// - Failures are logged here; callers only decide what to do next
    pub async fn fetch(&self, battery: u8) -> Result<PollResponse, FetchError> {
        let outcome = self.try_fetch(battery).await;
        match &outcome {
            Ok(response) => {
                debug!(status = ?response.status, "Poll succeeded");
            }
            Err(FetchError::Status { code, message }) => {
                warn!(code, message = ?message, "Error: Status code {code}");
            }
            Err(err) => {
                warn!(error = %err, "Request failed: {err}");
            }
        }
        outcome
    }

    async fn try_fetch(&self, battery: u8) -> Result<PollResponse, FetchError> {
        let request = self.build_request(battery)?;
        debug!(url = %redact_token(request.url()), "Polling");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|error_body| error_body.error);
            return Err(FetchError::Status {
                code: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn redact_token(url: &reqwest::Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "token" {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
