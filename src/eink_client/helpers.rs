use std::time::Duration;

use crate::types::FetchError;

use super::api_types::PollResponse;

/// Sleep before the next poll: the server's `config.refresh_interval`, else `default`.
///
/// A failed fetch also yields `default`.
pub fn next_refresh_interval(
    outcome: &Result<PollResponse, FetchError>,
    default: Duration,
) -> Duration {
    outcome
        .as_ref()
        .ok()
        .and_then(|response| response.config.as_ref())
        .and_then(|config| config.refresh_interval)
        .map(Duration::from_secs)
        .unwrap_or(default)
}
