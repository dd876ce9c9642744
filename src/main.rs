mod config;
mod eink_client;
mod hardware;
mod poll_loop;
#[cfg(test)]
mod test_support;
mod types;
mod wifi;

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::eink_client::EinkClient;
use crate::hardware::{battery_from_config, ConsoleDisplay};
use crate::poll_loop::PollLoop;
use crate::wifi::link_from_config;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().await;

    let client = match EinkClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let mut poll = PollLoop::new(
        client,
        battery_from_config(&config),
        ConsoleDisplay::stdout(),
        config.default_refresh_interval(),
    );

    let link = link_from_config(&config);
    if let Err(err) = poll.connect(link.as_ref(), &config).await {
        error!(error = %err, "WiFi unavailable, giving up");
        return ExitCode::FAILURE;
    }

    info!(api_url = %config.api_url, "Starting poll loop");
    poll.run().await;
    ExitCode::SUCCESS
}
