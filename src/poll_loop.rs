use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::eink_client::{next_refresh_interval, render_lines, EinkClient};
use crate::hardware::{Battery, Display, PLACEHOLDER_LEVEL};
use crate::types::ClientError;
use crate::wifi::{connect_wifi, WifiLink};

/// Where the device is in its poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Disconnected,
    Connecting,
    ConnectedIdle,
    Fetching,
    Rendering,
    Sleeping,
}

/// Sequential poll loop: battery, fetch, render, sleep.
pub struct PollLoop<B, D> {
    client: EinkClient,
    battery: B,
    display: D,
    default_refresh: Duration,
    state: LoopState,
}

impl<B: Battery, D: Display> PollLoop<B, D> {
    pub fn new(client: EinkClient, battery: B, display: D, default_refresh: Duration) -> Self {
        Self {
            client,
            battery,
            display,
            default_refresh,
            state: LoopState::Disconnected,
        }
    }

    /// Associate once before polling. Mid-loop drops are not re-joined.
    pub async fn connect(
        &mut self,
        link: &dyn WifiLink,
        config: &Config,
    ) -> Result<(), ClientError> {
        self.transition(LoopState::Connecting);
        match connect_wifi(link, config).await {
            Ok(_) => {
                self.transition(LoopState::ConnectedIdle);
                Ok(())
            }
            Err(err) => {
                self.transition(LoopState::Disconnected);
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Poll forever.
    pub async fn run(mut self) {
        loop {
            let wait = self.run_once().await;
            self.transition(LoopState::Sleeping);
            info!(secs = wait.as_secs(), "Sleeping for {}s...", wait.as_secs());
            sleep(wait).await;
        }
    }

    /// One iteration up to, not including, the sleep. Returns how long to sleep.
    pub async fn run_once(&mut self) -> Duration {
        let battery = match self.battery.level().await {
            Ok(level) => level,
            Err(err) => {
                warn!(error = %err, "Battery read failed, reporting placeholder level");
                PLACEHOLDER_LEVEL
            }
        };

        self.transition(LoopState::Fetching);
        let outcome = self.client.fetch(battery).await;

        self.transition(LoopState::Rendering);
        if let Some(lines) = render_lines(outcome.as_ref().ok()) {
            if let Err(err) = self.display.show(&lines).await {
                warn!(error = %err, "Display update failed");
            }
        }

        next_refresh_interval(&outcome, self.default_refresh)
    }

    fn transition(&mut self, next: LoopState) {
        debug!(from = ?self.state, to = ?next, "Loop state");
        self.state = next;
    }

    #[cfg(test)]
    fn display(&self) -> &D {
        &self.display
    }
}
