//! WiFi association before the first poll.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::process::Command;
use tokio::time::{sleep, timeout as within};
use tracing::{debug, info, warn};

use crate::config::{Config, WifiBackend};
use crate::types::ClientError;

/// Station-mode network interface.
#[async_trait]
pub trait WifiLink: Send + Sync {
    async fn is_associated(&self) -> Result<bool, ClientError>;
    async fn associate(&self, ssid: &str, password: &str) -> Result<(), ClientError>;
    async fn local_address(&self) -> Result<IpAddr, ClientError>;
}

/// Build the link selected in the configuration.
pub fn link_from_config(config: &Config) -> Box<dyn WifiLink> {
    let probe_target = probe_target(&config.api_url);
    match config.wifi_backend {
        WifiBackend::Nmcli => Box::new(NmcliLink {
            interface: config.wifi_interface.clone(),
            wait_secs: config.wifi_join_timeout_secs,
            probe_target,
        }),
        WifiBackend::AssumeConnected => Box::new(AssumeConnected { probe_target }),
    }
}

/// Join the configured network, bounded by `wifi_join_timeout_secs`.
///
/// Returns the local address when it can be determined.
pub async fn connect_wifi(
    link: &dyn WifiLink,
    config: &Config,
) -> Result<Option<IpAddr>, ClientError> {
    join_network(
        link,
        &config.wifi_ssid,
        &config.wifi_password,
        config.wifi_join_timeout(),
        config.wifi_poll_interval(),
    )
    .await
}

async fn join_network(
    link: &dyn WifiLink,
    ssid: &str,
    password: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<IpAddr>, ClientError> {
    if !check_associated(link).await {
        info!(ssid, "Connecting to WiFi...");
        // the deadline covers the association request as well as the polling
        let joined = within(timeout, async {
            if let Err(err) = link.associate(ssid, password).await {
                warn!(error = %err, "WiFi association request failed");
            }
            while !check_associated(link).await {
                sleep(poll_interval).await;
            }
        })
        .await;

        if joined.is_err() {
            return Err(ClientError::WifiTimeout {
                ssid: ssid.to_string(),
                waited_secs: timeout.as_secs(),
            });
        }
    }

    match link.local_address().await {
        Ok(addr) => {
            info!(addr = %addr, "WiFi connected: {addr}");
            Ok(Some(addr))
        }
        Err(err) => {
            warn!(error = %err, "WiFi connected, local address unknown");
            Ok(None)
        }
    }
}

async fn check_associated(link: &dyn WifiLink) -> bool {
    link.is_associated().await.unwrap_or_else(|err| {
        warn!(error = %err, "Failed to query WiFi state");
        false
    })
}

/// NetworkManager-driven station interface.
pub struct NmcliLink {
    interface: Option<String>,
    wait_secs: u64,
    probe_target: String,
}

#[async_trait]
impl WifiLink for NmcliLink {
    async fn is_associated(&self) -> Result<bool, ClientError> {
        let stdout = run_command("nmcli", &["-t", "-f", "DEVICE,TYPE,STATE", "device"]).await?;
        Ok(wifi_device_connected(&stdout, self.interface.as_deref()))
    }

    async fn associate(&self, ssid: &str, password: &str) -> Result<(), ClientError> {
        let wait = self.wait_secs.to_string();
        let mut args = vec![
            "--wait", wait.as_str(), "device", "wifi", "connect", ssid, "password", password,
        ];
        if let Some(interface) = self.interface.as_deref() {
            args.extend(["ifname", interface]);
        }
        run_command("nmcli", &args).await.map(|_| ())
    }

    async fn local_address(&self) -> Result<IpAddr, ClientError> {
        probe_local_address(&self.probe_target).await
    }
}

/// For hosts whose network is brought up by something else.
pub struct AssumeConnected {
    probe_target: String,
}

#[async_trait]
impl WifiLink for AssumeConnected {
    async fn is_associated(&self) -> Result<bool, ClientError> {
        Ok(true)
    }

    async fn associate(&self, _ssid: &str, _password: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn local_address(&self) -> Result<IpAddr, ClientError> {
        probe_local_address(&self.probe_target).await
    }
}

async fn run_command(command: &str, args: &[&str]) -> Result<String, ClientError> {
    let output = Command::new(command)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await?;
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    // args may carry the passphrase, so only the subcommand is reported
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let subcommand = args
        .iter()
        .copied()
        .find(|arg| !arg.is_empty() && arg.chars().all(|c| c.is_ascii_lowercase()))
        .unwrap_or_default();
    Err(ClientError::Command(if stderr.is_empty() {
        format!(
            "`{} {}` failed with status {}",
            command, subcommand, output.status
        )
    } else {
        format!("`{} {}` failed: {}", command, subcommand, stderr)
    }))
}

/// Scan `nmcli -t -f DEVICE,TYPE,STATE device` output for a connected WiFi device,
/// restricted to `interface` when one is configured.
fn wifi_device_connected(device_table: &str, interface: Option<&str>) -> bool {
    device_table.lines().any(|line| {
        let mut fields = line.trim().splitn(3, ':');
        let (Some(device), Some(kind), Some(state)) = (fields.next(), fields.next(), fields.next())
        else {
            return false;
        };
        let wanted = match interface {
            Some(interface) => device == interface,
            None => kind == "wifi",
        };
        wanted && state == "connected"
    })
}

/// `host:port` of the API server, used to find the outbound interface address.
fn probe_target(api_url: &str) -> String {
    reqwest::Url::parse(api_url)
        .ok()
        .and_then(|url| {
            let host = url.host_str()?.to_string();
            let port = url.port_or_known_default()?;
            Some(format!("{host}:{port}"))
        })
        .unwrap_or_else(|| "1.1.1.1:80".to_string())
}

async fn probe_local_address(target: &str) -> Result<IpAddr, ClientError> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(target).await?;
    let addr = socket.local_addr()?.ip();
    debug!(probe = target, addr = %addr, "Probed local address");
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Reports associated after `ready_after` state checks.
    struct ScriptedLink {
        ready_after: usize,
        checks: AtomicUsize,
        associate_calls: AtomicUsize,
    }

    impl ScriptedLink {
        fn new(ready_after: usize) -> Self {
            Self {
                ready_after,
                checks: AtomicUsize::new(0),
                associate_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WifiLink for ScriptedLink {
        async fn is_associated(&self) -> Result<bool, ClientError> {
            let seen = self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(seen >= self.ready_after)
        }

        async fn associate(&self, _ssid: &str, _password: &str) -> Result<(), ClientError> {
            self.associate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn local_address(&self) -> Result<IpAddr, ClientError> {
            Ok(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 40)))
        }
    }

    const POLL: Duration = Duration::from_millis(5);

    #[tokio::test]
    async fn already_associated_skips_connect() {
        let link = ScriptedLink::new(0);
        let addr = join_network(&link, "ssid", "pass", Duration::from_secs(1), POLL)
            .await
            .unwrap();
        assert_eq!(addr, Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 40))));
        assert_eq!(link.associate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn waits_until_associated() {
        let link = ScriptedLink::new(3);
        join_network(&link, "ssid", "pass", Duration::from_secs(5), POLL)
            .await
            .unwrap();
        assert_eq!(link.associate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(link.checks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn gives_up_after_timeout() {
        let link = ScriptedLink::new(usize::MAX);
        let err = join_network(&link, "home", "pass", Duration::from_millis(30), POLL)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::WifiTimeout { ref ssid, .. } if ssid == "home"));
    }

    /// Association request that takes longer than any sane deadline.
    struct StalledLink;

    #[async_trait]
    impl WifiLink for StalledLink {
        async fn is_associated(&self) -> Result<bool, ClientError> {
            Ok(false)
        }

        async fn associate(&self, _ssid: &str, _password: &str) -> Result<(), ClientError> {
            sleep(Duration::from_millis(300)).await;
            Ok(())
        }

        async fn local_address(&self) -> Result<IpAddr, ClientError> {
            Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
        }
    }

    #[tokio::test]
    async fn timeout_covers_slow_association() {
        let started = std::time::Instant::now();
        let err = join_network(&StalledLink, "home", "pass", Duration::from_millis(50), POLL)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::WifiTimeout { .. }));
        assert!(started.elapsed() < Duration::from_millis(250));
    }

    const DEVICE_TABLE: &str = "eth0:ethernet:connected\nwlan0:wifi:disconnected\nlo:loopback:connected (externally)\n";

    #[test]
    fn wired_link_is_not_wifi_association() {
        assert!(!wifi_device_connected(DEVICE_TABLE, None));
        assert!(!wifi_device_connected(DEVICE_TABLE, Some("wlan0")));
    }

    #[test]
    fn connected_wifi_device_counts() {
        let table = "eth0:ethernet:unavailable\nwlan0:wifi:connected\n";
        assert!(wifi_device_connected(table, None));
        assert!(wifi_device_connected(table, Some("wlan0")));
        assert!(!wifi_device_connected(table, Some("wlan1")));
        assert!(!wifi_device_connected("wlan0:wifi:connecting\n", None));
        assert!(!wifi_device_connected("", None));
    }

    #[test]
    fn probe_target_follows_api_url() {
        assert_eq!(
            probe_target("http://10.0.0.2:8080/api/eink/relevant"),
            "10.0.0.2:8080"
        );
        assert_eq!(probe_target("https://lifehub.example/api"), "lifehub.example:443");
        assert_eq!(probe_target("not a url"), "1.1.1.1:80");
    }
}
