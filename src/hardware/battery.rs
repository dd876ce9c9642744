use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::config::Config;
use crate::types::ClientError;

/// Level reported when no real gauge is available.
pub const PLACEHOLDER_LEVEL: u8 = 85;

/// Source of the battery charge, in percent.
#[async_trait]
pub trait Battery: Send + Sync {
    async fn level(&self) -> Result<u8, ClientError>;
}

#[async_trait]
impl<T: Battery + ?Sized> Battery for Box<T> {
    async fn level(&self) -> Result<u8, ClientError> {
        (**self).level().await
    }
}

/// Pick the gauge named in the configuration.
pub fn battery_from_config(config: &Config) -> Box<dyn Battery> {
    match config.battery_capacity_path.as_deref() {
        Some(path) => Box::new(SysfsBattery::new(path)),
        None => Box::new(FixedBattery::default()),
    }
}

/// Always reports the same charge.
#[derive(Debug, Clone, Copy)]
pub struct FixedBattery(pub u8);

impl Default for FixedBattery {
    fn default() -> Self {
        Self(PLACEHOLDER_LEVEL)
    }
}

#[async_trait]
impl Battery for FixedBattery {
    async fn level(&self) -> Result<u8, ClientError> {
        Ok(self.0)
    }
}

/// Reads a Linux power-supply `capacity` file,
/// e.g. `/sys/class/power_supply/max77818_battery/capacity` on a reMarkable 2.
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    capacity_path: PathBuf,
}

impl SysfsBattery {
    pub fn new(capacity_path: impl Into<PathBuf>) -> Self {
        Self {
            capacity_path: capacity_path.into(),
        }
    }
}

#[async_trait]
impl Battery for SysfsBattery {
    async fn level(&self) -> Result<u8, ClientError> {
        let raw = fs::read_to_string(&self.capacity_path).await?;
        parse_capacity(&raw).ok_or_else(|| {
            ClientError::Battery(format!(
                "unexpected capacity `{}` in {}",
                raw.trim(),
                self.capacity_path.display()
            ))
        })
    }
}

fn parse_capacity(raw: &str) -> Option<u8> {
    let value: i64 = raw.trim().parse().ok()?;
    Some(value.clamp(0, 100) as u8)
}
