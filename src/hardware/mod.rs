mod battery;
mod display;

pub use battery::{battery_from_config, Battery, PLACEHOLDER_LEVEL};
pub use display::{ConsoleDisplay, Display};

#[cfg(test)]
pub use battery::{FixedBattery, SysfsBattery};
#[cfg(test)]
pub use display::RecordingDisplay;
