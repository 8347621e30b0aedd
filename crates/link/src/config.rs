use std::time::Duration;

use crate::transport::DeviceTarget;

pub const DEFAULT_DEVICE: &str = "BE:16:FA:00:03:7A";
pub const DEFAULT_CHARACTERISTIC: &str = "0000fff3-0000-1000-8000-00805f9b34fb";

/// Link manager timing and addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub target: DeviceTarget,
    /// Bound on a single connect attempt
    pub connect_timeout: Duration,
    /// Pause after connecting before the first write
    pub settle_delay: Duration,
    /// Write attempts per command before giving up
    pub attempts: u32,
    /// Delay between attempts for pixel batches
    pub retry_delay: Duration,
    /// Delay between attempts for control commands
    pub control_retry_delay: Duration,
    /// A write this recent counts as proof of liveness
    pub freshness: Duration,
    pub monitor_interval: Duration,
    /// Largest single write; `None` writes each command whole
    pub max_payload: Option<usize>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            target: DeviceTarget::new(DEFAULT_DEVICE, DEFAULT_CHARACTERISTIC),
            connect_timeout: Duration::from_secs(15),
            settle_delay: Duration::from_secs(1),
            attempts: 3,
            retry_delay: Duration::from_secs(2),
            control_retry_delay: Duration::from_secs(1),
            freshness: Duration::from_secs(15),
            monitor_interval: Duration::from_secs(10),
            max_payload: None,
        }
    }
}

impl LinkConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let device = env::var("CURTAIN_DEVICE").unwrap_or_else(|_| DEFAULT_DEVICE.to_string());
        let characteristic =
            env::var("CURTAIN_CHAR").unwrap_or_else(|_| DEFAULT_CHARACTERISTIC.to_string());

        let max_payload = env::var("CURTAIN_MAX_PAYLOAD")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0);

        let monitor_interval = env::var("CURTAIN_MONITOR_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&n| n > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.monitor_interval);

        Self {
            target: DeviceTarget::new(device, characteristic),
            max_payload,
            monitor_interval,
            ..defaults
        }
    }
}
