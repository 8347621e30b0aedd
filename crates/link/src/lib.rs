//! Link manager for the curtain's write characteristic.
//!
//! [`LinkManager`] is the only owner of the device connection. It serializes
//! access, verifies liveness with a no-op probe write, reconnects on demand and
//! retries failed writes a bounded number of times before dropping the
//! connection and reporting [`LinkError::ConnectionFailure`].
//!
//! Transports plug in through the [`Connector`] and [`Link`] traits:
//!
//! - [`TcpConnector`] relays writes through a TCP gateway
//! - [`DryRunConnector`] only logs what it would write
//!
//! # Environment Variables
//!
//! - `CURTAIN_DEVICE`: peripheral id (default: `BE:16:FA:00:03:7A`)
//! - `CURTAIN_CHAR`: write characteristic id
//! - `CURTAIN_MAX_PAYLOAD`: largest single write in bytes (default: whole command)
//! - `CURTAIN_MONITOR_SECS`: monitor interval (default: 10)

pub mod config;
pub mod error;
pub mod manager;
pub mod tcp;
pub mod transport;

pub use config::LinkConfig;
pub use error::{LinkError, TransportError};
pub use manager::{LinkManager, LinkState, MonitorStatus, PROBE};
pub use tcp::{TcpConnector, TcpLink};
pub use transport::{
    AnyConnector, AnyLink, Connector, DeviceTarget, DryRunConnector, DryRunLink, Link,
};
