//! Transport seam between the link manager and the radio.
//!
//! A [`Connector`] opens [`Link`]s to a [`DeviceTarget`]. The manager never
//! touches a concrete transport; tests plug in scripted fakes.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::TransportError;
use crate::tcp::{TcpConnector, TcpLink};

/// Peripheral id and write characteristic, passed through opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    pub device: String,
    pub characteristic: String,
}

impl DeviceTarget {
    pub fn new(device: impl Into<String>, characteristic: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            characteristic: characteristic.into(),
        }
    }
}

impl std::fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.device, self.characteristic)
    }
}

/// An open connection to the device's write characteristic.
pub trait Link: Send + 'static {
    /// Whether the transport still claims to be connected
    fn is_connected(&self) -> bool;

    /// Write without response
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Opens links. Timeouts are applied by the caller.
pub trait Connector: Send + Sync + 'static {
    type Link: Link;

    fn connect(
        &self,
        target: &DeviceTarget,
    ) -> impl Future<Output = Result<Self::Link, TransportError>> + Send;

    /// Scan for the device without connecting
    fn is_available(&self, target: &DeviceTarget) -> impl Future<Output = bool> + Send;
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Connector that only logs what would be written.
#[derive(Debug, Clone, Default)]
pub struct DryRunConnector {
    written: Arc<AtomicU64>,
}

impl DryRunConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes seen across every link this connector opened
    pub fn writes(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct DryRunLink {
    target: DeviceTarget,
    written: Arc<AtomicU64>,
    open: bool,
}

impl Connector for DryRunConnector {
    type Link = DryRunLink;

    async fn connect(&self, target: &DeviceTarget) -> Result<DryRunLink, TransportError> {
        debug!(device = %target, "dry-run connect");
        Ok(DryRunLink {
            target: target.clone(),
            written: Arc::clone(&self.written),
            open: true,
        })
    }

    async fn is_available(&self, _target: &DeviceTarget) -> bool {
        true
    }
}

impl Link for DryRunLink {
    fn is_connected(&self) -> bool {
        self.open
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::NotConnected);
        }
        self.written.fetch_add(1, Ordering::Relaxed);
        debug!(device = %self.target, len = data.len(), bytes = %hex(data), "dry-run write");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        Ok(())
    }
}

/// Connector chosen at startup.
#[derive(Debug, Clone)]
pub enum AnyConnector {
    Tcp(TcpConnector),
    DryRun(DryRunConnector),
}

#[derive(Debug)]
pub enum AnyLink {
    Tcp(TcpLink),
    DryRun(DryRunLink),
}

impl Connector for AnyConnector {
    type Link = AnyLink;

    async fn connect(&self, target: &DeviceTarget) -> Result<AnyLink, TransportError> {
        match self {
            AnyConnector::Tcp(c) => c.connect(target).await.map(AnyLink::Tcp),
            AnyConnector::DryRun(c) => c.connect(target).await.map(AnyLink::DryRun),
        }
    }

    async fn is_available(&self, target: &DeviceTarget) -> bool {
        match self {
            AnyConnector::Tcp(c) => c.is_available(target).await,
            AnyConnector::DryRun(c) => c.is_available(target).await,
        }
    }
}

impl Link for AnyLink {
    fn is_connected(&self) -> bool {
        match self {
            AnyLink::Tcp(l) => l.is_connected(),
            AnyLink::DryRun(l) => l.is_connected(),
        }
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        match self {
            AnyLink::Tcp(l) => l.write(data).await,
            AnyLink::DryRun(l) => l.write(data).await,
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self {
            AnyLink::Tcp(l) => l.close().await,
            AnyLink::DryRun(l) => l.close().await,
        }
    }
}
