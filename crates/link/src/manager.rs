//! Link manager: the single owner of the device connection.
//!
//! Every operation that touches the connection takes the manager's lock, so
//! connects never race and a batch is written in full before anything else
//! gets the link.

use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::config::LinkConfig;
use crate::error::{LinkError, TransportError};
use crate::transport::{Connector, Link};

/// Write-without-response that the device ignores; used to verify liveness.
pub const PROBE: [u8; 1] = [0x00];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    /// Retries were exhausted; the next acquisition starts from scratch
    Faulted,
}

/// Result of one monitor pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    /// A recent write already proves the link is alive
    Fresh,
    /// The probe write succeeded
    Verified,
    /// The link was (re)established
    Reconnected,
    /// The device was not found by the scan
    Unavailable,
    /// Reconnecting failed; the next pass tries again
    Failed,
}

struct Inner<L> {
    link: Option<L>,
    state: LinkState,
    last_ok: Option<Instant>,
}

pub struct LinkManager<C: Connector> {
    connector: C,
    config: LinkConfig,
    inner: Mutex<Inner<C::Link>>,
}

impl<C: Connector> LinkManager<C> {
    pub fn new(connector: C, config: LinkConfig) -> Self {
        Self {
            connector,
            config,
            inner: Mutex::new(Inner {
                link: None,
                state: LinkState::Disconnected,
                last_ok: None,
            }),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub async fn state(&self) -> LinkState {
        self.inner.lock().await.state
    }

    /// Make sure a verified connection exists.
    ///
    /// An existing connection that claims to be live is verified with a
    /// [`PROBE`] write; anything else is torn down and replaced.
    pub async fn acquire_connection(&self) -> Result<(), LinkError> {
        let mut inner = self.inner.lock().await;
        self.ensure(&mut inner).await
    }

    /// Write `commands` in order. Each command gets up to `attempts` tries;
    /// exhausting them drops the connection and fails the whole batch.
    pub async fn send_batch<B: AsRef<[u8]>>(&self, commands: &[B]) -> Result<(), LinkError> {
        if commands.is_empty() {
            return Ok(());
        }
        let mut inner = self.inner.lock().await;
        for command in commands {
            self.write_with_retry(&mut inner, command.as_ref(), self.config.retry_delay)
                .await?;
        }
        debug!(commands = commands.len(), "batch sent");
        Ok(())
    }

    /// Write one control command, retrying with the control delay.
    pub async fn send_control(&self, command: &[u8]) -> Result<(), LinkError> {
        let mut inner = self.inner.lock().await;
        self.write_with_retry(&mut inner, command, self.config.control_retry_delay)
            .await
    }

    /// Drop the connection. Safe to call at any time; close errors are
    /// ignored.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        Self::teardown(&mut inner).await;
        inner.state = LinkState::Disconnected;
    }

    /// Check liveness every `interval` until `stop` flips to true (or its
    /// sender is dropped).
    pub async fn monitor(&self, interval: Duration, mut stop: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "link monitor started");
        loop {
            if *stop.borrow() {
                break;
            }
            let status = self.check_once().await;
            debug!(?status, "link monitor pass");
            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = sleep(interval) => {}
            }
        }
        info!("link monitor stopped");
    }

    /// One monitor pass.
    pub async fn check_once(&self) -> MonitorStatus {
        let mut inner = self.inner.lock().await;

        let live = inner.link.as_ref().map_or(false, |l| l.is_connected());
        if !live {
            warn!(device = %self.config.target, "link lost; reconnecting");
            return self.rescan_and_connect(&mut inner).await;
        }

        if inner
            .last_ok
            .map_or(false, |t| t.elapsed() < self.config.freshness)
        {
            return MonitorStatus::Fresh;
        }

        let probe = match inner.link.as_mut() {
            Some(link) => link.write(&PROBE).await,
            None => Err(TransportError::NotConnected),
        };
        match probe {
            Ok(()) => {
                inner.last_ok = Some(Instant::now());
                MonitorStatus::Verified
            }
            Err(e) => {
                warn!(error = %LinkError::VerificationFailure(e), "reconnecting");
                Self::teardown(&mut inner).await;
                inner.state = LinkState::Disconnected;
                self.rescan_and_connect(&mut inner).await
            }
        }
    }

    async fn rescan_and_connect(&self, inner: &mut Inner<C::Link>) -> MonitorStatus {
        if !self.connector.is_available(&self.config.target).await {
            warn!(device = %self.config.target, "device not found");
            return MonitorStatus::Unavailable;
        }
        match self.ensure(inner).await {
            Ok(()) => MonitorStatus::Reconnected,
            Err(e) => {
                warn!(error = %e, "reconnect failed");
                MonitorStatus::Failed
            }
        }
    }

    async fn ensure(&self, inner: &mut Inner<C::Link>) -> Result<(), LinkError> {
        if let Some(link) = inner.link.as_mut() {
            if link.is_connected() {
                match link.write(&PROBE).await {
                    Ok(()) => {
                        inner.last_ok = Some(Instant::now());
                        inner.state = LinkState::Connected;
                        return Ok(());
                    }
                    Err(e) => warn!(error = %e, "connection probe failed"),
                }
            }
        }

        Self::teardown(inner).await;
        inner.state = LinkState::Connecting;
        let connected = match timeout(
            self.config.connect_timeout,
            self.connector.connect(&self.config.target),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        };

        match connected {
            Ok(link) => {
                sleep(self.config.settle_delay).await;
                inner.link = Some(link);
                inner.state = LinkState::Connected;
                inner.last_ok = Some(Instant::now());
                info!(device = %self.config.target, "link connected");
                Ok(())
            }
            Err(cause) => {
                inner.state = LinkState::Disconnected;
                warn!(device = %self.config.target, error = %cause, "connect failed");
                Err(LinkError::ConnectionFailure { attempts: 1, cause })
            }
        }
    }

    async fn try_write(&self, inner: &mut Inner<C::Link>, data: &[u8]) -> Result<(), LinkError> {
        self.ensure(inner).await?;
        let link = inner
            .link
            .as_mut()
            .ok_or(LinkError::WriteFailure(TransportError::NotConnected))?;

        let chunk = self.config.max_payload.unwrap_or(data.len()).max(1);
        for part in data.chunks(chunk) {
            link.write(part).await.map_err(LinkError::WriteFailure)?;
        }
        inner.last_ok = Some(Instant::now());
        Ok(())
    }

    async fn write_with_retry(
        &self,
        inner: &mut Inner<C::Link>,
        data: &[u8],
        delay: Duration,
    ) -> Result<(), LinkError> {
        let attempts = self.config.attempts.max(1);
        let mut last = TransportError::NotConnected;
        for attempt in 1..=attempts {
            match self.try_write(inner, data).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "link write failed");
                    last = e.cause().clone();
                    if attempt < attempts {
                        sleep(delay).await;
                    }
                }
            }
        }

        Self::teardown(inner).await;
        inner.state = LinkState::Faulted;
        Err(LinkError::ConnectionFailure {
            attempts,
            cause: last,
        })
    }

    async fn teardown(inner: &mut Inner<C::Link>) {
        if let Some(mut link) = inner.link.take() {
            if let Err(e) = link.close().await {
                debug!(error = %e, "close failed");
            }
        }
        inner.last_ok = None;
    }
}
