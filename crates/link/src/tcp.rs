//! Link over a TCP gateway that relays writes to the radio.
//!
//! The gateway protocol is minimal: after connecting, the client sends one
//! line naming the target (`<device> <characteristic>\n`); every write is then
//! framed as a big-endian `u16` length followed by the payload. A
//! zero-length frame is never sent.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::transport::{Connector, DeviceTarget, Link};

/// Scan timeout used by [`Connector::is_available`]
const PROBE_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct TcpConnector {
    gateway: SocketAddr,
}

impl TcpConnector {
    pub fn new(gateway: SocketAddr) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> SocketAddr {
        self.gateway
    }
}

#[derive(Debug)]
pub struct TcpLink {
    stream: TcpStream,
    open: bool,
}

impl Connector for TcpConnector {
    type Link = TcpLink;

    async fn connect(&self, target: &DeviceTarget) -> Result<TcpLink, TransportError> {
        let mut stream = TcpStream::connect(self.gateway).await?;
        stream.set_nodelay(true)?;
        let hello = format!("{} {}\n", target.device, target.characteristic);
        stream.write_all(hello.as_bytes()).await?;
        stream.flush().await?;
        info!(gateway = %self.gateway, device = %target, "gateway connected");
        Ok(TcpLink { stream, open: true })
    }

    async fn is_available(&self, target: &DeviceTarget) -> bool {
        let probe = TcpStream::connect(self.gateway);
        match tokio::time::timeout(PROBE_CONNECT_TIMEOUT, probe).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(
                    gateway = %self.gateway,
                    device = %target,
                    error = %e,
                    "gateway unreachable"
                );
                false
            }
            Err(_) => false,
        }
    }
}

impl TcpLink {
    async fn write_frame(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let len = u16::try_from(data.len())
            .map_err(|_| TransportError::Io(format!("payload too large: {} bytes", data.len())))?;
        self.stream.write_all(&len.to_be_bytes()).await?;
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

impl Link for TcpLink {
    fn is_connected(&self) -> bool {
        self.open
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::NotConnected);
        }
        if data.is_empty() {
            return Ok(());
        }
        let result = self.write_frame(data).await;
        if result.is_err() {
            self.open = false;
        }
        result
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn writes_are_length_prefixed_after_hello() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let gateway = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(socket);
            let mut hello = String::new();
            reader.read_line(&mut hello).await.unwrap();
            let mut len = [0u8; 2];
            reader.read_exact(&mut len).await.unwrap();
            let mut body = vec![0u8; u16::from_be_bytes(len) as usize];
            reader.read_exact(&mut body).await.unwrap();
            (hello, body)
        });

        let connector = TcpConnector::new(addr);
        let target = DeviceTarget::new("BE:16:FA:00:03:7A", "fff3");
        let mut link = connector.connect(&target).await.unwrap();
        link.write(&[0x7E, 0x07, 0x04]).await.unwrap();

        let (hello, body) = gateway.await.unwrap();
        assert_eq!(hello, "BE:16:FA:00:03:7A fff3\n");
        assert_eq!(body, vec![0x7E, 0x07, 0x04]);
    }

    #[tokio::test]
    async fn closed_link_rejects_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move { listener.accept().await.map(|(s, _)| s) });

        let connector = TcpConnector::new(addr);
        let mut link = connector
            .connect(&DeviceTarget::new("dev", "char"))
            .await
            .unwrap();
        let _peer = accept.await.unwrap().unwrap();
        link.close().await.unwrap();
        assert!(!link.is_connected());
        assert_eq!(link.write(&[0x00]).await, Err(TransportError::NotConnected));
    }
}
