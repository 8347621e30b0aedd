//! TCP server for the dispatch surface
//!
//! Handles incoming connections and answers each request line with exactly
//! one response line. Requests from all clients go through the same
//! [`Controller`], which applies them one at a time.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use curtain_link::Connector;

use crate::controller::Controller;
use crate::protocol::*;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let host = env::var("CURTAIN_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("CURTAIN_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        Self { host, port }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    /// Check if the dispatch server is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("CURTAIN_DISABLED")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false)
    }
}

/// Apply one request and build its response.
pub async fn dispatch<C: Connector>(controller: &Controller<C>, request: Request) -> Response {
    let seq = request.seq();
    let result = match request {
        Request::Start { autoplay, .. } => controller.start(autoplay).await.map(AckStatus::from),
        Request::Stop { .. } => Ok(controller.stop().await.into()),
        Request::Command { key, .. } => controller
            .send_immediate(&key)
            .await
            .map(|()| AckStatus::Sent),
    };

    match result {
        Ok(status) => Response::Ack(create_ack(seq, status)),
        Err(e) => {
            warn!(seq, code = ?e.code(), error = %e, "request failed");
            Response::Error(create_error(seq, e.code(), &e.to_string()))
        }
    }
}

/// Parse and apply one request line.
pub async fn handle_line<C: Connector>(controller: &Controller<C>, line: &str) -> Response {
    match parse_request(line) {
        Ok(request) => dispatch(controller, request).await,
        Err(e) => {
            let seq = extract_seq_best_effort(line).unwrap_or(0);
            Response::Error(create_error(seq, ErrorCode::InvalidMessage, &e.to_string()))
        }
    }
}

/// Start the TCP server
pub async fn run_server<C: Connector>(
    config: ServerConfig,
    controller: Arc<Controller<C>>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "dispatch server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, peer = %addr, "client connected");

        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, controller).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client<C: Connector>(
    socket: TcpStream,
    client_id: usize,
    controller: Arc<Controller<C>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    let mut buf: Vec<u8> = Vec::with_capacity(256);

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(client_id, request = trimmed, "request");

        let response = handle_line(&controller, trimmed).await;

        buf.clear();
        serde_json::to_writer(&mut buf, &response)?;
        buf.push(b'\n');
        writer.write_all(&buf).await?;
        writer.flush().await?;
    }

    Ok(())
}
