//! LED curtain runner (default binary).
//!
//! Starts the link monitor and the dispatch server, then waits for Ctrl-C or
//! SIGTERM. Games only run once a `start` request arrives.
//!
//! `CURTAIN_GATEWAY` selects a TCP link gateway (`host:port`); without it
//! every write is logged instead of sent.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use led_curtain::adapter::{run_server, Controller, RunSettings, ServerConfig};
use led_curtain::link::{AnyConnector, DryRunConnector, LinkConfig, LinkManager, TcpConnector};

fn connector_from_env() -> Result<AnyConnector> {
    match std::env::var("CURTAIN_GATEWAY") {
        Ok(addr) if !addr.trim().is_empty() => {
            let gateway: SocketAddr = addr
                .trim()
                .parse()
                .with_context(|| format!("invalid CURTAIN_GATEWAY {addr:?}"))?;
            info!(%gateway, "using TCP link gateway");
            Ok(AnyConnector::Tcp(TcpConnector::new(gateway)))
        }
        _ => {
            info!("CURTAIN_GATEWAY not set; dry-run link");
            Ok(AnyConnector::DryRun(DryRunConnector::new()))
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = term.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let link_config = LinkConfig::from_env();
    let monitor_interval = link_config.monitor_interval;
    info!(device = %link_config.target, "link configured");

    let link = Arc::new(LinkManager::new(connector_from_env()?, link_config));
    let controller = Arc::new(Controller::new(Arc::clone(&link), RunSettings::from_env())?);

    let (monitor_stop, monitor_rx) = watch::channel(false);
    let monitor = {
        let link = Arc::clone(&link);
        tokio::spawn(async move { link.monitor(monitor_interval, monitor_rx).await })
    };

    let server = if ServerConfig::is_disabled() {
        info!("dispatch server disabled via CURTAIN_DISABLED");
        None
    } else {
        let config = ServerConfig::from_env();
        let controller = Arc::clone(&controller);
        Some(tokio::spawn(async move {
            run_server(config, controller, None).await
        }))
    };

    match server {
        Some(mut server) => {
            tokio::select! {
                res = shutdown_signal() => res?,
                res = &mut server => {
                    // The accept loop only returns on error.
                    match res {
                        Ok(Err(e)) => warn!(error = %e, "dispatch server failed"),
                        Ok(Ok(())) => {}
                        Err(e) => warn!(error = %e, "dispatch server panicked"),
                    }
                }
            }
            server.abort();
        }
        None => shutdown_signal().await?,
    }

    info!("shutting down");
    controller.stop().await;
    let _ = monitor_stop.send(true);
    if let Err(e) = monitor.await {
        warn!(error = %e, "link monitor ended abnormally");
    }
    link.disconnect().await;
    Ok(())
}
