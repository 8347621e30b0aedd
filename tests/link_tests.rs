//! Link tests - the manager driving a real TCP gateway

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use led_curtain::frame::{encode_batches, PixelUpdate};
use led_curtain::link::{
    Connector, DeviceTarget, LinkConfig, LinkError, LinkManager, LinkState, TcpConnector, PROBE,
};
use led_curtain::types::PALETTE;

fn fast_config() -> LinkConfig {
    LinkConfig {
        target: DeviceTarget::new("AA:BB", "fff3"),
        connect_timeout: Duration::from_secs(2),
        settle_delay: Duration::ZERO,
        retry_delay: Duration::from_millis(10),
        control_retry_delay: Duration::from_millis(10),
        ..LinkConfig::default()
    }
}

/// Accepts gateway clients forever and forwards every framed payload.
async fn spawn_gateway() -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(socket);
                let mut hello = String::new();
                if reader.read_line(&mut hello).await.unwrap_or(0) == 0 {
                    return;
                }
                loop {
                    let mut len = [0u8; 2];
                    if reader.read_exact(&mut len).await.is_err() {
                        return;
                    }
                    let mut body = vec![0u8; u16::from_be_bytes(len) as usize];
                    if reader.read_exact(&mut body).await.is_err() {
                        return;
                    }
                    let _ = tx.send(body);
                }
            });
        }
    });

    (addr, rx)
}

async fn next_payload(rx: &mut mpsc::UnboundedReceiver<Vec<u8>>) -> Vec<u8> {
    loop {
        let payload = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("gateway timed out")
            .expect("gateway closed");
        if payload != PROBE {
            return payload;
        }
    }
}

#[tokio::test]
async fn test_batches_reach_the_gateway_in_order() {
    let (addr, mut rx) = spawn_gateway().await;
    let link = LinkManager::new(TcpConnector::new(addr), fast_config());

    let pixels: Vec<PixelUpdate> = (1..=12)
        .map(|i| PixelUpdate {
            row: i,
            col: 3,
            color: PALETTE[0],
        })
        .collect();
    let batches = encode_batches(&pixels);
    assert_eq!(batches.len(), 2);

    link.send_batch(&batches).await.unwrap();
    assert_eq!(link.state().await, LinkState::Connected);

    assert_eq!(next_payload(&mut rx).await, batches[0].to_vec());
    assert_eq!(next_payload(&mut rx).await, batches[1].to_vec());
}

#[tokio::test]
async fn test_control_command_is_sent_whole() {
    let (addr, mut rx) = spawn_gateway().await;
    let link = LinkManager::new(TcpConnector::new(addr), fast_config());

    link.send_control(&[0x7E, 0x07, 0x04, 0xFF, 0x00, 0x01, 0x02, 0x01, 0xEF])
        .await
        .unwrap();
    assert_eq!(next_payload(&mut rx).await.len(), 9);
}

#[tokio::test]
async fn test_max_payload_splits_writes() {
    let (addr, mut rx) = spawn_gateway().await;
    let config = LinkConfig {
        max_payload: Some(20),
        ..fast_config()
    };
    let link = LinkManager::new(TcpConnector::new(addr), config);

    let batches = encode_batches(&[PixelUpdate {
        row: 1,
        col: 1,
        color: PALETTE[1],
    }]);
    link.send_batch(&batches).await.unwrap();

    let mut joined = Vec::new();
    for expected in [20, 20, 14] {
        let part = next_payload(&mut rx).await;
        assert_eq!(part.len(), expected);
        joined.extend(part);
    }
    assert_eq!(joined, batches[0].to_vec());
}

#[tokio::test]
async fn test_unreachable_gateway_fails_after_retries() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let connector = TcpConnector::new(addr);
    assert!(!connector.is_available(&fast_config().target).await);

    let link = LinkManager::new(connector, fast_config());
    let err = link.send_batch(&[[0x00u8, 0x01]]).await.unwrap_err();
    assert!(matches!(err, LinkError::ConnectionFailure { attempts: 3, .. }));
    assert_eq!(link.state().await, LinkState::Faulted);

    // Disconnect is always safe.
    link.disconnect().await;
    assert_eq!(link.state().await, LinkState::Disconnected);
}
