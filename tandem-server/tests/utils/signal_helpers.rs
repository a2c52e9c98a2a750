use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use tandem_core::{EndpointId, RoomSummary};
use tandem_server::{RelayCommand, SignalingService, router};

/// Timeout for a single expected frame (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// How long a client listens to prove nothing arrives (ms).
pub const SILENCE_MS: u64 = 200;

/// Registers a new endpoint with the relay and returns its id.
pub async fn connect_endpoint(
    relay_tx: &mpsc::Sender<RelayCommand>,
    name: &str,
) -> Result<EndpointId> {
    let endpoint_id = EndpointId::new();
    relay_tx
        .send(RelayCommand::Connect {
            endpoint_id,
            display_name: Some(name.to_owned()),
        })
        .await
        .context("Failed to send Connect")?;
    Ok(endpoint_id)
}

pub async fn send_frame(
    relay_tx: &mpsc::Sender<RelayCommand>,
    endpoint_id: EndpointId,
    frame: Value,
) -> Result<()> {
    send_text(relay_tx, endpoint_id, frame.to_string()).await
}

pub async fn send_text(
    relay_tx: &mpsc::Sender<RelayCommand>,
    endpoint_id: EndpointId,
    text: String,
) -> Result<()> {
    relay_tx
        .send(RelayCommand::Frame { endpoint_id, text })
        .await
        .context("Failed to send Frame")
}

pub async fn join_room(
    relay_tx: &mpsc::Sender<RelayCommand>,
    endpoint_id: EndpointId,
    room: &str,
) -> Result<()> {
    send_frame(relay_tx, endpoint_id, json!({ "event": "join", "room": room })).await
}

pub async fn disconnect(
    relay_tx: &mpsc::Sender<RelayCommand>,
    endpoint_id: EndpointId,
) -> Result<()> {
    relay_tx
        .send(RelayCommand::Disconnect { endpoint_id })
        .await
        .context("Failed to send Disconnect")
}

/// Round-trips through the relay; every command sent before has been handled on return.
pub async fn sync_relay(relay_tx: &mpsc::Sender<RelayCommand>) -> Result<Vec<RoomSummary>> {
    let (reply, rx) = oneshot::channel();
    relay_tx
        .send(RelayCommand::ListRooms { reply })
        .await
        .context("Failed to send ListRooms")?;
    rx.await.context("Relay dropped the reply")
}

/// Serves the full router on an ephemeral local port.
pub async fn start_test_server() -> Result<(SocketAddr, SignalingService)> {
    let service = SignalingService::spawn(256);
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind test listener")?;
    let addr = listener.local_addr()?;

    let app = router(service.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((addr, service))
}

/// Polls the relay until `room` has exactly `members` members.
pub async fn wait_for_members(service: &SignalingService, room: &str, members: usize) -> Result<()> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(SIGNAL_TIMEOUT_MS);

    loop {
        let rooms = service.list_rooms().await?;
        let current = rooms
            .iter()
            .find(|r| r.room.as_str() == room)
            .map(|r| r.members)
            .unwrap_or(0);
        if current == members {
            return Ok(());
        }
        if tokio::time::Instant::now() > deadline {
            anyhow::bail!("room '{}' has {} members, expected {}", room, current, members);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
