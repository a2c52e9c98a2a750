use crate::{RelayCommand, SignalingService};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tandem_core::EndpointId;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub name: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, params.name, service))
}

async fn handle_socket(socket: WebSocket, display_name: Option<String>, service: SignalingService) {
    let endpoint_id = EndpointId::new();
    info!("New WebSocket connection: {}", endpoint_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_connection(endpoint_id, tx);

    let connect = RelayCommand::Connect {
        endpoint_id,
        display_name,
    };
    if let Err(e) = service.relay_tx.send(connect).await {
        error!("Relay died: {}", e);
        service.remove_connection(&endpoint_id);
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        let cmd = RelayCommand::Frame {
                            endpoint_id,
                            text: text.as_str().to_owned(),
                        };
                        if let Err(e) = service.relay_tx.send(cmd).await {
                            error!("Relay died: {}", e);
                            break;
                        }
                    }
                    Message::Binary(_) => {
                        warn!("Dropping binary frame from {}", endpoint_id);
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Frames already read were queued ahead of this, so they are routed first.
    service.remove_connection(&endpoint_id);
    let _ = service
        .relay_tx
        .send(RelayCommand::Disconnect { endpoint_id })
        .await;
    info!("WebSocket disconnected: {}", endpoint_id);
}
