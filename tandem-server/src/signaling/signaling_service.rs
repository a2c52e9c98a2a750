use crate::error::RelayError;
use crate::relay::{Relay, RelayCommand};
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::{EndpointId, RoomSummary};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};

struct SignalingInner {
    connections: DashMap<EndpointId, mpsc::UnboundedSender<Message>>,
}

#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) relay_tx: mpsc::Sender<RelayCommand>,
}

impl SignalingService {
    pub fn new(relay_tx: mpsc::Sender<RelayCommand>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
            }),
            relay_tx,
        }
    }

    /// Creates the service together with its relay task.
    pub fn spawn(command_buffer: usize) -> Self {
        let (relay_tx, relay_rx) = mpsc::channel(command_buffer);
        let service = Self::new(relay_tx);

        let relay = Relay::new(relay_rx, Arc::new(service.clone()));
        tokio::spawn(relay.run());

        service
    }

    pub fn add_connection(&self, endpoint_id: EndpointId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(endpoint_id, tx);
    }

    pub fn remove_connection(&self, endpoint_id: &EndpointId) {
        self.inner.connections.remove(endpoint_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.relay_tx
            .send(RelayCommand::ListRooms { reply })
            .await
            .map_err(|_| RelayError::RelayStopped)?;
        rx.await.map_err(|_| RelayError::RelayStopped)
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn deliver(&self, endpoint_id: EndpointId, frame: String) {
        if let Some(connection) = self.inner.connections.get(&endpoint_id) {
            if let Err(e) = connection.send(Message::Text(frame.into())) {
                error!("Failed to queue WS message for {}: {:?}", endpoint_id, e);
            }
        } else {
            warn!(
                "Attempted to deliver to disconnected endpoint {}",
                endpoint_id
            );
        }
    }
}
