use crate::relay::endpoint::Endpoint;
use crate::relay::relay_command::RelayCommand;
use crate::room::RoomRegistry;
use crate::signaling::SignalingOutput;
use std::collections::HashMap;
use std::sync::Arc;
use tandem_core::{EndpointId, Envelope, Signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// The signaling relay actor.
///
/// Owns the connection table and the room registry; all mutation happens on this
/// one task, so nothing here needs a lock. Payloads are forwarded, never read.
pub struct Relay {
    registry: RoomRegistry,
    connections: HashMap<EndpointId, Endpoint>,
    command_rx: mpsc::Receiver<RelayCommand>,
    output: Arc<dyn SignalingOutput>,
}

impl Relay {
    pub fn new(command_rx: mpsc::Receiver<RelayCommand>, output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            connections: HashMap::new(),
            command_rx,
            output,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Relay event loop finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Connect {
                endpoint_id,
                display_name,
            } => self.on_connect(endpoint_id, display_name).await,

            RelayCommand::Frame { endpoint_id, text } => {
                if !self.connections.contains_key(&endpoint_id) {
                    debug!("Dropping frame from unknown endpoint {}", endpoint_id);
                    return;
                }
                match Envelope::parse(&text) {
                    Ok(envelope) => self.dispatch(endpoint_id, envelope).await,
                    Err(e) => warn!("Malformed envelope from {}: {}", endpoint_id, e),
                }
            }

            RelayCommand::Disconnect { endpoint_id } => self.on_disconnect(endpoint_id).await,

            RelayCommand::ListRooms { reply } => {
                let _ = reply.send(self.registry.summaries());
            }
        }
    }

    async fn dispatch(&mut self, sender: EndpointId, envelope: Envelope) {
        match envelope.kind {
            SignalKind::Join => self.on_join(sender, envelope).await,
            SignalKind::Leave => self.on_leave(sender, envelope).await,
            SignalKind::Offer
            | SignalKind::Answer
            | SignalKind::IceCandidate
            | SignalKind::ChatMessage
            | SignalKind::EndCall => self.route(sender, &envelope).await,
            SignalKind::Welcome => warn!("Endpoint {} sent a relay-only event", sender),
        }
    }

    async fn on_connect(&mut self, endpoint_id: EndpointId, display_name: Option<String>) {
        let endpoint = Endpoint::new(endpoint_id, display_name);
        info!("Endpoint connected: {}", endpoint);
        self.connections.insert(endpoint_id, endpoint);

        match serde_json::to_string(&Signal::Welcome { id: endpoint_id }) {
            Ok(json) => self.output.deliver(endpoint_id, json).await,
            Err(e) => error!("Failed to serialize welcome: {}", e),
        }
    }

    async fn on_join(&mut self, sender: EndpointId, envelope: Envelope) {
        let room = envelope.room.clone();

        if let Some(previous) = self.registry.join(sender, room.clone()) {
            info!("Endpoint {} moved out of room '{}'", sender, previous);
            self.route(sender, &Envelope::new(SignalKind::Leave, previous))
                .await;
        }
        if let Some(endpoint) = self.connections.get_mut(&sender) {
            info!("Endpoint {} joined room '{}'", endpoint, room);
            endpoint.room = Some(room);
        }

        self.route(sender, &envelope).await;
    }

    async fn on_leave(&mut self, sender: EndpointId, envelope: Envelope) {
        self.route(sender, &envelope).await;

        if self.registry.leave(sender, &envelope.room) {
            info!("Endpoint {} left room '{}'", sender, envelope.room);
            if let Some(endpoint) = self.connections.get_mut(&sender) {
                endpoint.room = None;
            }
        }
    }

    async fn on_disconnect(&mut self, endpoint_id: EndpointId) {
        let Some(endpoint) = self.connections.remove(&endpoint_id) else {
            return;
        };
        info!("Endpoint disconnected: {}", endpoint);

        let Some(room) = self.registry.remove_endpoint(endpoint_id) else {
            return;
        };
        self.route(endpoint_id, &Envelope::new(SignalKind::Leave, room))
            .await;
    }

    /// Delivers a copy of `envelope` to every member of its room except `sender`.
    async fn route(&self, sender: EndpointId, envelope: &Envelope) {
        let recipients: Vec<EndpointId> = self
            .registry
            .members(&envelope.room)
            .into_iter()
            .filter(|id| *id != sender)
            .collect();

        if recipients.is_empty() {
            debug!(
                "No recipients for '{}' from {} in room '{}'",
                envelope.kind, sender, envelope.room
            );
            return;
        }

        let text = match envelope.delivery(sender) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to render '{}' delivery: {}", envelope.kind, e);
                return;
            }
        };

        debug!(
            "Routing '{}' from {} to {} member(s) of '{}'",
            envelope.kind,
            sender,
            recipients.len(),
            envelope.room
        );
        for recipient in recipients {
            self.output.deliver(recipient, text.clone()).await;
        }
    }
}
