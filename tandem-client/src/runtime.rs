use crate::call::{CallController, CallUpdate};
use crate::chat::ChatChannel;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::media::{LocalCandidate, MediaBackend, WebRtcMedia};
use crate::signaling::{SignalSink, SignalingClient};
use std::sync::Arc;
use tandem_core::Signal;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

/// What the user can ask a running participant to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    StartCall,
    EndCall,
    ToggleAudio,
    ToggleVideo,
    Chat(String),
    Quit,
}

/// One participant: a relay connection, a call controller and a chat channel
/// driven from a single task.
pub struct ClientRuntime<M> {
    config: ClientConfig,
    signaling: SignalingClient,
    controller: CallController<M>,
    chat: ChatChannel,
    sink: Arc<dyn SignalSink>,
    candidates: mpsc::UnboundedReceiver<LocalCandidate>,
}

impl ClientRuntime<WebRtcMedia> {
    /// Connects to the relay and wires up the `webrtc` media backend.
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let (candidate_tx, candidate_rx) = mpsc::unbounded_channel();
        let media = WebRtcMedia::new(config.ice_servers.clone(), candidate_tx);
        let signaling = SignalingClient::connect(&config.connect_url(), config.reconnect).await?;
        Ok(Self::new(config, signaling, media, candidate_rx))
    }
}

impl<M: MediaBackend> ClientRuntime<M> {
    /// `candidates` carries the local ICE candidates `media` gathers.
    pub fn new(
        config: ClientConfig,
        signaling: SignalingClient,
        media: M,
        candidates: mpsc::UnboundedReceiver<LocalCandidate>,
    ) -> Self {
        let sink: Arc<dyn SignalSink> = Arc::new(signaling.sink());
        let mut controller = CallController::new(config.room.clone(), media, Arc::clone(&sink));
        controller.set_local_id(signaling.local_id());

        Self {
            config,
            signaling,
            controller,
            chat: ChatChannel::new(Arc::clone(&sink)),
            sink,
            candidates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallUpdate> {
        self.controller.subscribe()
    }

    pub fn local_id(&self) -> tandem_core::EndpointId {
        self.signaling.local_id()
    }

    /// Joins the room and serves commands until `Quit` or the relay goes away.
    pub async fn run(mut self, mut commands: mpsc::Receiver<ClientCommand>) -> Result<(), ClientError> {
        self.sink
            .send(Signal::Join {
                room: self.config.room.clone(),
                name: Some(self.config.name.clone()),
                from: None,
            })
            .await?;
        info!("Joined room '{}' as {}", self.config.room, self.config.name);

        loop {
            tokio::select! {
                signal = self.signaling.next_signal() => match signal {
                    Some(signal) => {
                        if let Err(e) = self.controller.handle_signal(signal).await {
                            warn!("Call error: {}", e);
                        }
                    }
                    None => {
                        warn!("Relay connection lost");
                        self.controller.on_transport_closed().await;
                        return Err(ClientError::Closed);
                    }
                },

                Some(candidate) = self.candidates.recv() => {
                    self.controller.on_local_candidate(candidate).await;
                }

                command = commands.recv() => match command {
                    Some(ClientCommand::Quit) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn handle_command(&mut self, command: ClientCommand) {
        let result = match command {
            ClientCommand::StartCall => self.controller.start_call().await.map_err(ClientError::from),
            ClientCommand::EndCall => self.controller.end_call().await.map_err(ClientError::from),
            ClientCommand::ToggleAudio => {
                self.controller.toggle_audio().await;
                Ok(())
            }
            ClientCommand::ToggleVideo => {
                self.controller.toggle_video().await;
                Ok(())
            }
            ClientCommand::Chat(text) => self
                .chat
                .send(&self.config.room, &self.config.name, &text)
                .await
                .map_err(ClientError::from),
            ClientCommand::Quit => Ok(()),
        };

        match result {
            Ok(()) => {}
            // Call failures are already on the update stream.
            Err(ClientError::Call(e)) => warn!("Call command failed: {}", e),
            Err(e) => {
                warn!("Command failed: {}", e);
                self.controller.report(&e);
            }
        }
    }

    async fn shutdown(&mut self) {
        if self.controller.state().is_active() {
            let _ = self.controller.end_call().await;
        }
        let _ = self
            .sink
            .send(Signal::Leave {
                room: self.config.room.clone(),
                from: None,
            })
            .await;
        self.signaling.close();
        info!("Left room '{}'", self.config.room);
    }
}
