use crate::call::{CallEvent, CallSession, CallState, CallUpdate, Effect};
use crate::chat::ChatMessage;
use crate::error::CallError;
use crate::media::{LocalCandidate, MediaBackend};
use crate::signaling::SignalSink;
use std::collections::VecDeque;
use std::sync::Arc;
use tandem_core::{EndpointId, RoomId, Signal};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const UPDATE_BUFFER: usize = 64;

/// Drives a [`CallSession`] against a real media backend and the relay.
///
/// Events are queued and applied one at a time; each effect is executed in
/// order and its outcome is queued as the next event.
pub struct CallController<M> {
    session: CallSession,
    media: M,
    sink: Arc<dyn SignalSink>,
    updates: broadcast::Sender<CallUpdate>,
    queue: VecDeque<CallEvent>,
}

impl<M: MediaBackend> CallController<M> {
    pub fn new(room: RoomId, media: M, sink: Arc<dyn SignalSink>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_BUFFER);
        Self {
            session: CallSession::new(room),
            media,
            sink,
            updates,
            queue: VecDeque::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallUpdate> {
        self.updates.subscribe()
    }

    pub fn session(&self) -> &CallSession {
        &self.session
    }

    pub fn state(&self) -> CallState {
        self.session.state()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn set_local_id(&mut self, id: EndpointId) {
        self.session.set_local_id(id);
    }

    pub async fn start_call(&mut self) -> Result<(), CallError> {
        info!("Starting call in room '{}'", self.session.room());
        self.dispatch(CallEvent::StartCall).await
    }

    pub async fn end_call(&mut self) -> Result<(), CallError> {
        self.dispatch(CallEvent::EndCall).await
    }

    /// Returns whether audio is enabled afterwards.
    pub async fn toggle_audio(&mut self) -> bool {
        let _ = self.dispatch(CallEvent::ToggleAudio).await;
        self.publish_tracks();
        self.session.audio_enabled()
    }

    /// Returns whether video is enabled afterwards.
    pub async fn toggle_video(&mut self) -> bool {
        let _ = self.dispatch(CallEvent::ToggleVideo).await;
        self.publish_tracks();
        self.session.video_enabled()
    }

    /// Candidates from an acquisition that has since been released are dropped.
    pub async fn on_local_candidate(&mut self, local: LocalCandidate) {
        if local.session != self.media.session() {
            debug!("Dropping candidate from released media session {}", local.session);
            return;
        }
        let _ = self.dispatch(CallEvent::LocalCandidate(local.candidate)).await;
    }

    pub async fn on_transport_closed(&mut self) {
        let _ = self.dispatch(CallEvent::TransportClosed).await;
    }

    /// Feeds one relayed signal into the session.
    pub async fn handle_signal(&mut self, signal: Signal) -> Result<(), CallError> {
        let event = match signal {
            Signal::Welcome { id } => {
                info!("Relay assigned id {}", id);
                self.session.set_local_id(id);
                return Ok(());
            }
            Signal::ChatMessage {
                message,
                sender,
                from,
                ..
            } => {
                self.publish(CallUpdate::Chat(ChatMessage {
                    from,
                    sender,
                    text: message,
                }));
                return Ok(());
            }
            Signal::Join { from, name, .. } => {
                info!(
                    "{} joined the room",
                    name.or_else(|| from.map(|id| id.to_string()))
                        .unwrap_or_else(|| "someone".to_owned())
                );
                return Ok(());
            }
            other => {
                let Some(from) = other.from() else {
                    warn!("Ignoring '{}' without a sender", other.kind());
                    return Ok(());
                };
                match other {
                    Signal::Leave { .. } => CallEvent::PeerLeft { from },
                    Signal::Offer { offer, .. } => CallEvent::RemoteOffer { from, offer },
                    Signal::Answer { answer, .. } => CallEvent::RemoteAnswer { from, answer },
                    Signal::IceCandidate { candidate, .. } => {
                        CallEvent::RemoteCandidate { from, candidate }
                    }
                    Signal::EndCall { .. } => CallEvent::RemoteHangup { from },
                    Signal::Welcome { .. } | Signal::Join { .. } | Signal::ChatMessage { .. } => {
                        return Ok(());
                    }
                }
            }
        };

        self.dispatch(event).await
    }

    async fn dispatch(&mut self, event: CallEvent) -> Result<(), CallError> {
        let mut failure = None;
        self.queue.push_back(event);

        while let Some(event) = self.queue.pop_front() {
            for effect in self.session.apply(event) {
                if let Err(e) = self.execute(effect).await {
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn execute(&mut self, effect: Effect) -> Result<(), CallError> {
        match effect {
            Effect::AcquireMedia(constraints) => {
                let outcome = match self.media.acquire(constraints).await {
                    Ok(()) => CallEvent::MediaAcquired,
                    Err(e) => CallEvent::MediaFailed(e),
                };
                self.queue.push_back(outcome);
            }
            Effect::ReleaseMedia => {
                if let Err(e) = self.media.release().await {
                    warn!("Failed to release media: {}", e);
                }
            }
            Effect::CreateOffer => {
                let outcome = match self.media.create_offer().await {
                    Ok(offer) => CallEvent::OfferCreated(offer),
                    Err(e) => CallEvent::NegotiationFailed(e),
                };
                self.queue.push_back(outcome);
            }
            Effect::CreateAnswer => {
                let outcome = match self.media.create_answer().await {
                    Ok(answer) => CallEvent::AnswerCreated(answer),
                    Err(e) => CallEvent::NegotiationFailed(e),
                };
                self.queue.push_back(outcome);
            }
            Effect::ApplyRemoteDescription(description) => {
                let outcome = match self.media.apply_remote_description(description).await {
                    Ok(()) => CallEvent::RemoteDescriptionApplied,
                    Err(e) => CallEvent::NegotiationFailed(e),
                };
                self.queue.push_back(outcome);
            }
            Effect::ApplyCandidate(candidate) => {
                if let Err(e) = self.media.add_ice_candidate(candidate).await {
                    warn!("Skipping ICE candidate: {}", e);
                }
            }
            Effect::SetTrackEnabled { kind, enabled } => {
                if let Err(e) = self.media.set_track_enabled(kind, enabled).await {
                    warn!("Failed to toggle {} track: {}", kind, e);
                }
            }
            Effect::Emit(signal) => {
                debug!("Sending '{}'", signal.kind());
                if let Err(e) = self.sink.send(signal).await {
                    warn!("Failed to send signal: {}", e);
                    let error = CallError::Signaling(e.to_string());
                    self.publish(CallUpdate::Error(error.to_string()));
                    return Err(error);
                }
            }
            Effect::StateChanged(state) => {
                info!("Call is now {}", state);
                self.publish(CallUpdate::StateChanged(state));
            }
            Effect::Failed(error) => {
                self.publish(CallUpdate::Error(error.to_string()));
                return Err(error);
            }
        }
        Ok(())
    }

    /// Surfaces a failure that happened outside the call on the update stream.
    pub fn report(&self, error: &impl std::fmt::Display) {
        self.publish(CallUpdate::Error(error.to_string()));
    }

    fn publish_tracks(&self) {
        self.publish(CallUpdate::TracksChanged {
            audio: self.session.audio_enabled(),
            video: self.session.video_enabled(),
        });
    }

    fn publish(&self, update: CallUpdate) {
        // No subscribers is fine.
        let _ = self.updates.send(update);
    }
}
