use crate::error::ChatError;
use crate::signaling::SignalSink;
use std::sync::Arc;
use tandem_core::{EndpointId, RoomId, Signal};
use tracing::debug;

/// A chat line as received from the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub from: Option<EndpointId>,
    pub sender: String,
    pub text: String,
}

/// Text side-channel over the relay. Works with or without a call.
#[derive(Clone)]
pub struct ChatChannel {
    sink: Arc<dyn SignalSink>,
}

impl ChatChannel {
    pub fn new(sink: Arc<dyn SignalSink>) -> Self {
        Self { sink }
    }

    pub async fn send(&self, room: &RoomId, sender: &str, text: &str) -> Result<(), ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::Empty);
        }

        debug!("Sending chat to room '{}'", room);
        self.sink
            .send(Signal::ChatMessage {
                room: room.clone(),
                message: text.to_owned(),
                sender: sender.to_owned(),
                from: None,
            })
            .await
            .map_err(|e| ChatError::Signaling(e.to_string()))
    }
}
