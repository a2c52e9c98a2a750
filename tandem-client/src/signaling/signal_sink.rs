use crate::error::ClientError;
use async_trait::async_trait;
use tandem_core::Signal;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Where outgoing signals go. The relay connection in production.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send(&self, signal: Signal) -> Result<(), ClientError>;
}

/// Queues signals onto a relay connection's writer task.
#[derive(Clone)]
pub struct WsSignalSink {
    tx: mpsc::UnboundedSender<Message>,
}

impl WsSignalSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl SignalSink for WsSignalSink {
    async fn send(&self, signal: Signal) -> Result<(), ClientError> {
        let json = serde_json::to_string(&signal)?;
        self.tx
            .send(Message::Text(json.into()))
            .map_err(|_| ClientError::Closed)
    }
}
