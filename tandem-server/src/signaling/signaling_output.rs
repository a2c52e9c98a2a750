use async_trait::async_trait;
use tandem_core::EndpointId;

/// Sink the relay writes to. The WebSocket layer implements it; tests swap in a recorder.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Hand one already rendered frame to a connected endpoint.
    async fn deliver(&self, endpoint_id: EndpointId, frame: String);
}
