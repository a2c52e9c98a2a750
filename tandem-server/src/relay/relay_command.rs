use tandem_core::{EndpointId, RoomSummary};
use tokio::sync::oneshot;

/// Commands fed into the relay by the WebSocket layer.
///
/// Every connection pushes its commands in the order it read them, which is what
/// gives per-sender FIFO delivery.
#[derive(Debug)]
pub enum RelayCommand {
    /// A socket was accepted.
    Connect {
        endpoint_id: EndpointId,
        display_name: Option<String>,
    },

    /// Raw text frame read from the socket.
    Frame { endpoint_id: EndpointId, text: String },

    /// The socket closed, for whatever reason.
    Disconnect { endpoint_id: EndpointId },

    ListRooms {
        reply: oneshot::Sender<Vec<RoomSummary>>,
    },
}
