mod endpoint;
mod envelope;
mod room;
mod session;
mod signaling;

pub use endpoint::{EndpointId, ParseEndpointIdError};
pub use envelope::{Envelope, EnvelopeError};
pub use room::{RoomId, RoomSummary};
pub use session::{IceCandidate, SdpType, SessionDescription};
pub use signaling::{Signal, SignalKind};
