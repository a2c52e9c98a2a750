use crate::model::endpoint::EndpointId;
use crate::model::room::RoomId;
use crate::model::session::{IceCandidate, SessionDescription};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of envelope types carried over the relay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SignalKind {
    Join,
    Leave,
    Offer,
    Answer,
    IceCandidate,
    ChatMessage,
    EndCall,
    /// Sent by the relay only, never accepted from a client.
    Welcome,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Join => "join",
            SignalKind::Leave => "leave",
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
            SignalKind::ChatMessage => "chat-message",
            SignalKind::EndCall => "end-call",
            SignalKind::Welcome => "welcome",
        }
    }

    /// Field that has to be present for the envelope to be routable.
    pub fn payload_key(&self) -> Option<&'static str> {
        match self {
            SignalKind::Offer => Some("offer"),
            SignalKind::Answer => Some("answer"),
            SignalKind::IceCandidate => Some("candidate"),
            SignalKind::ChatMessage => Some("message"),
            SignalKind::Join | SignalKind::Leave | SignalKind::EndCall | SignalKind::Welcome => {
                None
            }
        }
    }

    pub fn is_client_originated(&self) -> bool {
        !matches!(self, SignalKind::Welcome)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view of a signaling frame, as participants produce and consume it.
///
/// `from` is filled in by the relay on delivery; outgoing frames leave it empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum Signal {
    Welcome {
        id: EndpointId,
    },
    Join {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<EndpointId>,
    },
    Leave {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<EndpointId>,
    },
    Offer {
        room: RoomId,
        offer: SessionDescription,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<EndpointId>,
    },
    Answer {
        room: RoomId,
        answer: SessionDescription,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<EndpointId>,
    },
    IceCandidate {
        room: RoomId,
        candidate: IceCandidate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<EndpointId>,
    },
    ChatMessage {
        room: RoomId,
        message: String,
        sender: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<EndpointId>,
    },
    EndCall {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<EndpointId>,
    },
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Welcome { .. } => SignalKind::Welcome,
            Signal::Join { .. } => SignalKind::Join,
            Signal::Leave { .. } => SignalKind::Leave,
            Signal::Offer { .. } => SignalKind::Offer,
            Signal::Answer { .. } => SignalKind::Answer,
            Signal::IceCandidate { .. } => SignalKind::IceCandidate,
            Signal::ChatMessage { .. } => SignalKind::ChatMessage,
            Signal::EndCall { .. } => SignalKind::EndCall,
        }
    }

    pub fn from(&self) -> Option<EndpointId> {
        match self {
            Signal::Welcome { .. } => None,
            Signal::Join { from, .. }
            | Signal::Leave { from, .. }
            | Signal::Offer { from, .. }
            | Signal::Answer { from, .. }
            | Signal::IceCandidate { from, .. }
            | Signal::ChatMessage { from, .. }
            | Signal::EndCall { from, .. } => *from,
        }
    }
}
