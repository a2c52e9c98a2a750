use crate::call::CallState;
use crate::error::{CallError, MediaError};
use crate::media::{MediaConstraints, TrackKind};
use tandem_core::{EndpointId, IceCandidate, Signal, SessionDescription};

/// Input to [`CallSession::apply`](crate::call::CallSession::apply).
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    // Local user
    StartCall,
    EndCall,
    ToggleAudio,
    ToggleVideo,

    // Relayed from the room
    RemoteOffer {
        from: EndpointId,
        offer: SessionDescription,
    },
    RemoteAnswer {
        from: EndpointId,
        answer: SessionDescription,
    },
    RemoteCandidate {
        from: EndpointId,
        candidate: IceCandidate,
    },
    RemoteHangup {
        from: EndpointId,
    },
    PeerLeft {
        from: EndpointId,
    },

    // Local transport
    LocalCandidate(IceCandidate),
    TransportClosed,

    // Results of effects executed by the driver
    MediaAcquired,
    MediaFailed(MediaError),
    OfferCreated(SessionDescription),
    AnswerCreated(SessionDescription),
    RemoteDescriptionApplied,
    NegotiationFailed(MediaError),
}

/// Work the driver performs on behalf of the session, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AcquireMedia(MediaConstraints),
    ReleaseMedia,
    CreateOffer,
    CreateAnswer,
    ApplyRemoteDescription(SessionDescription),
    ApplyCandidate(IceCandidate),
    SetTrackEnabled { kind: TrackKind, enabled: bool },
    Emit(Signal),
    StateChanged(CallState),
    Failed(CallError),
}
