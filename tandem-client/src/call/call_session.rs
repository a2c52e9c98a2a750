use crate::call::{CallEvent, CallState, Effect};
use crate::error::CallError;
use crate::media::{MediaConstraints, TrackKind};
use std::collections::VecDeque;
use tandem_core::{EndpointId, IceCandidate, RoomId, SessionDescription, Signal};
use tracing::{debug, info, warn};

/// The call state machine of one endpoint.
///
/// Pure: `apply` maps (state, event) to (next state, effects) and never touches
/// media or the network. The driver executes the effects and feeds their
/// outcomes back in as events.
#[derive(Debug)]
pub struct CallSession {
    room: RoomId,
    local_id: Option<EndpointId>,
    state: CallState,
    remote: Option<EndpointId>,
    incoming_offer: Option<SessionDescription>,
    remote_description_set: bool,
    pending_candidates: VecDeque<(EndpointId, IceCandidate)>,
    audio_enabled: bool,
    video_enabled: bool,
    media_held: bool,
}

impl CallSession {
    pub fn new(room: RoomId) -> Self {
        Self {
            room,
            local_id: None,
            state: CallState::Idle,
            remote: None,
            incoming_offer: None,
            remote_description_set: false,
            pending_candidates: VecDeque::new(),
            audio_enabled: true,
            video_enabled: true,
            media_held: false,
        }
    }

    /// Id the relay assigned to this endpoint; used to break offer glare.
    pub fn set_local_id(&mut self, id: EndpointId) {
        self.local_id = Some(id);
    }

    pub fn local_id(&self) -> Option<EndpointId> {
        self.local_id
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn remote(&self) -> Option<EndpointId> {
        self.remote
    }

    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    pub fn video_enabled(&self) -> bool {
        self.video_enabled
    }

    pub fn media_held(&self) -> bool {
        self.media_held
    }

    pub fn remote_description_set(&self) -> bool {
        self.remote_description_set
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn constraints(&self) -> MediaConstraints {
        MediaConstraints {
            audio: self.audio_enabled,
            video: self.video_enabled,
        }
    }

    pub fn apply(&mut self, event: CallEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            CallEvent::StartCall => self.on_start_call(&mut effects),
            CallEvent::EndCall => self.on_end_call(&mut effects),
            CallEvent::ToggleAudio => {
                self.audio_enabled = !self.audio_enabled;
                self.sync_track(TrackKind::Audio, self.audio_enabled, &mut effects);
            }
            CallEvent::ToggleVideo => {
                self.video_enabled = !self.video_enabled;
                self.sync_track(TrackKind::Video, self.video_enabled, &mut effects);
            }

            CallEvent::RemoteOffer { from, offer } => self.on_remote_offer(from, offer, &mut effects),
            CallEvent::RemoteAnswer { from, answer } => {
                self.on_remote_answer(from, answer, &mut effects)
            }
            CallEvent::RemoteCandidate { from, candidate } => {
                self.on_remote_candidate(from, candidate, &mut effects)
            }
            CallEvent::RemoteHangup { from } => {
                if self.state.is_active() && self.remote.is_none_or(|remote| remote == from) {
                    info!("Call ended by {}", from);
                    self.finish(&mut effects);
                } else {
                    debug!("Ignoring end-call from {}", from);
                }
            }
            CallEvent::PeerLeft { from } => {
                // An unanswered offer has no peer yet; any departure ends it.
                let ours = match self.state {
                    CallState::Offering => self.remote.is_none_or(|remote| remote == from),
                    _ => self.remote == Some(from),
                };
                if self.state.is_active() && ours {
                    info!("Remote peer {} left the room", from);
                    self.finish(&mut effects);
                }
            }

            CallEvent::LocalCandidate(candidate) => {
                if self.state.is_active() {
                    effects.push(Effect::Emit(Signal::IceCandidate {
                        room: self.room.clone(),
                        candidate,
                        from: None,
                    }));
                } else {
                    debug!("Dropping local candidate gathered outside a call");
                }
            }
            CallEvent::TransportClosed => {
                if self.state.is_active() {
                    info!("Signaling transport closed during a call");
                    self.finish(&mut effects);
                }
            }

            CallEvent::MediaAcquired => self.on_media_acquired(&mut effects),
            CallEvent::MediaFailed(e) => {
                if !matches!(self.state, CallState::Offering | CallState::Answering) {
                    return effects;
                }
                warn!("Local media unavailable: {}", e);
                if self.state == CallState::Answering {
                    self.emit_end_call(&mut effects);
                }
                self.reset_negotiation();
                effects.push(Effect::Failed(CallError::Media(e)));
                self.transition(CallState::Idle, &mut effects);
            }
            CallEvent::OfferCreated(offer) => {
                if self.state == CallState::Offering {
                    effects.push(Effect::Emit(Signal::Offer {
                        room: self.room.clone(),
                        offer,
                        from: None,
                    }));
                }
            }
            CallEvent::AnswerCreated(answer) => {
                if self.state == CallState::Answering {
                    effects.push(Effect::Emit(Signal::Answer {
                        room: self.room.clone(),
                        answer,
                        from: None,
                    }));
                    self.transition(CallState::Connected, &mut effects);
                }
            }
            CallEvent::RemoteDescriptionApplied => self.on_remote_description_applied(&mut effects),
            CallEvent::NegotiationFailed(e) => {
                if self.state.is_active() {
                    warn!("Negotiation failed: {}", e);
                    effects.push(Effect::Failed(CallError::Media(e)));
                    self.emit_end_call(&mut effects);
                    self.finish(&mut effects);
                }
            }
        }

        effects
    }

    fn on_start_call(&mut self, effects: &mut Vec<Effect>) {
        if self.state != CallState::Idle {
            effects.push(Effect::Failed(CallError::InvalidState {
                action: "start a call",
                state: self.state,
            }));
            return;
        }
        self.transition(CallState::Offering, effects);
        effects.push(Effect::AcquireMedia(self.constraints()));
    }

    fn on_end_call(&mut self, effects: &mut Vec<Effect>) {
        if !self.state.is_active() {
            effects.push(Effect::Failed(CallError::InvalidState {
                action: "end the call",
                state: self.state,
            }));
            return;
        }
        self.emit_end_call(effects);
        self.finish(effects);
    }

    fn on_remote_offer(
        &mut self,
        from: EndpointId,
        offer: SessionDescription,
        effects: &mut Vec<Effect>,
    ) {
        match self.state {
            CallState::Idle | CallState::Ended => self.begin_answering(from, offer, effects),
            CallState::Offering => {
                if !self.yields_to(from) {
                    debug!("Glare with {}: keeping our own offer", from);
                    return;
                }
                info!("Glare with {}: withdrawing our offer and answering", from);
                self.release_media(effects);
                self.remote_description_set = false;
                self.pending_candidates.retain(|(sender, _)| *sender == from);
                self.begin_answering(from, offer, effects);
            }
            CallState::Answering | CallState::Connected => {
                info!("Incoming offer from {} supersedes the current call", from);
                self.finish(effects);
                self.begin_answering(from, offer, effects);
            }
        }
    }

    fn on_remote_answer(
        &mut self,
        from: EndpointId,
        answer: SessionDescription,
        effects: &mut Vec<Effect>,
    ) {
        if self.state != CallState::Offering || !self.media_held || self.remote_description_set {
            warn!("Unexpected answer from {} while {}", from, self.state);
            return;
        }
        self.remote = Some(from);
        effects.push(Effect::ApplyRemoteDescription(answer));
    }

    fn on_remote_candidate(
        &mut self,
        from: EndpointId,
        candidate: IceCandidate,
        effects: &mut Vec<Effect>,
    ) {
        if !self.state.is_active() {
            warn!("Discarding candidate from {} outside a call", from);
            return;
        }
        if self.remote.is_some_and(|remote| remote != from) {
            debug!("Ignoring candidate from {}, not our peer", from);
            return;
        }
        if self.remote_description_set {
            effects.push(Effect::ApplyCandidate(candidate));
        } else {
            self.pending_candidates.push_back((from, candidate));
        }
    }

    fn on_media_acquired(&mut self, effects: &mut Vec<Effect>) {
        self.media_held = true;

        match self.state {
            CallState::Offering => effects.push(Effect::CreateOffer),
            CallState::Answering => match self.incoming_offer.take() {
                Some(offer) => effects.push(Effect::ApplyRemoteDescription(offer)),
                None => warn!("Media acquired for an answer without an offer"),
            },
            CallState::Idle | CallState::Connected | CallState::Ended => {
                debug!("Media acquired outside negotiation, releasing");
                self.release_media(effects);
            }
        }
    }

    fn on_remote_description_applied(&mut self, effects: &mut Vec<Effect>) {
        if !self.state.is_active() {
            return;
        }
        self.remote_description_set = true;

        while let Some((from, candidate)) = self.pending_candidates.pop_front() {
            if self.remote.is_none_or(|remote| remote == from) {
                effects.push(Effect::ApplyCandidate(candidate));
            } else {
                debug!("Dropping queued candidate from {}, not our peer", from);
            }
        }

        match self.state {
            CallState::Answering => effects.push(Effect::CreateAnswer),
            CallState::Offering => self.transition(CallState::Connected, effects),
            _ => {}
        }
    }

    fn begin_answering(
        &mut self,
        from: EndpointId,
        offer: SessionDescription,
        effects: &mut Vec<Effect>,
    ) {
        self.remote = Some(from);
        self.incoming_offer = Some(offer);
        self.transition(CallState::Answering, effects);
        effects.push(Effect::AcquireMedia(self.constraints()));
    }

    /// Smaller id yields. Without a known local id we keep our own offer.
    fn yields_to(&self, other: EndpointId) -> bool {
        self.local_id.is_some_and(|local| local < other)
    }

    fn sync_track(&self, kind: TrackKind, enabled: bool, effects: &mut Vec<Effect>) {
        if self.media_held {
            effects.push(Effect::SetTrackEnabled { kind, enabled });
        }
    }

    fn emit_end_call(&self, effects: &mut Vec<Effect>) {
        effects.push(Effect::Emit(Signal::EndCall {
            room: self.room.clone(),
            from: None,
        }));
    }

    fn release_media(&mut self, effects: &mut Vec<Effect>) {
        if self.media_held {
            self.media_held = false;
            effects.push(Effect::ReleaseMedia);
        }
    }

    fn reset_negotiation(&mut self) {
        self.remote = None;
        self.incoming_offer = None;
        self.remote_description_set = false;
        self.pending_candidates.clear();
    }

    /// Every exit from a call goes through here: release, then Ended, then Idle.
    fn finish(&mut self, effects: &mut Vec<Effect>) {
        self.release_media(effects);
        self.reset_negotiation();
        self.transition(CallState::Ended, effects);
        self.transition(CallState::Idle, effects);
    }

    fn transition(&mut self, next: CallState, effects: &mut Vec<Effect>) {
        if self.state == next {
            return;
        }
        debug!("Call state {} -> {}", self.state, next);
        self.state = next;
        effects.push(Effect::StateChanged(next));
    }
}
