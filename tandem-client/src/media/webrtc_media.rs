use crate::error::MediaError;
use crate::media::media_backend::{LocalCandidate, MediaBackend, MediaConstraints, TrackKind};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tandem_core::{IceCandidate, SdpType, SessionDescription};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::media::Sample;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

const STREAM_ID: &str = "tandem";

struct LocalTrack {
    track: Arc<TrackLocalStaticSample>,
    enabled: Arc<AtomicBool>,
}

/// [`MediaBackend`] on top of the `webrtc` crate.
///
/// Every acquisition builds a fresh `RTCPeerConnection` with sample tracks for
/// the requested kinds. Local ICE candidates are pushed into `candidate_tx` as
/// they are gathered, tagged with the acquisition; the caller relays them.
pub struct WebRtcMedia {
    ice_servers: Vec<String>,
    candidate_tx: mpsc::UnboundedSender<LocalCandidate>,
    peer_connection: Option<Arc<RTCPeerConnection>>,
    tracks: HashMap<TrackKind, LocalTrack>,
    session: u64,
}

impl WebRtcMedia {
    pub fn new(
        ice_servers: Vec<String>,
        candidate_tx: mpsc::UnboundedSender<LocalCandidate>,
    ) -> Self {
        Self {
            ice_servers,
            candidate_tx,
            peer_connection: None,
            tracks: HashMap::new(),
            session: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.peer_connection.is_some()
    }

    /// Feeds one encoded frame into the local track of `kind`.
    ///
    /// Frames for a disabled or missing track are dropped.
    pub async fn write_sample(
        &self,
        kind: TrackKind,
        data: Vec<u8>,
        duration: Duration,
    ) -> Result<(), MediaError> {
        let Some(local) = self.tracks.get(&kind) else {
            return Ok(());
        };
        if !local.enabled.load(Ordering::Relaxed) {
            return Ok(());
        }

        let sample = Sample {
            data: data.into(),
            duration,
            ..Default::default()
        };
        local.track.write_sample(&sample).await?;
        Ok(())
    }

    fn connection(&self) -> Result<&Arc<RTCPeerConnection>, MediaError> {
        self.peer_connection.as_ref().ok_or(MediaError::NoSession)
    }

    async fn build_peer_connection(&self) -> Result<Arc<RTCPeerConnection>, MediaError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if self.ice_servers.is_empty() {
            Vec::new()
        } else {
            vec![RTCIceServer {
                urls: self.ice_servers.clone(),
                ..Default::default()
            }]
        };
        let config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(config).await?);

        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                Box::pin(async move {
                    info!("Peer connection state changed: {}", state);
                })
            },
        ));

        let candidate_tx = self.candidate_tx.clone();
        let session = self.session;
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = candidate_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                match candidate.to_json() {
                    Ok(init) => {
                        let _ = tx.send(LocalCandidate {
                            session,
                            candidate: from_init(init),
                        });
                    }
                    Err(e) => warn!("Failed to serialize local ICE candidate: {}", e),
                }
            })
        }));

        Ok(peer_connection)
    }

    async fn add_local_track(
        &mut self,
        peer_connection: &Arc<RTCPeerConnection>,
        kind: TrackKind,
        enabled: bool,
    ) -> Result<(), MediaError> {
        let mime_type = match kind {
            TrackKind::Audio => MIME_TYPE_OPUS,
            TrackKind::Video => MIME_TYPE_VP8,
        };
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: mime_type.to_owned(),
                ..Default::default()
            },
            kind.to_string(),
            STREAM_ID.to_owned(),
        ));

        peer_connection
            .add_track(Arc::clone(&track) as Arc<dyn TrackLocal + Send + Sync>)
            .await?;

        debug!("Added local {} track (enabled: {})", kind, enabled);
        self.tracks.insert(
            kind,
            LocalTrack {
                track,
                enabled: Arc::new(AtomicBool::new(enabled)),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl MediaBackend for WebRtcMedia {
    async fn acquire(&mut self, constraints: MediaConstraints) -> Result<(), MediaError> {
        if self.peer_connection.is_some() {
            return Err(MediaError::Unavailable(
                "a media session is already active".to_owned(),
            ));
        }

        self.session += 1;
        let peer_connection = self
            .build_peer_connection()
            .await
            .map_err(|e| MediaError::Unavailable(e.to_string()))?;

        // Both kinds are captured; the constraints only decide the initial enablement.
        for kind in [TrackKind::Audio, TrackKind::Video] {
            if let Err(e) = self
                .add_local_track(&peer_connection, kind, constraints.enabled(kind))
                .await
            {
                self.tracks.clear();
                let _ = peer_connection.close().await;
                return Err(MediaError::Unavailable(e.to_string()));
            }
        }

        self.peer_connection = Some(peer_connection);
        Ok(())
    }

    async fn create_offer(&mut self) -> Result<SessionDescription, MediaError> {
        let pc = self.connection()?;
        let offer = pc
            .create_offer(None)
            .await
            .map_err(|e| MediaError::Negotiation(e.to_string()))?;
        pc.set_local_description(offer.clone())
            .await
            .map_err(|e| MediaError::Negotiation(e.to_string()))?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn apply_remote_description(
        &mut self,
        description: SessionDescription,
    ) -> Result<(), MediaError> {
        let pc = self.connection()?;
        let remote = match description.sdp_type {
            Some(SdpType::Answer) => RTCSessionDescription::answer(description.sdp),
            Some(SdpType::Pranswer) => RTCSessionDescription::pranswer(description.sdp),
            Some(SdpType::Offer) | Some(SdpType::Rollback) | None => {
                RTCSessionDescription::offer(description.sdp)
            }
        }
        .map_err(|e| MediaError::Negotiation(e.to_string()))?;

        pc.set_remote_description(remote)
            .await
            .map_err(|e| MediaError::Negotiation(e.to_string()))
    }

    async fn create_answer(&mut self) -> Result<SessionDescription, MediaError> {
        let pc = self.connection()?;
        let answer = pc
            .create_answer(None)
            .await
            .map_err(|e| MediaError::Negotiation(e.to_string()))?;
        pc.set_local_description(answer.clone())
            .await
            .map_err(|e| MediaError::Negotiation(e.to_string()))?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn add_ice_candidate(&mut self, candidate: IceCandidate) -> Result<(), MediaError> {
        let pc = self.connection()?;
        pc.add_ice_candidate(into_init(candidate))
            .await
            .map_err(|e| MediaError::Candidate(e.to_string()))
    }

    async fn set_track_enabled(
        &mut self,
        kind: TrackKind,
        enabled: bool,
    ) -> Result<(), MediaError> {
        let local = self.tracks.get(&kind).ok_or(MediaError::NoSession)?;
        local.enabled.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    async fn release(&mut self) -> Result<(), MediaError> {
        self.tracks.clear();
        let Some(pc) = self.peer_connection.take() else {
            return Ok(());
        };
        pc.close().await?;
        info!("Media session {} released", self.session);
        Ok(())
    }

    fn session(&self) -> u64 {
        self.session
    }
}

fn from_init(init: RTCIceCandidateInit) -> IceCandidate {
    IceCandidate {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}

fn into_init(candidate: IceCandidate) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_m_line_index,
        username_fragment: candidate.username_fragment,
    }
}
