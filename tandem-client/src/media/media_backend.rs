use crate::error::MediaError;
use async_trait::async_trait;
use std::fmt;
use tandem_core::{IceCandidate, SessionDescription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => f.write_str("audio"),
            TrackKind::Video => f.write_str("video"),
        }
    }
}

/// Which local tracks to capture, and whether they start enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl MediaConstraints {
    pub fn enabled(&self, kind: TrackKind) -> bool {
        match kind {
            TrackKind::Audio => self.audio,
            TrackKind::Video => self.video,
        }
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// A candidate gathered by the local stack, stamped with the acquisition
/// that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalCandidate {
    pub session: u64,
    pub candidate: IceCandidate,
}

/// The real-time media stack a call drives.
///
/// One acquisition covers one call: `acquire` opens the local session and its
/// tracks, `release` tears all of it down. Descriptor methods return what the
/// backend applied as its local description.
#[async_trait]
pub trait MediaBackend: Send {
    async fn acquire(&mut self, constraints: MediaConstraints) -> Result<(), MediaError>;

    async fn create_offer(&mut self) -> Result<SessionDescription, MediaError>;

    async fn apply_remote_description(
        &mut self,
        description: SessionDescription,
    ) -> Result<(), MediaError>;

    async fn create_answer(&mut self) -> Result<SessionDescription, MediaError>;

    async fn add_ice_candidate(&mut self, candidate: IceCandidate) -> Result<(), MediaError>;

    async fn set_track_enabled(&mut self, kind: TrackKind, enabled: bool)
    -> Result<(), MediaError>;

    async fn release(&mut self) -> Result<(), MediaError>;

    /// Current acquisition; changes on every `acquire`.
    fn session(&self) -> u64;
}
