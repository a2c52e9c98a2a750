use std::fmt;

/// Where one endpoint's call currently stands.
///
/// `Ended` is transient: every transition into it is followed by a reset to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallState {
    #[default]
    Idle,
    Offering,
    Answering,
    Connected,
    Ended,
}

impl CallState {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            CallState::Offering | CallState::Answering | CallState::Connected
        )
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallState::Idle => "idle",
            CallState::Offering => "offering",
            CallState::Answering => "answering",
            CallState::Connected => "connected",
            CallState::Ended => "ended",
        };
        f.write_str(name)
    }
}
