use crate::call::CallState;
use crate::chat::ChatMessage;

/// What a participant's UI gets told about.
#[derive(Debug, Clone, PartialEq)]
pub enum CallUpdate {
    StateChanged(CallState),
    TracksChanged { audio: bool, video: bool },
    Chat(ChatMessage),
    Error(String),
}
