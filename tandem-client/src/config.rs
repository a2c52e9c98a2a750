use std::time::Duration;
use tandem_core::RoomId;
use tandem_core::utils::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_RECONNECT_ATTEMPTS, DEFAULT_STUN_ADDR};

/// How hard a client tries to reach the relay before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub attempts: u32,
    /// Upper bound for a single connection attempt.
    pub timeout: Duration,
    pub backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RECONNECT_ATTEMPTS,
            timeout: DEFAULT_CONNECT_TIMEOUT,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Everything a participant needs to join a room and place calls.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the relay, e.g. `ws://127.0.0.1:3000/ws`.
    pub url: String,
    pub room: RoomId,
    pub name: String,
    pub ice_servers: Vec<String>,
    pub reconnect: ReconnectPolicy,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, room: impl Into<RoomId>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            room: room.into(),
            name: name.into(),
            ice_servers: vec![DEFAULT_STUN_ADDR.to_owned()],
            reconnect: ReconnectPolicy::default(),
        }
    }

    /// Relay URL with the display name attached as the `name` query parameter.
    pub fn connect_url(&self) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}name={}", self.url, separator, urlencoding::encode(&self.name))
    }
}
