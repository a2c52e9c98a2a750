use std::time::Duration;

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

pub const DEFAULT_PORT: u16 = 3000;

/// Connection attempts a client makes before giving up on the relay.
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 5;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
