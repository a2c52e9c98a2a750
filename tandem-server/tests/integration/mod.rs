//! Integration tests for tandem-server.
//!
//! - `connection_tests` - connect, welcome, disconnect cleanup
//! - `messaging_tests` - routing, payload passthrough, ordering, malformed frames
//! - `multi_peer_tests` - several endpoints over real WebSocket connections

pub mod messaging_tests;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use tandem_server::{Relay, RelayCommand};

use crate::utils::{Delivery, MockSignalingOutput};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Spawns a relay writing into a recording output.
pub fn create_test_relay() -> (
    mpsc::Sender<RelayCommand>,
    mpsc::UnboundedReceiver<Delivery>,
    MockSignalingOutput,
) {
    let (relay_tx, relay_rx) = mpsc::channel::<RelayCommand>(100);
    let (output, delivery_rx) = MockSignalingOutput::new();

    let relay = Relay::new(relay_rx, Arc::new(output.clone()));
    tokio::spawn(relay.run());

    (relay_tx, delivery_rx, output)
}
