use serde_json::value::RawValue;
use std::collections::BTreeMap;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{connect_endpoint, join_room, send_text, sync_relay};

#[tokio::test]
async fn test_payload_passthrough() {
    init_tracing();

    let (relay_tx, _delivery_rx, output) = create_test_relay();

    let a = connect_endpoint(&relay_tx, "ana").await.expect("Connect failed");
    let b = connect_endpoint(&relay_tx, "ben").await.expect("Connect failed");
    join_room(&relay_tx, a, "r1").await.expect("Join failed");
    join_room(&relay_tx, b, "r1").await.expect("Join failed");

    let input = r#"{"event":"offer","room":"r1","offer":{"sdp":"v=0\r\na=group:BUNDLE 0 1\r\n", "type":"offer"},"meta":{"rank":1.50,"tags":["x",null]}}"#;
    send_text(&relay_tx, a, input.to_owned())
        .await
        .expect("Offer failed");
    sync_relay(&relay_tx).await.expect("Sync failed");

    let offers: Vec<_> = output
        .deliveries_for(&b)
        .await
        .into_iter()
        .filter(|d| d.event() == "offer")
        .collect();
    assert_eq!(offers.len(), 1);

    let sent: BTreeMap<String, Box<RawValue>> = serde_json::from_str(input).unwrap();
    let delivered: BTreeMap<String, Box<RawValue>> =
        serde_json::from_str(&offers[0].frame).unwrap();

    for (key, value) in &sent {
        assert_eq!(
            delivered[key].get(),
            value.get(),
            "field '{}' must be delivered unchanged",
            key
        );
    }
    assert_eq!(delivered.len(), sent.len() + 1, "Only 'from' may be added");
    assert_eq!(delivered["from"].get(), format!("\"{}\"", a));
}
