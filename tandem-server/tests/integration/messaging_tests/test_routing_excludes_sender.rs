use serde_json::json;

use crate::integration::{create_test_relay, init_tracing};
use crate::utils::{connect_endpoint, join_room, send_frame, sync_relay};

#[tokio::test]
async fn test_routing_excludes_sender() {
    init_tracing();

    let (relay_tx, _delivery_rx, output) = create_test_relay();

    let a = connect_endpoint(&relay_tx, "ana").await.expect("Connect failed");
    let b = connect_endpoint(&relay_tx, "ben").await.expect("Connect failed");
    let c = connect_endpoint(&relay_tx, "cy").await.expect("Connect failed");
    for endpoint in [a, b, c] {
        join_room(&relay_tx, endpoint, "r1").await.expect("Join failed");
    }

    send_frame(
        &relay_tx,
        a,
        json!({ "event": "chat-message", "room": "r1", "message": "hello", "sender": "ana" }),
    )
    .await
    .expect("Chat failed");
    sync_relay(&relay_tx).await.expect("Sync failed");

    for endpoint in [b, c] {
        let chats = output.events_for(&endpoint, "chat-message").await;
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0]["message"], "hello");
        assert_eq!(chats[0]["sender"], "ana");
        assert_eq!(chats[0]["from"], a.to_string());
    }
    assert!(output.events_for(&a, "chat-message").await.is_empty());

    let deliveries = output.get_deliveries().await;
    assert!(
        deliveries
            .iter()
            .filter(|d| d.event() != "welcome")
            .all(|d| d.json()["from"] != d.endpoint_id.to_string()),
        "No frame may be delivered back to its sender"
    );
}

#[tokio::test]
async fn test_message_to_lonely_room_goes_nowhere() {
    init_tracing();

    let (relay_tx, _delivery_rx, output) = create_test_relay();

    let a = connect_endpoint(&relay_tx, "ana").await.expect("Connect failed");
    join_room(&relay_tx, a, "solo").await.expect("Join failed");
    send_frame(
        &relay_tx,
        a,
        json!({ "event": "chat-message", "room": "solo", "message": "anyone?", "sender": "ana" }),
    )
    .await
    .expect("Chat failed");
    sync_relay(&relay_tx).await.expect("Sync failed");

    // A late joiner does not get the earlier message replayed.
    let b = connect_endpoint(&relay_tx, "ben").await.expect("Connect failed");
    join_room(&relay_tx, b, "solo").await.expect("Join failed");
    sync_relay(&relay_tx).await.expect("Sync failed");

    assert!(output.events_for(&b, "chat-message").await.is_empty());
    assert!(output.events_for(&a, "chat-message").await.is_empty());
    assert_eq!(output.events_for(&a, "join").await.len(), 1);
}
