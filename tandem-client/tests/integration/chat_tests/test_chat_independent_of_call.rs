use std::sync::Arc;
use tandem_client::{CallState, CallUpdate, ChatChannel, ChatError, ChatMessage};
use tandem_core::{RoomId, Signal};

use crate::integration::{Peer, connected_pair, init_tracing, relay};

#[tokio::test]
async fn test_chat_before_and_during_call() {
    init_tracing();

    let room = RoomId::from("r1");
    let a = Peer::new("X", "unused");
    let mut b = Peer::new("unused", "Y");
    let chat = ChatChannel::new(Arc::new(a.sink.clone()));

    chat.send(&room, "ana", "  hi there \n").await.expect("chat failed");
    assert_eq!(
        a.sink.peek(),
        vec![Signal::ChatMessage {
            room: room.clone(),
            message: "hi there".to_owned(),
            sender: "ana".to_owned(),
            from: None,
        }]
    );

    relay(&a, &mut b).await;
    assert_eq!(
        b.drain_updates(),
        vec![CallUpdate::Chat(ChatMessage {
            from: Some(a.id),
            sender: "ana".to_owned(),
            text: "hi there".to_owned(),
        })]
    );
    assert_eq!(b.controller.state(), CallState::Idle);
    assert!(b.media.calls().is_empty());

    let (a, mut b) = connected_pair().await;
    let chat = ChatChannel::new(Arc::new(a.sink.clone()));
    chat.send(&room, "ana", "mid-call").await.expect("chat failed");
    relay(&a, &mut b).await;

    assert!(matches!(
        b.drain_updates().as_slice(),
        [CallUpdate::Chat(ChatMessage { text, .. })] if text == "mid-call"
    ));
    assert_eq!(b.controller.state(), CallState::Connected);
}

#[tokio::test]
async fn test_empty_chat_is_rejected() {
    init_tracing();

    let a = Peer::new("X", "Y");
    let chat = ChatChannel::new(Arc::new(a.sink.clone()));

    assert_eq!(
        chat.send(&RoomId::from("r1"), "ana", "   ").await,
        Err(ChatError::Empty)
    );
    assert!(a.sink.peek().is_empty());
}
