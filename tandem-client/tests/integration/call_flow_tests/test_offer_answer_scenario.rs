use tandem_client::CallState;
use tandem_core::{RoomId, SessionDescription, Signal};

use crate::integration::{Peer, init_tracing, relay};
use crate::utils::MediaCall;

#[tokio::test]
async fn test_offer_answer_scenario() {
    init_tracing();

    let mut a = Peer::new("X", "unused");
    let mut b = Peer::new("unused", "Y");

    a.controller.start_call().await.expect("start_call failed");
    assert_eq!(a.controller.state(), CallState::Offering);
    assert_eq!(
        a.sink.peek(),
        vec![Signal::Offer {
            room: RoomId::from("r1"),
            offer: SessionDescription::offer("X"),
            from: None,
        }]
    );

    assert_eq!(relay(&a, &mut b).await, 1);
    assert_eq!(
        b.drain_states(),
        vec![CallState::Answering, CallState::Connected]
    );
    assert_eq!(
        b.sink.peek(),
        vec![Signal::Answer {
            room: RoomId::from("r1"),
            answer: SessionDescription::answer("Y"),
            from: None,
        }]
    );

    assert_eq!(relay(&b, &mut a).await, 1);
    assert_eq!(
        a.drain_states(),
        vec![CallState::Offering, CallState::Connected]
    );
    assert_eq!(a.controller.session().remote(), Some(b.id));
    assert_eq!(b.controller.session().remote(), Some(a.id));

    assert_eq!(
        a.media.calls(),
        vec![
            MediaCall::Acquire(Default::default()),
            MediaCall::CreateOffer,
            MediaCall::ApplyRemote(SessionDescription::answer("Y")),
        ]
    );
    assert_eq!(
        b.media.calls(),
        vec![
            MediaCall::Acquire(Default::default()),
            MediaCall::ApplyRemote(SessionDescription::offer("X")),
            MediaCall::CreateAnswer,
        ]
    );
}
