use tandem_client::{CallError, CallState, CallUpdate, MediaError};
use tandem_core::{EndpointId, Signal};

use crate::integration::{Peer, init_tracing, relay};
use crate::utils::MockMedia;

#[tokio::test]
async fn test_media_failure_on_start_call() {
    init_tracing();

    let mut a = Peer::with(EndpointId::new(), MockMedia::failing_acquire());

    let result = a.controller.start_call().await;
    assert_eq!(
        result,
        Err(CallError::Media(MediaError::Unavailable(
            "camera busy".to_owned()
        )))
    );
    assert_eq!(a.controller.state(), CallState::Idle);
    assert!(a.sink.peek().is_empty(), "Nothing may reach the room");

    let updates = a.drain_updates();
    assert_eq!(updates.first(), Some(&CallUpdate::StateChanged(CallState::Offering)));
    assert!(matches!(updates.get(1), Some(CallUpdate::Error(_))));
    assert_eq!(updates.last(), Some(&CallUpdate::StateChanged(CallState::Idle)));
    assert_eq!(a.media.releases(), 0);

    // The failure leaves the controller usable.
    a.media.state.lock().unwrap().fail_acquire = false;
    a.controller.start_call().await.expect("retry failed");
    assert_eq!(a.controller.state(), CallState::Offering);
}

#[tokio::test]
async fn test_media_failure_while_answering() {
    init_tracing();

    let mut a = Peer::new("X", "unused");
    let mut b = Peer::with(EndpointId::new(), MockMedia::failing_acquire());

    a.controller.start_call().await.expect("start_call failed");
    relay(&a, &mut b).await;

    assert_eq!(b.controller.state(), CallState::Idle);
    assert!(matches!(b.sink.peek().as_slice(), [Signal::EndCall { .. }]));

    // The caller hears the refusal and stops offering.
    relay(&b, &mut a).await;
    assert_eq!(a.controller.state(), CallState::Idle);
    assert_eq!(a.media.releases(), 1);
    assert!(!a.media.is_active());
}
