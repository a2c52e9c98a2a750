use tandem_client::CallState;
use tandem_core::EndpointId;

use crate::integration::{Peer, init_tracing, settle};
use crate::utils::MockMedia;

#[tokio::test]
async fn test_glare_settles_on_one_call() {
    init_tracing();

    let low: EndpointId = "00000000-0000-4000-8000-00000000000a".parse().unwrap();
    let high: EndpointId = "00000000-0000-4000-8000-00000000000b".parse().unwrap();

    let mut a = Peer::with(low, MockMedia::new("offer-low", "answer-low"));
    let mut b = Peer::with(high, MockMedia::new("offer-high", "answer-high"));

    // Both press call before either offer arrives.
    a.controller.start_call().await.expect("A start_call failed");
    b.controller.start_call().await.expect("B start_call failed");

    settle(&mut a, &mut b).await;

    assert_eq!(a.controller.state(), CallState::Connected);
    assert_eq!(b.controller.state(), CallState::Connected);
    assert_eq!(a.controller.session().remote(), Some(high));
    assert_eq!(b.controller.session().remote(), Some(low));

    // The smaller id withdrew its own attempt and answered.
    assert_eq!(a.media.acquisitions(), 2);
    assert_eq!(a.media.releases(), 1);
    assert_eq!(b.media.acquisitions(), 1);
    assert_eq!(b.media.releases(), 0);
    assert!(a.media.is_active());
    assert!(b.media.is_active());
}
