use crate::integration::init_tracing;
use crate::utils::{TestClient, start_test_server, wait_for_members};

#[tokio::test]
async fn test_socket_close_notifies_room() {
    init_tracing();

    let (addr, service) = start_test_server().await.expect("Server failed to start");

    let mut a = TestClient::connect(addr, "ana").await.expect("A failed to connect");
    let mut b = TestClient::connect(addr, "ben").await.expect("B failed to connect");

    a.join("r1").await.expect("A join failed");
    b.join("r1").await.expect("B join failed");
    wait_for_members(&service, "r1", 2).await.expect("r1 incomplete");

    let a_id = a.id;
    a.close().await.expect("Close failed");

    let leave = b.recv_event("leave").await.expect("B never saw A leave");
    assert_eq!(leave["from"], a_id.to_string());
    assert_eq!(leave["room"], "r1");

    wait_for_members(&service, "r1", 1).await.expect("A still counted in r1");
    assert_eq!(service.connection_count(), 1);

    b.close().await.expect("Close failed");
    wait_for_members(&service, "r1", 0).await.expect("r1 not reclaimed");
    let rooms = service.list_rooms().await.expect("Relay stopped");
    assert!(rooms.is_empty());
}
