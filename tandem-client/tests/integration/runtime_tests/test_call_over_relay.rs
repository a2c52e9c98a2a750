use anyhow::{Context, Result};
use std::time::Duration;
use tandem_client::{
    CallState, CallUpdate, ClientCommand, ClientConfig, ClientRuntime, SignalingClient,
};
use tandem_server::{SignalingService, router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use crate::integration::init_tracing;
use crate::utils::MockMedia;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn start_relay() -> Result<(String, SignalingService)> {
    let service = SignalingService::spawn(256);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let app = router(service.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((format!("ws://{}/ws", addr), service))
}

async fn wait_for_members(service: &SignalingService, room: &str, members: usize) -> Result<()> {
    tokio::time::timeout(TIMEOUT, async {
        loop {
            let rooms = service.list_rooms().await?;
            let current = rooms
                .iter()
                .find(|r| r.room.as_str() == room)
                .map(|r| r.members)
                .unwrap_or(0);
            if current == members {
                return Ok::<_, anyhow::Error>(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .context("room never reached the expected size")?
}

struct Participant {
    commands: mpsc::Sender<ClientCommand>,
    updates: broadcast::Receiver<CallUpdate>,
    media: MockMedia,
}

async fn spawn_participant(url: &str, name: &str, offer: &str, answer: &str) -> Result<Participant> {
    let config = ClientConfig::new(url, "r1", name);
    let signaling = SignalingClient::connect(&config.connect_url(), config.reconnect).await?;

    let media = MockMedia::new(offer, answer);
    let (_candidate_tx, candidate_rx) = mpsc::unbounded_channel();
    let runtime = ClientRuntime::new(config, signaling, media.clone(), candidate_rx);
    let updates = runtime.subscribe();

    let (commands, command_rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let _ = runtime.run(command_rx).await;
    });

    Ok(Participant {
        commands,
        updates,
        media,
    })
}

async fn wait_for(updates: &mut broadcast::Receiver<CallUpdate>, wanted: CallUpdate) -> Result<()> {
    tokio::time::timeout(TIMEOUT, async {
        loop {
            let update = updates.recv().await?;
            if update == wanted {
                return Ok::<_, anyhow::Error>(());
            }
        }
    })
    .await
    .with_context(|| format!("never saw {:?}", wanted))?
}

#[tokio::test]
async fn test_call_over_relay() {
    init_tracing();

    let (url, service) = start_relay().await.expect("Relay failed to start");

    let mut a = spawn_participant(&url, "ana", "X", "unused")
        .await
        .expect("A failed to connect");
    wait_for_members(&service, "r1", 1).await.expect("A not in r1");
    let mut b = spawn_participant(&url, "ben", "unused", "Y")
        .await
        .expect("B failed to connect");
    wait_for_members(&service, "r1", 2).await.expect("B not in r1");

    a.commands.send(ClientCommand::StartCall).await.unwrap();

    wait_for(&mut a.updates, CallUpdate::StateChanged(CallState::Connected))
        .await
        .expect("A never connected");
    wait_for(&mut b.updates, CallUpdate::StateChanged(CallState::Connected))
        .await
        .expect("B never connected");

    b.commands
        .send(ClientCommand::Chat("hello ana".to_owned()))
        .await
        .unwrap();
    let chat = tokio::time::timeout(TIMEOUT, async {
        loop {
            if let Ok(CallUpdate::Chat(message)) = a.updates.recv().await {
                return message;
            }
        }
    })
    .await
    .expect("Chat never arrived");
    assert_eq!(chat.text, "hello ana");
    assert_eq!(chat.sender, "ben");

    // A leaving mid-call ends B's call.
    a.commands.send(ClientCommand::Quit).await.unwrap();
    wait_for(&mut b.updates, CallUpdate::StateChanged(CallState::Ended))
        .await
        .expect("B's call never ended");
    wait_for(&mut b.updates, CallUpdate::StateChanged(CallState::Idle))
        .await
        .expect("B never reset");
    wait_for_members(&service, "r1", 1).await.expect("A still in r1");

    assert_eq!(a.media.releases(), 1);
    assert_eq!(b.media.releases(), 1);
}
