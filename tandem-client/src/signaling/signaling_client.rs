use crate::config::ReconnectPolicy;
use crate::error::ClientError;
use crate::signaling::WsSignalSink;
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tandem_core::{EndpointId, Signal};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One live connection to the relay.
///
/// Owns a writer task draining [`WsSignalSink`] into the socket and a reader
/// task decoding inbound frames. `next_signal` returns `None` once the
/// socket is gone.
pub struct SignalingClient {
    local_id: EndpointId,
    outgoing: mpsc::UnboundedSender<Message>,
    incoming: mpsc::UnboundedReceiver<Signal>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl SignalingClient {
    /// Connects within the policy's attempt budget and waits for the relay's welcome.
    pub async fn connect(url: &str, policy: ReconnectPolicy) -> Result<Self, ClientError> {
        let attempts = policy.attempts.max(1);
        let mut reason = String::new();

        for attempt in 1..=attempts {
            match tokio::time::timeout(policy.timeout, connect_async(url)).await {
                Ok(Ok((ws, _))) => {
                    info!("Connected to relay at {} (attempt {})", url, attempt);
                    return Self::start(ws, policy).await;
                }
                Ok(Err(e)) => {
                    warn!("Attempt {}/{} to reach {} failed: {}", attempt, attempts, url, e);
                    reason = e.to_string();
                }
                Err(_) => {
                    warn!("Attempt {}/{} to reach {} timed out", attempt, attempts, url);
                    reason = format!("timed out after {:?}", policy.timeout);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(policy.backoff).await;
            }
        }

        Err(ClientError::ConnectFailed {
            url: url.to_owned(),
            attempts,
            reason,
        })
    }

    async fn start(ws: WsStream, policy: ReconnectPolicy) -> Result<Self, ClientError> {
        let (mut sink, mut stream) = ws.split();

        let local_id = match tokio::time::timeout(policy.timeout, read_welcome(&mut stream)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(ClientError::UnexpectedFrame(
                    "no welcome from relay".to_owned(),
                ));
            }
        };
        info!("Relay welcomed us as {}", local_id);

        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let (incoming_tx, incoming) = mpsc::unbounded_channel();

        let writer = tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                if let Err(e) = sink.send(msg).await {
                    warn!("Relay write failed: {}", e);
                    break;
                }
            }
        });

        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<Signal>(text.as_str()) {
                        Ok(signal) => {
                            if incoming_tx.send(signal).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Dropping undecodable frame: {}", e),
                    },
                    Ok(Message::Binary(_)) => warn!("Dropping binary frame from relay"),
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay read failed: {}", e);
                        break;
                    }
                }
            }
            debug!("Relay reader finished");
        });

        Ok(Self {
            local_id,
            outgoing,
            incoming,
            reader,
            writer,
        })
    }

    pub fn local_id(&self) -> EndpointId {
        self.local_id
    }

    pub fn sink(&self) -> WsSignalSink {
        WsSignalSink::new(self.outgoing.clone())
    }

    pub async fn next_signal(&mut self) -> Option<Signal> {
        self.incoming.recv().await
    }

    /// Asks the relay to close; `next_signal` drains to `None` afterwards.
    pub fn close(&self) {
        let _ = self.outgoing.send(Message::Close(None));
    }
}

impl Drop for SignalingClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn read_welcome(stream: &mut SplitStream<WsStream>) -> Result<EndpointId, ClientError> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                return match serde_json::from_str::<Signal>(text.as_str())? {
                    Signal::Welcome { id } => Ok(id),
                    other => Err(ClientError::UnexpectedFrame(format!(
                        "expected welcome, got '{}'",
                        other.kind()
                    ))),
                };
            }
            Some(Ok(Message::Close(_))) | None => return Err(ClientError::Closed),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    }
}
