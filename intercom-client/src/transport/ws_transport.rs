use crate::transport::{SignalingTransport, TransportError, TransportEvent};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use intercom_core::{ServerEvent, SignalMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

const EVENT_QUEUE: usize = 64;

/// WebSocket signaling transport. A writer task drains the outbound queue
/// into the socket sink, a reader task decodes inbound frames into
/// [`TransportEvent`]s; both preserve order because they run sequentially.
pub struct WsTransport {
    out_tx: mpsc::UnboundedSender<Message>,
}

impl WsTransport {
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>), TransportError> {
        let (socket, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        debug!("Signaling connected to {}", url);

        let (mut sink, mut stream) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if sink.send(msg).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            if event_tx.send(TransportEvent::Signal(event)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!("Invalid server event: {:?}", e),
                    },
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => {}
                }
            }

            let _ = event_tx.send(TransportEvent::Disconnected).await;
        });

        Ok((Self { out_tx }, event_rx))
    }
}

#[async_trait]
impl SignalingTransport for WsTransport {
    async fn send(&self, msg: SignalMessage) -> Result<(), TransportError> {
        let json = serde_json::to_string(&msg)?;
        self.out_tx
            .send(Message::Text(json.into()))
            .map_err(|_| TransportError::Closed)
    }
}
