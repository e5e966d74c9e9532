//! Socket Mode WebSocket connection management.
//!
//! [`SocketClient`] manages the outbound WebSocket connection to Slack's
//! Socket Mode endpoint. It acknowledges envelopes as soon as they arrive,
//! hands them to a single consumer over a bounded queue, and reconnects with
//! exponential backoff when the connection drops.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::dispatch::{self, Envelope, SocketFrame};
use crate::error::ServerError;
use crate::slack_client::SlackClient;

/// Initial backoff delay for reconnection.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum backoff delay cap for reconnection.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Type alias for the WebSocket stream with optional TLS.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Manages the WebSocket connection to Slack Socket Mode.
///
/// Connects using the app-level token (`xapp-...`) via `apps.connections.open`,
/// then keeps reading frames. The connection itself never runs a command:
/// envelopes are pushed to the queue given to [`run`](Self::run).
pub struct SocketClient {
    app_token: String,
    slack: SlackClient,
}

impl std::fmt::Debug for SocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketClient")
            .field("slack", &self.slack)
            .finish_non_exhaustive()
    }
}

/// Reason the event loop exited a single connection.
enum ConnectionExit {
    /// Clean shutdown requested by the application.
    Shutdown,
    /// Slack requested a disconnect or the connection was lost.
    Disconnect,
}

impl SocketClient {
    /// Creates a new Socket Mode client.
    pub fn new(app_token: String, slack: SlackClient) -> Self {
        Self { app_token, slack }
    }

    /// Connects and forwards envelopes into `queue` until shutdown.
    ///
    /// Auto-reconnects on disconnect with exponential backoff (1s to 30s cap).
    /// Returns when the shutdown signal fires or the queue's consumer is gone.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Dispatch` if the consumer side of the queue has
    /// been dropped.
    pub async fn run(
        &self,
        queue: mpsc::Sender<Envelope>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), ServerError> {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            if *shutdown.borrow() {
                info!("Shutdown requested, exiting socket loop");
                return Ok(());
            }

            match self.connect_and_run(&queue, &mut shutdown).await {
                Ok(ConnectionExit::Shutdown) => {
                    info!("Shutdown signal received, closing connection");
                    return Ok(());
                }
                Ok(ConnectionExit::Disconnect) => {
                    info!("Disconnected, reconnecting");
                    backoff = INITIAL_BACKOFF;
                }
                Err(e @ ServerError::Dispatch(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        error = %e,
                        backoff_secs = backoff.as_secs(),
                        "Connection error, reconnecting after backoff"
                    );
                }
            }

            tokio::select! {
                () = tokio::time::sleep(backoff) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutdown during backoff, exiting");
                        return Ok(());
                    }
                }
            }

            backoff = next_backoff(backoff);
        }
    }

    /// Runs the read loop for a single connection.
    async fn connect_and_run(
        &self,
        queue: &mpsc::Sender<Envelope>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<ConnectionExit, ServerError> {
        let wss_url = self.slack.connections_open(&self.app_token).await?;
        let (ws_stream, _response): (WsStream, _) = connect_async(wss_url.as_str())
            .await
            .map_err(|e| ServerError::WebSocket(format!("WebSocket connect failed: {e}")))?;
        info!("WebSocket connected to Slack Socket Mode");

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    let Some(msg_result) = msg else {
                        info!("WebSocket stream ended");
                        return Ok(ConnectionExit::Disconnect);
                    };
                    let ws_msg = msg_result.map_err(|e| {
                        ServerError::WebSocket(format!("WebSocket read error: {e}"))
                    })?;

                    match ws_msg {
                        WsMessage::Text(ref text) => {
                            let text_ref: &str = text;
                            let frame = match dispatch::parse_frame(text_ref) {
                                Ok(frame) => frame,
                                Err(e) => {
                                    warn!(error = %e, "Dropping unparseable frame");
                                    continue;
                                }
                            };
                            match frame {
                                SocketFrame::Hello => {}
                                SocketFrame::Disconnect => return Ok(ConnectionExit::Disconnect),
                                SocketFrame::Envelope(envelope) => {
                                    write.send(ack_message(&envelope.envelope_id)).await.map_err(|e| {
                                        ServerError::WebSocket(format!("Ack send failed: {e}"))
                                    })?;
                                    queue.send(envelope).await.map_err(|_| {
                                        ServerError::Dispatch("envelope consumer has stopped".into())
                                    })?;
                                }
                                SocketFrame::AckOnly(envelope_id) => {
                                    write.send(ack_message(&envelope_id)).await.map_err(|e| {
                                        ServerError::WebSocket(format!("Ack send failed: {e}"))
                                    })?;
                                }
                                SocketFrame::Ignored => {}
                            }
                        }
                        WsMessage::Ping(data) => {
                            write.send(WsMessage::Pong(data)).await.map_err(|e| {
                                ServerError::WebSocket(format!("Pong send failed: {e}"))
                            })?;
                        }
                        WsMessage::Close(frame) => {
                            debug!(?frame, "Received WebSocket close frame");
                            return Ok(ConnectionExit::Disconnect);
                        }
                        _ => {}
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return Ok(ConnectionExit::Shutdown);
                    }
                }
            }
        }
    }
}

/// Builds the acknowledgment frame for an envelope.
fn ack_message(envelope_id: &str) -> WsMessage {
    let ack = serde_json::json!({ "envelope_id": envelope_id });
    WsMessage::Text(ack.to_string().into())
}

/// Doubles the backoff delay, capped at [`MAX_BACKOFF`].
fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}
