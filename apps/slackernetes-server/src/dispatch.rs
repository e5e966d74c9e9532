//! Socket Mode frame parsing and the single-consumer dispatch loop.
//!
//! Slack Socket Mode delivers JSON frames over the WebSocket. System frames
//! (`hello`, `disconnect`) steer the connection; `events_api` envelopes carry
//! chat messages. Envelopes are queued by the socket and drained here one at
//! a time, so a slow cluster call delays the next command instead of running
//! beside it.

use std::sync::Arc;

use serde::Deserialize;
use slackernetes_core::{ChatOps, ClusterOps, Router};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::error::ServerError;
use crate::handlers;

/// An `events_api` envelope received from Slack.
///
/// The envelope has already been acknowledged by the time it is queued.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Unique identifier for this envelope, echoed in the acknowledgment.
    pub envelope_id: String,

    /// The Events API payload (`{"event": {...}, ...}`).
    pub payload: serde_json::Value,
}

/// Raw Socket Mode frame for initial deserialization.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: String,

    #[serde(default)]
    envelope_id: Option<String>,

    #[serde(default)]
    payload: Option<serde_json::Value>,

    #[serde(default)]
    reason: Option<String>,
}

/// Result of parsing a Socket Mode frame.
#[derive(Debug)]
pub enum SocketFrame {
    /// The connection is established.
    Hello,

    /// Slack asks the client to reconnect.
    Disconnect,

    /// An Events API envelope to acknowledge and dispatch.
    Envelope(Envelope),

    /// An envelope the bot acknowledges but does not act on (slash commands,
    /// interactions). Holds the envelope ID to echo back.
    AckOnly(String),

    /// A frame this bot has no use for.
    Ignored,
}

/// Parses one WebSocket text frame.
///
/// # Errors
///
/// Returns `ServerError::Dispatch` if the frame is not valid JSON or lacks a
/// `type` field.
pub fn parse_frame(text: &str) -> Result<SocketFrame, ServerError> {
    let raw: RawFrame =
        serde_json::from_str(text).map_err(|e| ServerError::Dispatch(format!("Bad JSON: {e}")))?;

    match raw.frame_type.as_str() {
        "hello" => {
            info!("Received hello from Slack, connection established");
            Ok(SocketFrame::Hello)
        }
        "disconnect" => {
            info!(reason = raw.reason.as_deref().unwrap_or("unspecified"), "Slack requested reconnect");
            Ok(SocketFrame::Disconnect)
        }
        "events_api" => {
            let Some(envelope_id) = raw.envelope_id else {
                warn!("events_api envelope missing envelope_id, skipping");
                return Ok(SocketFrame::Ignored);
            };
            debug!(envelope_id, "Parsed events_api envelope");
            Ok(SocketFrame::Envelope(Envelope {
                envelope_id,
                payload: raw.payload.unwrap_or(serde_json::Value::Null),
            }))
        }
        "slash_commands" | "interactive" => match raw.envelope_id {
            Some(envelope_id) => {
                debug!(envelope_id, frame_type = %raw.frame_type, "Acknowledging unhandled envelope");
                Ok(SocketFrame::AckOnly(envelope_id))
            }
            None => Ok(SocketFrame::Ignored),
        },
        other => {
            debug!(frame_type = other, "Ignoring Socket Mode frame");
            Ok(SocketFrame::Ignored)
        }
    }
}

/// Hands one envelope to the events handler.
#[instrument(skip(router, envelope), fields(envelope_id = %envelope.envelope_id))]
pub async fn dispatch<C: ClusterOps, R: ChatOps>(router: &Router<C, R>, envelope: Envelope) {
    debug!("Dispatching envelope");
    handlers::events::handle_event(router, envelope.payload).await;
}

/// Drains the envelope queue, dispatching strictly one envelope at a time.
///
/// Returns once every sender has been dropped.
pub async fn consume<C: ClusterOps, R: ChatOps>(
    router: Arc<Router<C, R>>,
    mut queue: mpsc::Receiver<Envelope>,
) {
    while let Some(envelope) = queue.recv().await {
        dispatch(&router, envelope).await;
    }
    debug!("Envelope queue closed, consumer exiting");
}
