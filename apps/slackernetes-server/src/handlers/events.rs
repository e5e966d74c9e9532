//! Events API handler for Slack Socket Mode messages.
//!
//! Converts `message` events into [`InboundMessage`]s and hands them to the
//! [`Router`]. Every other event type is dropped here.

use serde::Deserialize;
use slackernetes_core::{ChatOps, ClusterOps, InboundMessage, Router};
use tracing::{debug, instrument, warn};

/// Events API wrapper envelope containing the inner event.
///
/// Slack wraps the actual event inside an `event` field of the
/// `events_api` envelope payload.
#[derive(Debug, Deserialize)]
struct EventsApiPayload {
    event: EventPayload,
}

/// The inner event payload from the Events API.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum EventPayload {
    /// A message posted in a channel, group, or DM.
    #[serde(rename = "message")]
    Message(MessageEvent),

    /// Any other event type, silently ignored.
    #[serde(other)]
    Other,
}

/// A message event from Slack's Events API.
///
/// Edited and deleted messages arrive with a subtype and may lack top-level
/// `text` or `ts`, so every field falls back to a default.
#[derive(Debug, Deserialize)]
pub struct MessageEvent {
    /// Channel where the message was posted.
    #[serde(default)]
    pub channel: String,

    /// User ID of the message author (absent for bot messages).
    #[serde(default)]
    pub user: Option<String>,

    /// Message text content.
    #[serde(default)]
    pub text: String,

    /// Timestamp of this message.
    #[serde(default)]
    pub ts: String,

    /// Message subtype (e.g., `"bot_message"`, `"channel_join"`).
    /// Regular user messages have no subtype.
    #[serde(default)]
    pub subtype: Option<String>,
}

impl From<MessageEvent> for InboundMessage {
    fn from(event: MessageEvent) -> Self {
        Self {
            user: event.user,
            channel: event.channel,
            text: event.text,
            subtype: event.subtype,
        }
    }
}

/// Handles an Events API envelope payload.
///
/// Message events go to the router, which decides whether the bot was
/// addressed. Unparseable payloads are logged and dropped.
#[instrument(skip(router, payload))]
pub async fn handle_event<C: ClusterOps, R: ChatOps>(
    router: &Router<C, R>,
    payload: serde_json::Value,
) {
    let events_payload: EventsApiPayload = match serde_json::from_value(payload) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "Failed to parse events_api payload");
            return;
        }
    };

    match events_payload.event {
        EventPayload::Message(msg) => {
            debug!(channel = msg.channel, ts = msg.ts, "Received message event");
            let inbound = InboundMessage::from(msg);
            router.handle(&inbound).await;
        }
        EventPayload::Other => {
            debug!("Ignoring non-message event");
        }
    }
}
