//! Message filtering and first-match command dispatch.
//!
//! [`Router`] decides whether an inbound message is addressed to the bot,
//! picks the first command whose pattern matches, logs the request and runs
//! the handler. Handler failures are reported back to the channel instead of
//! being dropped silently.

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::chat::ChatOps;
use crate::cluster::ClusterOps;
use crate::formatter;
use crate::handlers::{self, HandlerContext};
use crate::message::{BotIdentity, InboundMessage};
use crate::registry::{CommandEntry, CommandTable, Handler};

/// Outcome of routing a message that is addressed to the bot.
#[derive(Debug, Clone, Copy)]
pub enum Route<'a> {
    /// A registered command matched.
    Command(&'a CommandEntry),
    /// Nothing matched; the unsupported-command reply applies.
    Fallback,
}

impl<'a> Route<'a> {
    /// The handler to invoke.
    pub fn handler(&self) -> Handler {
        match self {
            Self::Command(entry) => entry.handler(),
            Self::Fallback => Handler::Unsupported,
        }
    }

    /// The winning pattern, absent for the fallback.
    pub fn pattern(&self) -> Option<&'a Regex> {
        match *self {
            Self::Command(entry) => Some(entry.pattern()),
            Self::Fallback => None,
        }
    }
}

/// Routes inbound messages to command handlers.
///
/// Holds the bot identity resolved at startup, the immutable command table
/// and the two clients handlers talk to. Share it through an `Arc`.
#[derive(Debug)]
pub struct Router<C, R> {
    identity: BotIdentity,
    table: CommandTable,
    cluster: C,
    chat: R,
}

impl<C: ClusterOps, R: ChatOps> Router<C, R> {
    /// Creates a router for the given identity and command table.
    pub fn new(identity: BotIdentity, table: CommandTable, cluster: C, chat: R) -> Self {
        Self {
            identity,
            table,
            cluster,
            chat,
        }
    }

    /// The bot's own identity.
    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    /// The command table in match priority order.
    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// The chat backend replies are posted through.
    pub fn chat(&self) -> &R {
        &self.chat
    }

    /// Selects the route for `msg`, or `None` if the message must be
    /// ignored.
    ///
    /// Messages with any subtype and messages that do not begin with the
    /// bot's mention are ignored. Otherwise the table is scanned in
    /// registration order against the full message text and the first match
    /// wins; no match yields [`Route::Fallback`].
    pub fn route(&self, msg: &InboundMessage) -> Option<Route<'_>> {
        if msg.subtype.is_some() {
            return None;
        }
        if !self.identity.is_addressed_in(&msg.text) {
            return None;
        }
        Some(
            self.table
                .find(&msg.text)
                .map_or(Route::Fallback, Route::Command),
        )
    }

    /// Handles one inbound message end to end.
    ///
    /// Returns the handler that was dispatched, or `None` if the message was
    /// ignored. Errors from the handler are logged and answered with a
    /// generic failure reply; nothing is propagated to the caller.
    #[instrument(skip(self, msg), fields(channel = %msg.channel))]
    pub async fn handle(&self, msg: &InboundMessage) -> Option<Handler> {
        if let Some(subtype) = &msg.subtype {
            debug!(subtype, "Ignoring message with subtype");
            return None;
        }
        let Some(route) = self.route(msg) else {
            debug!("Ignoring message not addressed to the bot");
            return None;
        };
        let handler = route.handler();

        self.log_request(msg, handler).await;

        let ctx = HandlerContext {
            message: msg,
            pattern: route.pattern(),
            table: &self.table,
            cluster: &self.cluster,
            chat: &self.chat,
        };

        if let Err(e) = handlers::run(handler, &ctx).await {
            warn!(error = %e, handler = handler.name(), "Command handler failed");
            let reply = formatter::handler_failed(handler.name(), &e.to_string());
            if let Err(post_err) = self.chat.post_text(&msg.channel, &reply).await {
                warn!(error = %post_err, "Failed to post error reply");
            }
        }

        Some(handler)
    }

    /// Emits the per-request log line.
    ///
    /// Name lookups that fail fall back to the raw IDs.
    async fn log_request(&self, msg: &InboundMessage, handler: Handler) {
        let user = match msg.user.as_deref() {
            Some(user_id) => match self.chat.user_name(user_id).await {
                Ok(name) => name,
                Err(e) => {
                    warn!(error = %e, user_id, "Cannot resolve user name");
                    user_id.to_string()
                }
            },
            None => "unknown".to_string(),
        };
        let channel = match self.chat.channel_name(&msg.channel).await {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, channel_id = msg.channel, "Cannot resolve channel name");
                msg.channel.clone()
            }
        };

        info!(
            user,
            handler = handler.name(),
            channel,
            command = self.identity.strip_mention(&msg.text),
            "Received command"
        );
    }
}
