//! Inbound chat messages and the bot's own identity.

/// A chat message as delivered by the real-time connection.
///
/// Only the fields the router looks at are kept. `subtype` is set for
/// edits, joins, bot posts and every other non-plain message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    /// User ID of the author, absent for some system messages.
    pub user: Option<String>,

    /// Channel the message was posted in. Replies go back here.
    pub channel: String,

    /// Raw message text, including the leading bot mention.
    pub text: String,

    /// Message subtype (e.g. `"message_changed"`, `"channel_join"`).
    pub subtype: Option<String>,
}

/// The bot's own user identity, resolved once at startup.
///
/// # Examples
///
/// ```
/// use slackernetes_core::BotIdentity;
///
/// let me = BotIdentity::new("U0BOT");
/// assert!(me.is_addressed_in("<@U0BOT> list pods"));
/// assert!(!me.is_addressed_in("list pods <@U0BOT>"));
/// assert_eq!(me.strip_mention("<@U0BOT> list pods"), "list pods");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    user_id: String,
    mention: String,
}

impl BotIdentity {
    /// Creates an identity from the bot's user ID (e.g. `U0123ABC`).
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let mention = format!("<@{user_id}>");
        Self { user_id, mention }
    }

    /// Returns the bot's user ID.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the mention token, `<@USER_ID>`.
    pub fn mention(&self) -> &str {
        &self.mention
    }

    /// Returns whether `text` begins with this bot's mention followed by
    /// at least one more character on the same line.
    pub fn is_addressed_in(&self, text: &str) -> bool {
        text.strip_prefix(self.mention.as_str())
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c != '\n')
    }

    /// Returns `text` with a leading bot mention removed and surrounding
    /// whitespace trimmed.
    pub fn strip_mention<'t>(&self, text: &'t str) -> &'t str {
        text.strip_prefix(self.mention.as_str())
            .unwrap_or(text)
            .trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_mention_from_user_id() {
        let me = BotIdentity::new("U123");
        assert_eq!(me.user_id(), "U123");
        assert_eq!(me.mention(), "<@U123>");
    }

    #[test]
    fn test_should_require_mention_at_start() {
        let me = BotIdentity::new("U123");
        assert!(me.is_addressed_in("<@U123> help"));
        assert!(me.is_addressed_in("<@U123>help"));
        assert!(!me.is_addressed_in(" <@U123> help"));
        assert!(!me.is_addressed_in("hey <@U123> help"));
    }

    #[test]
    fn test_should_require_text_after_mention() {
        let me = BotIdentity::new("U123");
        assert!(!me.is_addressed_in("<@U123>"));
        assert!(!me.is_addressed_in("<@U123>\nhelp"));
    }

    #[test]
    fn test_should_not_match_other_users() {
        let me = BotIdentity::new("U123");
        assert!(!me.is_addressed_in("<@U999> help"));
        assert!(!me.is_addressed_in("<@U1234> help"));
    }

    #[test]
    fn test_should_strip_leading_mention_only() {
        let me = BotIdentity::new("U123");
        assert_eq!(me.strip_mention("<@U123>  get pods "), "get pods");
        assert_eq!(me.strip_mention("get pods"), "get pods");
    }
}
