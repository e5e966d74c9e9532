//! Server configuration loaded from the process environment.
//!
//! [`ServerConfig`] carries the two Slack tokens and the log level. There are
//! no command-line flags and no config file; Kubernetes credentials are found
//! by the cluster client itself.

use tracing::debug;

use crate::error::ServerError;

/// Environment variable holding the bot token (`xoxb-...`).
pub const BOT_TOKEN_VAR: &str = "SLACK_API_TOKEN";

/// Environment variable holding the Socket Mode app token (`xapp-...`).
pub const APP_TOKEN_VAR: &str = "SLACK_APP_TOKEN";

/// Environment variable holding the tracing filter directive.
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

/// Log level used when `LOG_LEVEL` is unset or blank.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Slack API token configuration.
    pub slack: SlackConfig,

    /// Tracing filter directive (e.g. `info`, `debug`, `slackernetes=trace`).
    pub log_level: String,
}

/// Slack API token configuration.
#[derive(Clone)]
pub struct SlackConfig {
    /// App-level token for Socket Mode (`xapp-...`).
    pub app_token: String,

    /// Bot User OAuth Token for Web API calls (`xoxb-...`).
    pub bot_token: String,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("app_token", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("slack", &self.slack)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if a required token is missing or
    /// malformed.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if a required token is missing or
    /// malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .ok_or_else(|| ServerError::Config(format!("{name} environment variable not set")))
        };

        let config = Self {
            slack: SlackConfig {
                app_token: required(APP_TOKEN_VAR)?,
                bot_token: required(BOT_TOKEN_VAR)?,
            },
            log_level: lookup(LOG_LEVEL_VAR)
                .map(|level| level.trim().to_string())
                .filter(|level| !level.is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };
        config.validate()?;
        debug!(log_level = config.log_level, "Configuration read from environment");
        Ok(config)
    }

    /// Validates that required fields are present and well-formed.
    fn validate(&self) -> Result<(), ServerError> {
        if self.slack.app_token.is_empty() {
            return Err(ServerError::Config(format!("{APP_TOKEN_VAR} must not be empty")));
        }
        if !self.slack.app_token.starts_with("xapp-") {
            return Err(ServerError::Config(format!(
                "{APP_TOKEN_VAR} must start with 'xapp-'"
            )));
        }
        if self.slack.bot_token.is_empty() {
            return Err(ServerError::Config(format!("{BOT_TOKEN_VAR} must not be empty")));
        }
        if !self.slack.bot_token.starts_with("xoxb-") {
            return Err(ServerError::Config(format!(
                "{BOT_TOKEN_VAR} must start with 'xoxb-'"
            )));
        }
        Ok(())
    }
}
