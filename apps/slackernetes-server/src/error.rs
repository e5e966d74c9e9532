//! Error types for the slackernetes-server application.
//!
//! Defines [`ServerError`] as the primary error type for all operations
//! within `slackernetes-server`. Uses `thiserror` for ergonomic error
//! definitions following the project convention.

use slackernetes_core::CoreError;
use thiserror::Error;

/// Error type for slackernetes-server operations.
///
/// Variants are grouped by subsystem: configuration, Slack API communication,
/// WebSocket transport and envelope dispatch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServerError {
    /// A configuration error (missing or invalid environment values).
    #[error("Config error: {0}")]
    Config(String),

    /// An error from a Slack Web API call.
    #[error("Slack API error: {0}")]
    SlackApi(String),

    /// A WebSocket transport error (connection, read, write).
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// An error while parsing or queueing an envelope.
    #[error("Dispatch error: {0}")]
    Dispatch(String),
}

/// Slack failures surface to the router as chat errors.
impl From<ServerError> for CoreError {
    fn from(err: ServerError) -> Self {
        CoreError::Chat(err.to_string())
    }
}
