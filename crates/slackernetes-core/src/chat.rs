//! Reply primitives towards the chat service.
//!
//! Defines the [`ChatOps`] trait the router and handlers use to answer a
//! request. The Slack Web API client in `slackernetes-server` is the
//! production implementation; tests substitute a recording mock.

use std::future::Future;

use crate::CoreError;

/// Abstraction over the chat service calls a command needs.
///
/// Uses return-position `impl Future` rather than `#[async_trait]` because
/// the router is generic over its chat client and never stores it as a
/// trait object. Implementations must be `Send + Sync` so the router can be
/// shared through an `Arc`.
pub trait ChatOps: Send + Sync {
    /// Posts a plain text message to `channel`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Chat` if the chat service rejects the message.
    fn post_text(
        &self,
        channel: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Uploads `content` as a file named `filename` to `channel`, preceded
    /// by `initial_comment`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Chat` if any step of the upload fails.
    fn post_file(
        &self,
        channel: &str,
        initial_comment: &str,
        filename: &str,
        content: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Resolves a user ID to a display handle.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Chat` if the lookup fails.
    fn user_name(&self, user_id: &str) -> impl Future<Output = Result<String, CoreError>> + Send;

    /// Resolves a channel ID to its name.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Chat` if the lookup fails.
    fn channel_name(
        &self,
        channel_id: &str,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;
}
