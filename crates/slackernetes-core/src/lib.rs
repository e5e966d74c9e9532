//! Slackernetes Core
//!
//! The chat-facing command engine of Slackernetes. Matches free-text
//! messages addressed to the bot against an ordered table of regular
//! expressions and answers them with read-only Kubernetes queries.
//!
//! # Architecture
//!
//! - [`CommandTable`] is the ordered `(pattern, handler, description)` list,
//!   built once through [`CommandTableBuilder`]
//! - [`builtin_commands`] registers the shipped command set
//! - [`Router`] filters messages, picks the first matching entry and runs
//!   its [`Handler`]
//! - [`ClusterOps`] / [`ChatOps`] abstract the Kubernetes API and the chat
//!   service for testability; [`KubeCluster`] is the production cluster
//!   client
//! - [`BotIdentity`] is the bot's own user ID, resolved once at startup

pub mod chat;
pub mod cluster;
mod commands;
mod error;
pub mod formatter;
pub mod handlers;
pub mod message;
pub mod registry;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

pub use chat::ChatOps;
pub use cluster::{ClusterOps, KubeCluster};
pub use commands::builtin_commands;
pub use error::CoreError;
pub use message::{BotIdentity, InboundMessage};
pub use registry::{CommandEntry, CommandTable, CommandTableBuilder, Handler};
pub use router::{Route, Router};
