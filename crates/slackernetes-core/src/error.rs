//! Error types for the core command engine.
//!
//! Defines `CoreError` as the primary error type for all operations
//! within `slackernetes-core`.

use thiserror::Error;

/// Error type for slackernetes-core operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A command pattern failed to compile during table construction.
    #[error("Invalid command pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending pattern source.
        pattern: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// A handler's pattern did not yield the capture group it needs.
    #[error("Missing command argument: {0}")]
    MissingArgument(String),

    /// An error from the Kubernetes API or client configuration.
    #[error("Cluster error: {0}")]
    Cluster(String),

    /// An error from the chat service while replying or resolving names.
    #[error("Chat error: {0}")]
    Chat(String),

    /// A YAML serialization error while rendering a resource description.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}
