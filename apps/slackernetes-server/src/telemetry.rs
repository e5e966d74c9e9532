//! Tracing setup and process lifecycle events.
//!
//! Start and stop are logged as structured events carrying a metric name,
//! a state label, a value and an RFC 3339 timestamp, so a log collector can
//! turn them into a process-liveness series.

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Metric name attached to lifecycle events.
pub const PROCESS_METRIC: &str = "slackernetes_process";

/// Lifecycle state of the bot process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Start,
    Stop,
}

impl ProcessState {
    /// Label used in the `state` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// One process lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub metric: &'static str,
    pub state: ProcessState,
    pub value: u64,
    /// RFC 3339 time the event was taken.
    pub timestamp: String,
}

impl LifecycleEvent {
    /// Stamps an event for `state` with the current time.
    pub fn now(state: ProcessState) -> Self {
        Self {
            metric: PROCESS_METRIC,
            state,
            value: 1,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Emits one lifecycle event for `state` and returns what was logged.
pub fn record_lifecycle(state: ProcessState) -> LifecycleEvent {
    let event = LifecycleEvent::now(state);
    info!(
        metric = event.metric,
        state = event.state.as_str(),
        value = event.value,
        timestamp = %event.timestamp,
        "Process lifecycle"
    );
    event
}

/// Builds the tracing filter from a `LOG_LEVEL` directive.
///
/// # Errors
///
/// Returns `ServerError::Config` if the directive cannot be parsed.
pub fn env_filter(level: &str) -> Result<EnvFilter, ServerError> {
    EnvFilter::try_new(level)
        .map_err(|e| ServerError::Config(format!("invalid log level '{level}': {e}")))
}
