//! The builtin command set.
//!
//! Registration order matters: the router takes the first pattern that
//! matches, so broader patterns must come after the ones they would shadow.

use crate::CoreError;
use crate::registry::{CommandTable, Handler};

/// Builds the command table the bot ships with.
///
/// # Errors
///
/// Returns `CoreError::InvalidPattern` if a builtin pattern fails to
/// compile.
pub fn builtin_commands() -> Result<CommandTable, CoreError> {
    Ok(CommandTable::builder()
        .register(
            r"(help|(list|get) commands?)",
            Handler::ShowHelp,
            "List all available commands",
        )?
        .register(
            r"(?:get|list) pods? in namespace (\S+)$",
            Handler::ListPods,
            "List all the Pods in a namespace",
        )?
        .register(
            r"(?:get|list) pods?$",
            Handler::ListAllPods,
            "List all the Pods in a cluster",
        )?
        .register(
            r"(?:get|list) logs? for pod (\S+)$",
            Handler::PodLogs,
            "Get logs for a given pod",
        )?
        .register(
            r"(get|list) namespaces$",
            Handler::ListNamespaces,
            "List all namespaces in a cluster",
        )?
        .register(
            r"(?:get|list) images in namespace (\S+)",
            Handler::ListImages,
            "List images used in a namespace",
        )?
        .register(
            r"(?:get|list) previous logs? for pod (\S+)$",
            Handler::PreviousPodLogs,
            "Get logs for a previous instance of a given pod",
        )?
        .register(
            r"describe pod (.+)",
            Handler::DescribePod,
            "Get details about a pod including env vars and other useful info",
        )?
        .build())
}
