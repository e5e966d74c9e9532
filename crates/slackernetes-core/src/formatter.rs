//! Reply text builders.
//!
//! Pure functions producing the exact text the bot posts back. Keeping them
//! here lets the handlers stay focused on cluster calls.

use crate::registry::CommandTable;

/// Separator between a pattern and its description in the help listing.
const HELP_COLUMN_GAP: &str = "    ";

/// Renders a header line followed by one item per line.
fn listing<S: AsRef<str>>(header: &str, items: &[S]) -> String {
    let mut out = String::from(header);
    for item in items {
        out.push('\n');
        out.push_str(item.as_ref());
    }
    out
}

/// Help reply: every registered pattern with its description, in table
/// order.
pub fn help(table: &CommandTable) -> String {
    let lines: Vec<String> = table
        .entries()
        .iter()
        .map(|entry| {
            format!(
                "{}{HELP_COLUMN_GAP}{}",
                entry.pattern().as_str(),
                entry.description()
            )
        })
        .collect();
    listing("Here are all the supported commands:", &lines)
}

pub fn images_in_namespace<S: AsRef<str>>(namespace: &str, images: &[S]) -> String {
    listing(
        &format!("Here are all the images in `{namespace}` I can find:"),
        images,
    )
}

pub fn pods_in_namespace<S: AsRef<str>>(namespace: &str, pods: &[S]) -> String {
    listing(
        &format!("Here are all the pods in `{namespace}` I can find:"),
        pods,
    )
}

pub fn all_pods<S: AsRef<str>>(pods: &[S]) -> String {
    listing("Here are all the pods I can find:", pods)
}

pub fn namespaces<S: AsRef<str>>(namespaces: &[S]) -> String {
    listing("Here are all the namespaces I can find:", namespaces)
}

/// Reply when no pod name contains the requested fragment.
pub fn pod_not_found(fragment: &str) -> String {
    format!("Could not find pod named {fragment}. Did you type it correctly?")
}

/// File comment for a log upload, current or previous instance alike.
pub fn logs_comment(pod: &str) -> String {
    format!("Here are the logs from `{pod}`")
}

pub fn description_comment(pod: &str) -> String {
    format!("Here is the description for pod {pod}")
}

/// Fallback reply echoing the original message verbatim.
pub fn unsupported(text: &str) -> String {
    format!("Sorry, I don't understand: {text}")
}

/// Generic reply when a handler fails with a cluster or chat error.
pub fn handler_failed(handler: &str, error: &str) -> String {
    format!(":warning: Sorry, something went wrong while running `{handler}`: {error}")
}
