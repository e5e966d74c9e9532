//! The ordered command table.
//!
//! A [`CommandTable`] is an ordered list of `(pattern, handler, description)`
//! entries assembled once at startup through [`CommandTableBuilder`].
//! Registration order is match priority: the router takes the first entry
//! whose pattern matches, so the table is a `Vec` and never a map.

use regex::Regex;

use crate::CoreError;

/// The handler functions a command entry can point at.
///
/// Dispatched with a `match` in [`handlers::run`](crate::handlers::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// List every registered command.
    ShowHelp,
    /// List the container images used in a namespace.
    ListImages,
    /// List the pods in a namespace.
    ListPods,
    /// List the pods in every namespace.
    ListAllPods,
    /// Upload the log of a pod.
    PodLogs,
    /// Upload the log of a pod's previous container instance.
    PreviousPodLogs,
    /// List every namespace.
    ListNamespaces,
    /// Upload the full pod object as YAML.
    DescribePod,
    /// Echo back text that no command matched.
    Unsupported,
}

impl Handler {
    /// Stable snake_case name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::ShowHelp => "show_help",
            Self::ListImages => "list_images",
            Self::ListPods => "list_pods",
            Self::ListAllPods => "list_all_pods",
            Self::PodLogs => "pod_logs",
            Self::PreviousPodLogs => "previous_pod_logs",
            Self::ListNamespaces => "list_namespaces",
            Self::DescribePod => "describe_pod",
            Self::Unsupported => "unsupported_command",
        }
    }
}

/// One registered command.
#[derive(Debug, Clone)]
pub struct CommandEntry {
    pattern: Regex,
    handler: Handler,
    description: &'static str,
}

impl CommandEntry {
    /// The compiled pattern. Handlers re-run it to extract capture groups.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// The handler invoked when this entry wins.
    pub fn handler(&self) -> Handler {
        self.handler
    }

    /// Human-readable description shown by the help command.
    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// Immutable, ordered command table.
///
/// # Examples
///
/// ```
/// use slackernetes_core::{CommandTable, Handler};
///
/// let table = CommandTable::builder()
///     .register(r"(?:get|list) pods?$", Handler::ListAllPods, "List all pods")?
///     .register(r"pods", Handler::ListPods, "Shadowed by the entry above")?
///     .build();
///
/// let hit = table.find("<@U1> get pods").unwrap();
/// assert_eq!(hit.handler(), Handler::ListAllPods);
/// assert!(table.find("nothing here").is_none());
/// # Ok::<(), slackernetes_core::CoreError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    entries: Vec<CommandEntry>,
}

impl CommandTable {
    /// Starts building a table.
    pub fn builder() -> CommandTableBuilder {
        CommandTableBuilder::default()
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first entry whose pattern matches anywhere in `text`.
    pub fn find(&self, text: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.pattern.is_match(text))
    }
}

/// Builder that preserves registration order.
#[derive(Debug, Default)]
pub struct CommandTableBuilder {
    entries: Vec<CommandEntry>,
}

impl CommandTableBuilder {
    /// Appends an entry after every entry registered so far.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPattern` if `pattern` does not compile.
    pub fn register(
        mut self,
        pattern: &str,
        handler: Handler,
        description: &'static str,
    ) -> Result<Self, CoreError> {
        let pattern = Regex::new(pattern).map_err(|source| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.entries.push(CommandEntry {
            pattern,
            handler,
            description,
        });
        Ok(self)
    }

    /// Finishes the table.
    pub fn build(self) -> CommandTable {
        CommandTable {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlapping() -> CommandTable {
        CommandTable::builder()
            .register("pods", Handler::ListAllPods, "first")
            .expect("register")
            .register(r"pods in namespace (\S+)", Handler::ListPods, "second")
            .expect("register")
            .build()
    }

    #[test]
    fn test_should_preserve_registration_order() {
        let table = overlapping();
        let handlers: Vec<_> = table.entries().iter().map(CommandEntry::handler).collect();
        assert_eq!(handlers, vec![Handler::ListAllPods, Handler::ListPods]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_should_pick_earliest_registered_match() {
        let table = overlapping();
        let hit = table.find("list pods in namespace prod").expect("match");
        assert_eq!(hit.handler(), Handler::ListAllPods);
        assert_eq!(hit.description(), "first");
    }

    #[test]
    fn test_should_pick_later_entry_when_earlier_does_not_match() {
        let table = CommandTable::builder()
            .register("^help$", Handler::ShowHelp, "help")
            .expect("register")
            .register("help", Handler::Unsupported, "anywhere")
            .expect("register")
            .build();
        let hit = table.find("please help").expect("match");
        assert_eq!(hit.handler(), Handler::Unsupported);
    }

    #[test]
    fn test_should_match_case_sensitively() {
        let table = overlapping();
        assert!(table.find("list PODS").is_none());
    }

    #[test]
    fn test_should_reject_invalid_pattern() {
        let err = CommandTable::builder()
            .register("(broken", Handler::ShowHelp, "bad")
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidPattern { .. }));
    }

    #[test]
    fn test_should_start_empty() {
        let table = CommandTable::builder().build();
        assert!(table.is_empty());
        assert!(table.find("anything").is_none());
    }

    #[test]
    fn test_should_give_every_handler_a_distinct_name() {
        let all = [
            Handler::ShowHelp,
            Handler::ListImages,
            Handler::ListPods,
            Handler::ListAllPods,
            Handler::PodLogs,
            Handler::PreviousPodLogs,
            Handler::ListNamespaces,
            Handler::DescribePod,
            Handler::Unsupported,
        ];
        let names: std::collections::HashSet<_> = all.iter().map(|h| h.name()).collect();
        assert_eq!(names.len(), all.len());
    }
}
