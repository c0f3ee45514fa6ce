//! # Pristine Log Cache
//!
//! Log blocks are registered once per run. Highlighting always reconciles
//! against the pristine copy and stores the outcome as that log's single
//! current annotation, replacing the previous one. Repeated highlighting
//! can therefore never compound earlier annotations.

use std::collections::HashMap;
use std::sync::Arc;

use rrmap_core::RunId;

use crate::reconcile::{reconcile_with, ReconcileOptions, Reconciliation};

/// The current annotation of one log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Displayed value the log was reconciled against.
    pub displayed: String,
    /// Reconciliation outcome.
    pub outcome: Reconciliation,
}

/// A log split around its highlighted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightedLog<'a> {
    /// Text before the token.
    pub before: &'a str,
    /// The token itself.
    pub matched: &'a str,
    /// Text after the token.
    pub after: &'a str,
}

#[derive(Debug, Clone)]
struct LogEntry {
    pristine: Arc<str>,
    annotation: Option<Annotation>,
}

/// Pristine log texts keyed by run, each with at most one annotation.
#[derive(Debug, Clone, Default)]
pub struct LogCache {
    options: ReconcileOptions,
    entries: HashMap<RunId, LogEntry>,
}

impl LogCache {
    /// Empty cache with default reconciliation options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty cache with explicit reconciliation options.
    pub fn with_options(options: ReconcileOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
        }
    }

    /// Register the pristine text of a run's log.
    ///
    /// Registering identical text again is a no-op and keeps the current
    /// annotation. Different text replaces the pristine copy and drops the
    /// annotation. Returns `true` if the stored text changed.
    pub fn insert(&mut self, run_id: RunId, text: impl Into<Arc<str>>) -> bool {
        let text = text.into();
        match self.entries.get_mut(&run_id) {
            Some(entry) if entry.pristine == text => false,
            Some(entry) => {
                tracing::debug!(run_id = %run_id, "log text replaced; annotation dropped");
                entry.pristine = text;
                entry.annotation = None;
                true
            }
            None => {
                self.entries.insert(
                    run_id,
                    LogEntry {
                        pristine: text,
                        annotation: None,
                    },
                );
                true
            }
        }
    }

    /// True if a log is registered for the run.
    pub fn contains(&self, run_id: &RunId) -> bool {
        self.entries.contains_key(run_id)
    }

    /// The pristine text of a run's log.
    pub fn pristine(&self, run_id: &RunId) -> Option<&str> {
        self.entries.get(run_id).map(|e| &*e.pristine)
    }

    /// Reconcile `displayed` against the run's pristine log and make the
    /// outcome its current annotation.
    ///
    /// Returns `None` if no log is registered for the run.
    pub fn highlight(&mut self, run_id: &RunId, displayed: &str) -> Option<&Annotation> {
        let options = self.options;
        let entry = self.entries.get_mut(run_id)?;
        let outcome = reconcile_with(displayed, &entry.pristine, options);
        if !outcome.is_match() {
            tracing::debug!(run_id = %run_id, displayed, ?outcome, "no log token for displayed value");
        }
        entry.annotation = Some(Annotation {
            displayed: displayed.to_string(),
            outcome,
        });
        entry.annotation.as_ref()
    }

    /// The run's current annotation.
    pub fn annotation(&self, run_id: &RunId) -> Option<&Annotation> {
        self.entries.get(run_id)?.annotation.as_ref()
    }

    /// The pristine log split around the currently highlighted token.
    pub fn highlighted(&self, run_id: &RunId) -> Option<HighlightedLog<'_>> {
        let entry = self.entries.get(run_id)?;
        let m = entry.annotation.as_ref()?.outcome.as_match()?;
        let text = &*entry.pristine;
        Some(HighlightedLog {
            before: text.get(..m.start)?,
            matched: text.get(m.start..m.end)?,
            after: text.get(m.end..)?,
        })
    }

    /// Drop the run's annotation, keeping its text.
    pub fn clear_annotation(&mut self, run_id: &RunId) {
        if let Some(entry) = self.entries.get_mut(run_id) {
            entry.annotation = None;
        }
    }

    /// Drop every annotation, keeping all texts.
    pub fn clear_all_annotations(&mut self) {
        for entry in self.entries.values_mut() {
            entry.annotation = None;
        }
    }

    /// Number of registered logs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no logs are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> RunId {
        RunId::new("run_1")
    }

    #[test]
    fn highlight_replaces_previous_annotation() {
        let mut cache = LogCache::new();
        cache.insert(run(), "b 0.1234 se 0.0567");
        let first = cache.highlight(&run(), "0.123").cloned().unwrap();
        assert_eq!(first.outcome.as_match().unwrap().text, "0.1234");

        let second = cache.highlight(&run(), "0.057").cloned().unwrap();
        assert_eq!(second.outcome.as_match().unwrap().text, "0.0567");
        assert_eq!(cache.annotation(&run()), Some(&second));
        assert_eq!(cache.pristine(&run()), Some("b 0.1234 se 0.0567"));
    }

    #[test]
    fn repeated_highlight_is_stable() {
        let mut cache = LogCache::new();
        cache.insert(run(), "x 3.14159 y 3.144");
        let a = cache.highlight(&run(), "3.14").cloned();
        let b = cache.highlight(&run(), "3.14").cloned();
        assert_eq!(a, b);
        let h = cache.highlighted(&run()).unwrap();
        assert_eq!((h.before, h.matched, h.after), ("x ", "3.14159", " y 3.144"));
    }

    #[test]
    fn unknown_run_has_nothing() {
        let mut cache = LogCache::new();
        assert!(cache.highlight(&run(), "1").is_none());
        assert!(cache.highlighted(&run()).is_none());
    }

    #[test]
    fn reinserting_same_text_keeps_annotation() {
        let mut cache = LogCache::new();
        assert!(cache.insert(run(), "a 1"));
        cache.highlight(&run(), "1");
        assert!(!cache.insert(run(), "a 1"));
        assert!(cache.annotation(&run()).is_some());
        assert!(cache.insert(run(), "a 2"));
        assert!(cache.annotation(&run()).is_none());
    }

    #[test]
    fn no_match_is_recorded_without_highlight() {
        let mut cache = LogCache::new();
        cache.insert(run(), "nothing numeric");
        let ann = cache.highlight(&run(), "4.2").unwrap();
        assert!(!ann.outcome.is_match());
        assert!(cache.highlighted(&run()).is_none());
    }

    #[test]
    fn clearing() {
        let mut cache = LogCache::new();
        cache.insert(run(), "7");
        cache.insert(RunId::new("run_2"), "8");
        cache.highlight(&run(), "7");
        cache.highlight(&RunId::new("run_2"), "8");
        cache.clear_annotation(&run());
        assert!(cache.annotation(&run()).is_none());
        assert!(cache.annotation(&RunId::new("run_2")).is_some());
        cache.clear_all_annotations();
        assert!(cache.annotation(&RunId::new("run_2")).is_none());
        assert_eq!(cache.len(), 2);
    }
}
