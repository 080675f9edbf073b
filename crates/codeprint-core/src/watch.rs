//! Change detection for watch mode.
//!
//! Only project manifests trigger a rebuild. A [`Snapshot`] records their
//! modification times between polls and the [`Debouncer`] holds a rebuild
//! back until changes stop arriving.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

use tracing::warn;

use crate::project::is_project_manifest;

/// Returns `true` if a change to the relative path `rel` should trigger a
/// rebuild.
#[must_use]
pub fn is_trigger(rel: &str) -> bool {
    let name = rel.rsplit('/').next().unwrap_or(rel);
    is_project_manifest(name)
}

/// Modification times of the trigger files in one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    modified: BTreeMap<String, SystemTime>,
}

impl Snapshot {
    /// Records the trigger files among `files`, which are relative to
    /// `root`. Files whose metadata cannot be read are left out.
    #[must_use]
    pub fn capture(root: &Path, files: &[String]) -> Self {
        let modified = files
            .iter()
            .filter(|rel| is_trigger(rel))
            .filter_map(|rel| {
                match std::fs::metadata(root.join(rel)).and_then(|m| m.modified()) {
                    Ok(time) => Some((rel.clone(), time)),
                    Err(e) => {
                        warn!(file = rel.as_str(), error = %e, "cannot stat trigger file");
                        None
                    }
                }
            })
            .collect();
        Self { modified }
    }

    /// Number of tracked trigger files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modified.len()
    }

    /// Returns `true` if no trigger file is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty()
    }

    /// Trigger files added, removed or modified in `newer`, sorted.
    #[must_use]
    pub fn changes(&self, newer: &Self) -> Vec<String> {
        let mut changed: Vec<String> = newer
            .modified
            .iter()
            .filter(|(file, time)| self.modified.get(*file) != Some(*time))
            .map(|(file, _)| file.clone())
            .chain(
                self.modified
                    .keys()
                    .filter(|file| !newer.modified.contains_key(*file))
                    .cloned(),
            )
            .collect();
        changed.sort();
        changed
    }
}

/// Collapses a burst of changes into one rebuild.
///
/// A rebuild is due once `delay` has passed since the latest recorded
/// change; each new change restarts the wait.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_change: Option<Instant>,
}

impl Debouncer {
    /// Creates a debouncer with no pending change.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_change: None,
        }
    }

    /// Records a change observed at `now`.
    pub fn record(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    /// Returns `true` exactly once per quiet period: when a change is
    /// pending and `delay` has elapsed since it was recorded.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_change {
            Some(at) if now.saturating_duration_since(at) >= self.delay => {
                self.last_change = None;
                true
            }
            _ => false,
        }
    }
}
