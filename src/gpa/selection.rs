use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user's pick for one subject: a level index and a score index.
///
/// Indices are signed because they come straight from user input; the engine
/// clamps anything outside the valid range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub level_idx: i64,
    #[serde(default)]
    pub score_idx: i64,
}

impl Selection {
    pub fn new(level_idx: i64, score_idx: i64) -> Self {
        Self {
            level_idx,
            score_idx,
        }
    }
}

/// Clamp a user-supplied index into `0..len`. `len` must be non-zero.
pub(crate) fn clamp_index(idx: i64, len: usize) -> (usize, bool) {
    let max = len.saturating_sub(1);
    if idx < 0 {
        (0, true)
    } else if idx as u64 > max as u64 {
        (max, true)
    } else {
        (idx as usize, false)
    }
}

/// Per-subject selections keyed by subject name.
///
/// Keys are subject names rather than row positions, so a selection stays
/// attached to its subject when the active list changes order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SelectionMap {
    entries: HashMap<String, Selection>,
}

impl SelectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subject: &str) -> Option<&Selection> {
        self.entries.get(subject)
    }

    /// Selection for `subject`, or the first level and first score if none was made
    pub fn selection_for(&self, subject: &str) -> Selection {
        self.entries.get(subject).copied().unwrap_or_default()
    }

    pub fn set(&mut self, subject: &str, selection: Selection) {
        self.entries.insert(subject.to_string(), selection);
    }

    pub fn set_level(&mut self, subject: &str, level_idx: i64) {
        self.entries.entry(subject.to_string()).or_default().level_idx = level_idx;
    }

    pub fn set_score(&mut self, subject: &str, score_idx: i64) {
        self.entries.entry(subject.to_string()).or_default().score_idx = score_idx;
    }

    pub fn remove(&mut self, subject: &str) -> Option<Selection> {
        self.entries.remove(subject)
    }

    /// Drop every selection, putting all subjects back on their first level and score
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Selection)> for SelectionMap {
    fn from_iter<I: IntoIterator<Item = (String, Selection)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
