//! History Manager.
//!
//! Undo/redo over full-content snapshots. Each [`HistoryEntry`] stores the serialized markup and
//! the logical selection at the time it was taken; navigating the history restores them
//! verbatim. Recording after stepping back truncates the redo branch.
//!
//! While a snapshot is being restored the manager is in [`HistoryMode::Replaying`] and
//! [`History::record`] is a no-op, so the mutations produced by the restore itself never turn
//! into new entries. The [`Editor`](crate::Editor) leaves replay mode from a deferred step after
//! the content write.

use std::time::SystemTime;

use tracing::debug;

use crate::selection::LogicalSelection;

/// Default cap on stored snapshots.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// One snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Serialized document markup.
    pub content: String,
    /// Selection at snapshot time, if there was one.
    pub selection: Option<LogicalSelection>,
    /// Wall-clock time the snapshot was taken.
    pub timestamp: SystemTime,
}

/// Whether a snapshot restore is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// Normal editing; records are accepted.
    #[default]
    Idle,
    /// A restore is in progress; records are ignored.
    Replaying,
}

/// Linear snapshot history with a movable cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Current entry; `None` only while empty.
    index: Option<usize>,
    mode: HistoryMode,
    max_entries: usize,
    /// Entry index matching the last save. `None` when that entry was dropped or truncated.
    clean_index: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl History {
    /// Create an empty history holding at most `max_entries` snapshots (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: None,
            mode: HistoryMode::Idle,
            max_entries: max_entries.max(1),
            clean_index: None,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    /// Returns `true` while a restore is in progress.
    pub fn is_replaying(&self) -> bool {
        self.mode == HistoryMode::Replaying
    }

    /// Leave replay mode.
    pub fn end_replay(&mut self) {
        self.mode = HistoryMode::Idle;
    }

    /// Append a snapshot, truncating any redo branch.
    ///
    /// Returns `false` (and stores nothing) while replaying or when `content` equals the
    /// current entry's content.
    pub fn record(&mut self, content: String, selection: Option<LogicalSelection>) -> bool {
        if self.is_replaying() {
            debug!("history record skipped during replay");
            return false;
        }
        if self.current().is_some_and(|entry| entry.content == content) {
            debug!("history record skipped, content unchanged");
            return false;
        }

        if let Some(index) = self.index
            && index + 1 < self.entries.len()
        {
            self.entries.truncate(index + 1);
            if let Some(clean) = self.clean_index
                && clean > index
            {
                self.clean_index = None;
            }
        }

        self.entries.push(HistoryEntry {
            content,
            selection,
            timestamp: SystemTime::now(),
        });

        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
            self.clean_index = self.clean_index.and_then(|c| c.checked_sub(1));
        }

        self.index = Some(self.entries.len() - 1);
        debug!(
            entries = self.entries.len(),
            index = self.entries.len() - 1,
            "history recorded"
        );
        true
    }

    /// Step back one entry and enter replay mode. Returns the entry to restore.
    pub fn step_back(&mut self) -> Option<&HistoryEntry> {
        let index = self.index.filter(|&i| i > 0)? - 1;
        self.index = Some(index);
        self.mode = HistoryMode::Replaying;
        debug!(index, entries = self.entries.len(), "history undo");
        self.entries.get(index)
    }

    /// Step forward one entry and enter replay mode. Returns the entry to restore.
    pub fn step_forward(&mut self) -> Option<&HistoryEntry> {
        let index = self.index.filter(|&i| i + 1 < self.entries.len())? + 1;
        self.index = Some(index);
        self.mode = HistoryMode::Replaying;
        debug!(index, entries = self.entries.len(), "history redo");
        self.entries.get(index)
    }

    /// Returns `true` if there is an entry before the current one.
    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    /// Returns `true` if there is an entry after the current one.
    pub fn can_redo(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.entries.len())
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// All stored snapshots, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The entry the cursor points at.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index?)
    }

    /// Remember the current entry as the saved state.
    pub fn mark_clean(&mut self) {
        self.clean_index = self.index;
    }

    /// Returns `true` if the cursor is on the saved state.
    pub fn is_clean(&self) -> bool {
        self.clean_index.is_some() && self.clean_index == self.index
    }
}
