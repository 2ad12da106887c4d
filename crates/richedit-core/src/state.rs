//! Editor State Interface
//!
//! Notifications pushed to the host and immutable snapshots it can query.
//!
//! # Overview
//!
//! - **Notifications**: the host subscribes with [`Editor::subscribe`](crate::Editor::subscribe)
//!   and receives every [`Notification`] in emission order.
//! - **Version Tracking**: each content change bumps a version number, so hosts can cheaply
//!   tell whether anything changed since they last looked.
//! - **Format observer**: the formatting state at the caret is only pushed when it differs from
//!   what was last pushed, so toolbar reflection stays one-way and quiet.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use richedit_core::{Editor, Notification};
//!
//! let mut editor = Editor::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! editor.subscribe(move |n| sink.lock().unwrap().push(n.clone()));
//!
//! editor.type_text("hi");
//! assert!(seen.lock().unwrap().contains(&Notification::ContentChanged));
//! assert_eq!(editor.document_state().version, 1);
//! ```

use crate::document::WordCount;
use crate::dom::NodeId;
use crate::formatting::FormatState;
use crate::selection::LogicalSelection;
use crate::table::{Interaction, TableAlignment};

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Document content changed.
    ContentChanged,
    /// Formatting at the caret changed.
    SelectionStateChanged(FormatState),
    /// A table became active (show table tools).
    TableActivated,
    /// No table is active any more (hide table tools).
    TablesDeactivated,
    /// The active table was deleted.
    TableDeleted,
    /// The host should scroll this node into view (current search match).
    ScrollIntoView(NodeId),
    /// Short human-readable status (for a status bar).
    Status(String),
}

/// Notification callback type.
pub type NotificationCallback = Box<dyn FnMut(&Notification) + Send>;

/// Document state
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState {
    /// Characters in the flattened text content.
    pub char_count: usize,
    /// Visible-text word and character counts.
    pub word_count: WordCount,
    /// Whether the document changed since the last save mark.
    pub is_modified: bool,
    /// Incremented on every content change.
    pub version: u64,
    /// Whether the root is right-to-left.
    pub rtl: bool,
}

/// Undo/redo state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryState {
    /// Can undo.
    pub can_undo: bool,
    /// Can redo.
    pub can_redo: bool,
    /// Stored snapshots.
    pub entries: usize,
    /// Current snapshot.
    pub index: Option<usize>,
    /// Whether a restore is in flight.
    pub replaying: bool,
}

/// Search state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStatus {
    /// Active term (empty when idle).
    pub term: String,
    /// Number of highlighted matches.
    pub match_count: usize,
    /// Current match index.
    pub current: Option<usize>,
}

/// Table state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableState {
    /// Active table.
    pub active: Option<NodeId>,
    /// Alignment mode of the active table.
    pub alignment: Option<TableAlignment>,
    /// Pointer interaction in progress.
    pub interaction: Interaction,
}

/// Complete editor state snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    /// Document state.
    pub document: DocumentState,
    /// Current selection in logical form.
    pub selection: Option<LogicalSelection>,
    /// Formatting at the caret.
    pub format: FormatState,
    /// Undo/redo state.
    pub history: HistoryState,
    /// Search state.
    pub search: SearchStatus,
    /// Table state.
    pub table: TableState,
    /// View zoom factor.
    pub zoom: f64,
}

/// Subscriber registry plus version and format-observer bookkeeping.
#[derive(Default)]
pub(crate) struct Notifier {
    callbacks: Vec<NotificationCallback>,
    version: u64,
    is_modified: bool,
    last_format: Option<FormatState>,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("callbacks", &self.callbacks.len())
            .field("version", &self.version)
            .field("is_modified", &self.is_modified)
            .finish()
    }
}

impl Notifier {
    pub(crate) fn subscribe(&mut self, callback: NotificationCallback) {
        self.callbacks.push(callback);
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub(crate) fn set_modified(&mut self, modified: bool) {
        self.is_modified = modified;
    }

    /// Deliver a notification; content changes also bump the version.
    pub(crate) fn emit(&mut self, notification: Notification) {
        if notification == Notification::ContentChanged {
            self.version += 1;
            self.is_modified = true;
        }
        for callback in &mut self.callbacks {
            callback(&notification);
        }
    }

    /// Push `state` only if it differs from the last pushed state.
    pub(crate) fn observe_format(&mut self, state: FormatState) -> bool {
        if self.last_format == Some(state) {
            return false;
        }
        self.last_format = Some(state);
        self.emit(Notification::SelectionStateChanged(state));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_format_pushed_only_on_change() {
        let mut notifier = Notifier::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        notifier.subscribe(Box::new(move |n| sink.lock().unwrap().push(n.clone())));

        let bold = FormatState {
            bold: true,
            ..FormatState::default()
        };
        assert!(notifier.observe_format(FormatState::default()));
        assert!(!notifier.observe_format(FormatState::default()));
        assert!(notifier.observe_format(bold));
        assert_eq!(log.lock().unwrap().len(), 2);
        assert_eq!(notifier.version(), 0);
    }

    #[test]
    fn test_content_change_bumps_version() {
        let mut notifier = Notifier::default();
        notifier.emit(Notification::ContentChanged);
        notifier.emit(Notification::Status("x".into()));
        assert_eq!(notifier.version(), 1);
        assert!(notifier.is_modified());
    }
}
