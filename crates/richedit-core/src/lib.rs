#![warn(missing_docs)]
//! Richedit Core - Headless Rich-Text Editing Engine
//!
//! # Overview
//!
//! `richedit-core` is the engine behind a WYSIWYG document editor. It owns an HTML-like
//! content tree and implements everything that happens *to* that tree: inline and block
//! formatting, snapshot-based undo/redo, search with highlighting and replace, and table
//! editing with drag/resize interaction. It does not render; the host shows the markup and
//! forwards user input as commands.
//!
//! # Core Features
//!
//! - **Content Model**: arena-allocated node tree with a forgiving parser and serializer
//! - **Selection Codec**: live ranges saved as character offsets that survive content rebuilds
//! - **Snapshot History**: full-content snapshots, truncate-on-branch, suppressed during replay
//! - **Search**: literal, case-sensitive highlighting with wrap-around navigation
//! - **Tables**: activation, row/column editing, alignment modes, drag and resize
//! - **Notifications**: subscriber callbacks, version tracking, one-way format observer
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Command Interface & Notifications          │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Editor session (deferred queue)            │  ← Orchestration
//! ├─────────────────────────────────────────────┤
//! │  History · Search · Tables · Formatting     │  ← Features
//! ├─────────────────────────────────────────────┤
//! │  Selection codec                            │  ← Positions
//! ├─────────────────────────────────────────────┤
//! │  Document · DOM arena · HTML codec          │  ← Content
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use richedit_core::{Command, Editor, FormatCommand, InlineStyle, SelectionCommand};
//!
//! let mut editor = Editor::new();
//! editor.settle();
//!
//! editor.type_text("Hello world");
//! editor
//!     .execute(Command::Selection(SelectionCommand::Set { start: 0, end: 5 }))
//!     .unwrap();
//! editor
//!     .execute(Command::Format(FormatCommand::Toggle(InlineStyle::Bold)))
//!     .unwrap();
//!
//! assert_eq!(editor.content(), "<div><b>Hello</b> world</div>");
//!
//! assert!(editor.undo());
//! editor.settle();
//! assert_eq!(editor.content(), "<div>Hello world</div>");
//! ```
//!
//! # Module Description
//!
//! - [`dom`] - Node arena with generation-checked ids
//! - [`html`] - Markup parser and serializer
//! - [`document`] - Content normalization, word counts, plain text
//! - [`selection`] - Live ranges and logical (offset) selections
//! - [`history`] - Snapshot undo/redo
//! - [`search`] - Highlighting and replace
//! - [`table`] - Table controller
//! - [`formatting`] - Editing primitives
//! - [`editor`] - The editing session
//! - [`commands`] - Unified command interface
//! - [`state`] - Notifications and state snapshots
//! - [`config`] - YAML-loadable configuration

pub mod commands;
pub mod config;
pub mod document;
pub mod dom;
pub mod editor;
pub mod formatting;
pub mod history;
pub mod html;
pub mod search;
pub mod selection;
pub mod state;
pub mod table;

pub use commands::{
    BlockCommand, ClipboardCommand, Command, CommandError, CommandResult, DocumentCommand,
    FormatCommand, HistoryCommand, InsertCommand, SearchCommand, SelectionCommand, SpacingScope,
    TableCommand, ViewCommand,
};
pub use config::{ConfigError, EditorConfig};
pub use document::{Document, WordCount};
pub use dom::{Dom, NodeId};
pub use editor::{Deferred, Editor};
pub use formatting::{Alignment, FormatState, InlineStyle, ListKind};
pub use history::{History, HistoryEntry, HistoryMode};
pub use search::{HighlightStyle, SearchMatch, SearchState};
pub use selection::{Boundary, LogicalSelection, Range};
pub use state::{
    DocumentState, EditorState, HistoryState, Notification, NotificationCallback, SearchStatus,
    TableState,
};
pub use table::{
    ColumnPosition, Interaction, Point, PointerEffect, RowPosition, Size, TableAlignment,
    TableController,
};
