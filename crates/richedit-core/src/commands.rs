//! Command Interface Layer
//!
//! A single enum-based entry point over the [`Editor`] session, for hosts that bridge
//! toolbar actions, menu items or script calls into the engine.
//!
//! # Overview
//!
//! - **Format**: inline toggles, font family/size, text and background colour
//! - **Block**: alignment, lists, indentation, paragraph and line spacing
//! - **Insert**: typed text, paragraph breaks, tables, images, date stamps
//! - **Document / Search / History / Table / View / Selection**: the remaining surface
//!
//! Parameter validation happens here and is reported as [`CommandError`]. Commands that are
//! valid but change nothing return [`CommandResult::NoOp`] and push a status notification.
//!
//! # Example
//!
//! ```rust
//! use richedit_core::{Command, CommandResult, DocumentCommand, Editor, InsertCommand};
//!
//! let mut editor = Editor::new();
//! editor.settle();
//!
//! editor
//!     .execute_batch(vec![
//!         Command::Insert(InsertCommand::Text { text: "Hello world".to_string() }),
//!         Command::Insert(InsertCommand::Table { rows: 2, cols: 2 }),
//!     ])
//!     .unwrap();
//!
//! let count = editor.execute(Command::Document(DocumentCommand::WordCount)).unwrap();
//! assert!(matches!(count, CommandResult::WordCount(c) if c.words >= 2));
//! ```

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::Editor;
use crate::document::WordCount;
use crate::formatting::{Alignment, InlineStyle, ListKind};
use crate::state::Notification;
use crate::table::{ColumnPosition, RowPosition, TableAlignment};

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex colour pattern")
});

/// Which blocks a spacing command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpacingScope {
    /// The block holding the caret.
    #[default]
    Current,
    /// Every paragraph block in the document.
    All,
}

/// Inline formatting commands
#[derive(Debug, Clone, PartialEq)]
pub enum FormatCommand {
    /// Toggle bold/italic/underline/strikethrough/superscript/subscript
    Toggle(InlineStyle),
    /// Apply a font family
    FontFamily {
        /// Family name, e.g. `Georgia`.
        family: String,
    },
    /// Apply a legacy font size
    FontSize {
        /// Size in the 1–7 scale.
        size: u8,
    },
    /// Colour the selected text
    TextColor {
        /// Hex colour (`#rgb` or `#rrggbb`).
        color: String,
    },
    /// Highlight the selected text
    BackgroundColor {
        /// Hex colour (`#rgb` or `#rrggbb`).
        color: String,
    },
}

/// Block formatting commands
#[derive(Debug, Clone, PartialEq)]
pub enum BlockCommand {
    /// Set `text-align`
    Align(Alignment),
    /// Toggle list wrapping
    List(ListKind),
    /// Increase indentation
    Indent,
    /// Decrease indentation
    Outdent,
    /// Set `margin-bottom`
    ParagraphSpacing {
        /// Spacing in px.
        pixels: f64,
        /// Target blocks.
        scope: SpacingScope,
    },
    /// Set `line-height`
    LineSpacing {
        /// Unitless multiplier.
        value: f64,
        /// Target blocks.
        scope: SpacingScope,
    },
}

/// Insertion commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertCommand {
    /// Type text at the selection
    Text {
        /// Text to insert.
        text: String,
    },
    /// Break the paragraph (Enter)
    Paragraph,
    /// Delete backwards (Backspace)
    DeleteBackward,
    /// Insert and activate a table
    Table {
        /// Row count (≥ 1).
        rows: usize,
        /// Column count (≥ 1).
        cols: usize,
    },
    /// Insert an image
    Image {
        /// Image URL or data URI.
        url: String,
    },
    /// Insert a preformatted date/time string
    DateTime {
        /// Literal text to insert.
        text: String,
    },
}

/// Whole-document commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentCommand {
    /// Serialize the document
    GetContent,
    /// Replace the document
    SetContent {
        /// New markup.
        markup: String,
    },
    /// Count words and characters
    WordCount,
    /// Visible text
    PlainText,
}

/// Search and replace commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    /// Highlight every occurrence
    Highlight {
        /// Literal search term.
        term: String,
    },
    /// Select the next match
    Next,
    /// Select the previous match
    Previous,
    /// Remove highlighting
    Clear,
    /// Replace the current match
    ReplaceCurrent {
        /// Replacement text.
        replacement: String,
    },
    /// Replace every occurrence
    ReplaceAll {
        /// Literal search term.
        term: String,
        /// Replacement text.
        replacement: String,
    },
}

/// History commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommand {
    /// Step back
    Undo,
    /// Step forward
    Redo,
    /// Take a snapshot now
    Record,
}

/// Commands acting on the active table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCommand {
    /// Insert a row next to the selected cell
    InsertRow(RowPosition),
    /// Insert a column next to the selected cell
    InsertColumn(ColumnPosition),
    /// Append a row
    AppendRow,
    /// Append a column
    AppendColumn,
    /// Delete the selected (or last) row
    DeleteRow,
    /// Delete the selected (or last) column
    DeleteColumn,
    /// Delete the table
    Delete,
    /// Change the layout mode
    SetAlignment(TableAlignment),
    /// Deactivate all tables
    Deactivate,
}

/// View commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    /// Set the zoom factor
    SetZoom {
        /// Scale (> 0).
        scale: f64,
    },
    /// Toggle right-to-left layout
    ToggleRtl,
}

/// Selection commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCommand {
    /// Select a character span of the flattened text
    Set {
        /// Start character offset.
        start: usize,
        /// End character offset.
        end: usize,
    },
    /// Select everything
    SelectAll,
    /// Drop the selection
    Clear,
}

/// Clipboard commands. The host owns the system clipboard; the engine only produces and
/// consumes text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardCommand {
    /// Return the selected text
    Copy,
    /// Return the selected text and delete it
    Cut,
    /// Insert text at the selection
    Paste {
        /// Text to insert; line breaks start new paragraphs.
        text: String,
    },
}

/// Unified command enum
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Inline formatting
    Format(FormatCommand),
    /// Block formatting
    Block(BlockCommand),
    /// Insertions and basic editing
    Insert(InsertCommand),
    /// Whole-document operations
    Document(DocumentCommand),
    /// Search and replace
    Search(SearchCommand),
    /// Undo/redo
    History(HistoryCommand),
    /// Active-table operations
    Table(TableCommand),
    /// View settings
    View(ViewCommand),
    /// Selection
    Selection(SelectionCommand),
    /// Copy, cut and paste
    Clipboard(ClipboardCommand),
}

/// Command execution result
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Success, no return value
    Success,
    /// Valid command that changed nothing
    NoOp,
    /// Ignored inside an echo-suppression scope
    Suppressed,
    /// Success, returns a flag
    Bool(bool),
    /// Success, returns a count or index
    Count(usize),
    /// Success, returns text
    Text(String),
    /// Success, returns word and character counts
    WordCount(WordCount),
}

/// Command error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// A table needs at least one row and one column
    #[error("invalid table size: {rows}x{cols}")]
    InvalidTableSize {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },
    /// Font sizes are 1–7
    #[error("invalid font size: {0} (expected 1-7)")]
    InvalidFontSize(u8),
    /// Colours are `#rgb` or `#rrggbb`
    #[error("invalid colour: {0:?}")]
    InvalidColor(String),
    /// Zoom must be finite and positive
    #[error("invalid zoom factor: {0}")]
    InvalidZoom(f64),
    /// Spacing must be finite and non-negative
    #[error("invalid spacing: {0}")]
    InvalidSpacing(f64),
    /// Table command issued with no active table
    #[error("no active table")]
    NoActiveTable,
}

/// Check that `color` is a hex colour.
pub fn validate_color(color: &str) -> Result<(), CommandError> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(CommandError::InvalidColor(color.to_string()))
    }
}

impl Editor {
    /// Execute one command.
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        debug!(?command, "execute");
        match command {
            Command::Format(cmd) => self.execute_format(cmd),
            Command::Block(cmd) => self.execute_block(cmd),
            Command::Insert(cmd) => self.execute_insert(cmd),
            Command::Document(cmd) => Ok(self.execute_document(cmd)),
            Command::Search(cmd) => Ok(self.execute_search(cmd)),
            Command::History(cmd) => Ok(self.execute_history(cmd)),
            Command::Table(cmd) => self.execute_table(cmd),
            Command::View(cmd) => self.execute_view(cmd),
            Command::Selection(cmd) => Ok(self.execute_selection(cmd)),
            Command::Clipboard(cmd) => Ok(self.execute_clipboard(cmd)),
        }
    }

    /// Execute commands in order, stopping at the first error.
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<Vec<CommandResult>, CommandError> {
        let mut results = Vec::with_capacity(commands.len());

        for command in commands {
            let result = self.execute(command)?;
            results.push(result);
        }

        Ok(results)
    }

    fn outcome(&mut self, changed: bool, status: &str) -> CommandResult {
        if changed {
            CommandResult::Success
        } else {
            self.notifier
                .emit(Notification::Status(status.to_string()));
            CommandResult::NoOp
        }
    }

    fn execute_format(&mut self, cmd: FormatCommand) -> Result<CommandResult, CommandError> {
        let changed = match cmd {
            FormatCommand::Toggle(style) => {
                if self.is_echo_suppressed() {
                    return Ok(CommandResult::Suppressed);
                }
                self.toggle_style(style)
            }
            FormatCommand::FontFamily { family } => {
                if family.trim().is_empty() {
                    false
                } else {
                    self.set_font_family(&family)
                }
            }
            FormatCommand::FontSize { size } => self.set_font_size(size)?,
            FormatCommand::TextColor { color } => self.set_text_color(&color)?,
            FormatCommand::BackgroundColor { color } => self.set_background_color(&color)?,
        };
        Ok(self.outcome(changed, "Nothing selected"))
    }

    fn execute_block(&mut self, cmd: BlockCommand) -> Result<CommandResult, CommandError> {
        let changed = match cmd {
            BlockCommand::Align(alignment) => self.set_alignment(alignment),
            BlockCommand::List(kind) => self.toggle_list(kind),
            BlockCommand::Indent => self.indent(),
            BlockCommand::Outdent => self.outdent(),
            BlockCommand::ParagraphSpacing { pixels, scope } => {
                self.set_paragraph_spacing(pixels, scope)?
            }
            BlockCommand::LineSpacing { value, scope } => self.set_line_spacing(value, scope)?,
        };
        Ok(self.outcome(changed, "No block to format"))
    }

    fn execute_insert(&mut self, cmd: InsertCommand) -> Result<CommandResult, CommandError> {
        match cmd {
            InsertCommand::Text { text } => {
                if text.is_empty() {
                    return Ok(CommandResult::NoOp);
                }
                self.type_text(&text);
            }
            InsertCommand::Paragraph => self.insert_paragraph(),
            InsertCommand::DeleteBackward => self.delete_backward(),
            InsertCommand::Table { rows, cols } => {
                self.insert_table(rows, cols)?;
            }
            InsertCommand::Image { url } => {
                let inserted = self.insert_image(&url);
                return Ok(self.outcome(inserted, "No image URL"));
            }
            InsertCommand::DateTime { text } => {
                let inserted = self.insert_date_time(&text);
                return Ok(self.outcome(inserted, "Nothing to insert"));
            }
        }
        Ok(CommandResult::Success)
    }

    fn execute_document(&mut self, cmd: DocumentCommand) -> CommandResult {
        match cmd {
            DocumentCommand::GetContent => CommandResult::Text(self.content()),
            DocumentCommand::SetContent { markup } => {
                self.set_content(&markup);
                CommandResult::Success
            }
            DocumentCommand::WordCount => CommandResult::WordCount(self.word_count()),
            DocumentCommand::PlainText => CommandResult::Text(self.plain_text()),
        }
    }

    fn execute_search(&mut self, cmd: SearchCommand) -> CommandResult {
        match cmd {
            SearchCommand::Highlight { term } => {
                let count = self.search(&term);
                self.notifier
                    .emit(Notification::Status(format!("{count} matches")));
                CommandResult::Count(count)
            }
            SearchCommand::Next => match self.find_next() {
                Some(index) => CommandResult::Count(index),
                None => self.outcome(false, "No matches"),
            },
            SearchCommand::Previous => match self.find_previous() {
                Some(index) => CommandResult::Count(index),
                None => self.outcome(false, "No matches"),
            },
            SearchCommand::Clear => {
                self.clear_search();
                CommandResult::Success
            }
            SearchCommand::ReplaceCurrent { replacement } => {
                let replaced = self.replace_current(&replacement);
                self.outcome(replaced, "No current match")
            }
            SearchCommand::ReplaceAll { term, replacement } => {
                let count = self.replace_all(&term, &replacement);
                self.notifier
                    .emit(Notification::Status(format!("Replaced {count} occurrences")));
                CommandResult::Count(count)
            }
        }
    }

    fn execute_history(&mut self, cmd: HistoryCommand) -> CommandResult {
        let changed = match cmd {
            HistoryCommand::Undo => self.undo(),
            HistoryCommand::Redo => self.redo(),
            HistoryCommand::Record => return CommandResult::Bool(self.record()),
        };
        if changed {
            CommandResult::Success
        } else {
            CommandResult::NoOp
        }
    }

    fn execute_table(&mut self, cmd: TableCommand) -> Result<CommandResult, CommandError> {
        let changed = match cmd {
            TableCommand::Deactivate => return Ok(CommandResult::Bool(self.deactivate_tables())),
            _ if self.active_table().is_none() => return Err(CommandError::NoActiveTable),
            TableCommand::InsertRow(position) => self.insert_table_row(position),
            TableCommand::InsertColumn(position) => self.insert_table_column(position),
            TableCommand::AppendRow => self.append_table_row(),
            TableCommand::AppendColumn => self.append_table_column(),
            TableCommand::DeleteRow => self.delete_table_row(),
            TableCommand::DeleteColumn => self.delete_table_column(),
            TableCommand::Delete => self.delete_table(),
            TableCommand::SetAlignment(alignment) => self.set_table_alignment(alignment),
        };
        Ok(self.outcome(changed, "Table unchanged"))
    }

    fn execute_view(&mut self, cmd: ViewCommand) -> Result<CommandResult, CommandError> {
        match cmd {
            ViewCommand::SetZoom { scale } => {
                self.set_zoom(scale)?;
                Ok(CommandResult::Success)
            }
            ViewCommand::ToggleRtl => Ok(CommandResult::Bool(self.toggle_rtl())),
        }
    }

    fn execute_selection(&mut self, cmd: SelectionCommand) -> CommandResult {
        match cmd {
            SelectionCommand::Set { start, end } => self.set_selection(start, end),
            SelectionCommand::SelectAll => self.select_all(),
            SelectionCommand::Clear => self.clear_selection(),
        }
        CommandResult::Success
    }

    fn execute_clipboard(&mut self, cmd: ClipboardCommand) -> CommandResult {
        let copied = match cmd {
            ClipboardCommand::Copy => self.copy(),
            ClipboardCommand::Cut => self.cut(),
            ClipboardCommand::Paste { text } => {
                let pasted = self.paste(&text);
                return self.outcome(pasted, "Nothing to paste");
            }
        };
        match copied {
            Some(text) => CommandResult::Text(text),
            None => self.outcome(false, "Nothing selected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_validation() {
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("#A0b1C2").is_ok());
        assert_eq!(
            validate_color("red"),
            Err(CommandError::InvalidColor("red".to_string()))
        );
        assert!(validate_color("#12345").is_err());
    }

    #[test]
    fn test_invalid_parameters_are_errors() {
        let mut editor = Editor::new();
        assert_eq!(
            editor.execute(Command::Insert(InsertCommand::Table { rows: 0, cols: 2 })),
            Err(CommandError::InvalidTableSize { rows: 0, cols: 2 })
        );
        assert_eq!(
            editor.execute(Command::Format(FormatCommand::FontSize { size: 9 })),
            Err(CommandError::InvalidFontSize(9))
        );
        assert!(matches!(
            editor.execute(Command::View(ViewCommand::SetZoom { scale: 0.0 })),
            Err(CommandError::InvalidZoom(_))
        ));
        assert_eq!(
            editor.execute(Command::Table(TableCommand::DeleteRow)),
            Err(CommandError::NoActiveTable)
        );
    }

    #[test]
    fn test_toggle_suppressed_in_echo_scope() {
        let mut editor = Editor::new();
        editor.type_text("abc");
        editor.select_all();
        let before = editor.content();
        let result = editor.suppress_echo(|e| {
            e.execute(Command::Format(FormatCommand::Toggle(InlineStyle::Bold)))
        });
        assert_eq!(result, Ok(CommandResult::Suppressed));
        assert_eq!(editor.content(), before);
    }

    #[test]
    fn test_undo_on_fresh_editor_is_noop() {
        let mut editor = Editor::new();
        editor.settle();
        assert_eq!(
            editor.execute(Command::History(HistoryCommand::Undo)),
            Ok(CommandResult::NoOp)
        );
    }
}
