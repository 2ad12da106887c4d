//! The editing session.
//!
//! An [`Editor`] bundles one document with everything that belongs to it: the live selection,
//! history, search results, table controller, view settings, subscribers, and the queue of
//! deferred continuations. Independent editors never share state.
//!
//! # Deferred work
//!
//! Some steps must happen *after* the current mutation has settled: restoring a selection once
//! restored content is in place, leaving replay mode, taking a follow-up snapshot, re-running a
//! search, activating a freshly inserted table. These are queued as [`Deferred`] tasks and run,
//! in FIFO order, when the host calls [`Editor::tick`] from its event loop.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::commands::{CommandError, SpacingScope};
use crate::config::EditorConfig;
use crate::document::{Document, WordCount};
use crate::dom::NodeId;
use crate::formatting::{self, Alignment, FormatState, InlineStyle, ListKind};
use crate::history::{History, HistoryEntry};
use crate::search::{self, HighlightStyle, SearchState};
use crate::selection::{self, Boundary, LogicalSelection, Range};
use crate::state::{
    DocumentState, EditorState, HistoryState, Notification, Notifier, SearchStatus, TableState,
};
use crate::table::{
    ColumnPosition, Point, PointerEffect, RowPosition, Size, TableAlignment, TableController,
    table_markup,
};

/// A continuation queued for the next [`Editor::tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// Take a history snapshot.
    Record,
    /// Re-select a logical range.
    RestoreSelection(LogicalSelection),
    /// Leave history replay mode.
    EndReplay,
    /// Re-run a search for the term.
    Search(String),
    /// Activate a table if it is still in the document.
    ActivateTable(NodeId),
}

/// One headless rich-text editing session.
#[derive(Debug)]
pub struct Editor {
    pub(crate) document: Document,
    pub(crate) selection: Option<Range>,
    pub(crate) history: History,
    pub(crate) search: SearchState,
    pub(crate) tables: TableController,
    pub(crate) config: EditorConfig,
    pub(crate) highlight: HighlightStyle,
    pub(crate) zoom: f64,
    /// Styles toggled at a collapsed caret, applied to the next typed run.
    pub(crate) typing_styles: Vec<InlineStyle>,
    pub(crate) deferred: VecDeque<Deferred>,
    pub(crate) echo_depth: usize,
    pub(crate) pointer_changed: bool,
    pub(crate) notifier: Notifier,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create an editor over an empty document with the default configuration.
    ///
    /// The baseline history snapshot is taken on the first [`tick`](Self::tick).
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create an editor with a configuration.
    pub fn with_config(config: EditorConfig) -> Self {
        let mut editor = Self {
            document: Document::new(),
            selection: None,
            history: History::new(config.max_history_entries),
            search: SearchState::default(),
            tables: TableController::new(config.drag_threshold_px, &config.cell_placeholder),
            highlight: config.highlight_style(),
            zoom: config.initial_zoom,
            config,
            typing_styles: Vec::new(),
            deferred: VecDeque::new(),
            echo_depth: 0,
            pointer_changed: false,
            notifier: Notifier::default(),
        };
        editor.defer(Deferred::Record);
        editor
    }

    /// Session configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Register a notification callback.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.notifier.subscribe(Box::new(callback));
    }

    // ----- deferred queue -------------------------------------------------

    pub(crate) fn defer(&mut self, task: Deferred) {
        trace!(?task, "deferred");
        self.deferred.push_back(task);
    }

    /// Tasks waiting for the next tick.
    pub fn pending(&self) -> &VecDeque<Deferred> {
        &self.deferred
    }

    /// Run the tasks that were queued before this call. Returns how many ran.
    pub fn tick(&mut self) -> usize {
        let batch: Vec<Deferred> = self.deferred.drain(..).collect();
        let ran = batch.len();
        for task in batch {
            trace!(?task, "running deferred");
            match task {
                Deferred::Record => {
                    self.record();
                }
                Deferred::RestoreSelection(sel) => {
                    self.restore_selection(Some(&sel));
                }
                Deferred::EndReplay => self.history.end_replay(),
                Deferred::Search(term) => {
                    self.search(&term);
                }
                Deferred::ActivateTable(table) => {
                    if self.document.dom().is_attached(table) {
                        self.activate_table(table);
                    }
                }
            }
        }
        ran
    }

    /// Tick until the queue is empty. Returns the total number of tasks run.
    pub fn settle(&mut self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.tick();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }

    /// Open an echo-suppression scope: inline toggles issued through
    /// [`execute`](Self::execute) inside `f` are ignored.
    ///
    /// Hosts wrap their toolbar reflection in this so that updating a toggle button never
    /// feeds back into the document.
    pub fn suppress_echo<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.echo_depth += 1;
        let result = f(self);
        self.echo_depth -= 1;
        result
    }

    /// Returns `true` inside [`suppress_echo`](Self::suppress_echo).
    pub fn is_echo_suppressed(&self) -> bool {
        self.echo_depth > 0
    }

    // ----- content --------------------------------------------------------

    /// Serialized markup of the document.
    pub fn content(&self) -> String {
        self.document.content()
    }

    /// Replace the document with host markup (load a file, paste a whole document).
    ///
    /// Search state, the active table and the selection are dropped. No history snapshot is
    /// taken; a host that wants the loaded content as an undo point records it explicitly.
    /// The document counts as modified afterwards until [`mark_saved`](Self::mark_saved).
    pub fn set_content(&mut self, markup: &str) {
        self.document.set_content(markup);
        self.invalidate_nodes();
        debug!(len = markup.len(), "content replaced");
        self.notifier.emit(Notification::ContentChanged);
    }

    /// Visible-text word and character count.
    pub fn word_count(&self) -> WordCount {
        self.document.word_count()
    }

    /// Visible text of the document.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Flag the current state as saved.
    pub fn mark_saved(&mut self) {
        self.history.mark_clean();
        self.notifier.set_modified(false);
    }

    /// Forget everything that referenced nodes of the previous tree.
    fn invalidate_nodes(&mut self) {
        self.search.reset();
        self.selection = None;
        self.typing_styles.clear();
        if self.tables.reset() {
            self.notifier.emit(Notification::TablesDeactivated);
        }
    }

    // ----- selection ------------------------------------------------------

    /// The live selection.
    pub fn selection(&self) -> Option<Range> {
        self.selection
            .filter(|r| self.document.dom().is_attached(r.start.node))
    }

    /// The live selection in logical form.
    pub fn save_selection(&self) -> Option<LogicalSelection> {
        selection::save(
            self.document.dom(),
            self.document.root(),
            self.selection().as_ref(),
        )
    }

    /// Re-select a logical selection (clamped to the text). Returns `false` only for `None`.
    pub fn restore_selection(&mut self, saved: Option<&LogicalSelection>) -> bool {
        let Some(saved) = saved else {
            return false;
        };
        let range = selection::restore(self.document.dom(), self.document.root(), saved);
        self.set_range(range);
        true
    }

    /// Select the characters `[start, end)` of the flattened text.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let logical = LogicalSelection::span(start, end);
        self.restore_selection(Some(&logical));
    }

    /// Place a live range directly.
    pub fn set_range(&mut self, range: Range) {
        if !self.document.dom().is_attached(range.start.node)
            || !self.document.dom().is_attached(range.end.node)
        {
            return;
        }
        self.selection = Some(range);
        self.typing_styles.clear();
        self.sync_format();
    }

    /// Select the whole document.
    pub fn select_all(&mut self) {
        let len = self.document.text_content().chars().count();
        self.set_selection(0, len);
    }

    /// Drop the selection (the surface lost focus).
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.typing_styles.clear();
    }

    /// The selection, or a caret at the end of the document.
    pub(crate) fn live_range(&self) -> Range {
        self.selection().unwrap_or_else(|| {
            let len = self.document.text_content().chars().count();
            Range::collapsed(selection::position_at(
                self.document.dom(),
                self.document.root(),
                len,
            ))
        })
    }

    /// Formatting at the caret, including pending typing styles.
    pub fn format_state(&self) -> FormatState {
        let range = self.selection();
        let mut state =
            formatting::format_state(self.document.dom(), self.document.root(), range.as_ref());
        for &style in &self.typing_styles {
            state.set(style, !state.is_active(style));
        }
        state
    }

    pub(crate) fn sync_format(&mut self) {
        let state = self.format_state();
        self.notifier.observe_format(state);
    }

    // ----- history --------------------------------------------------------

    /// Snapshot content and selection now. Ignored (returns `false`) during replay.
    pub fn record(&mut self) -> bool {
        let content = self.document.content();
        let selection = self.save_selection();
        self.history.record(content, selection)
    }

    /// The history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Restore the previous snapshot. Returns `false` at the start of history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.step_back().cloned() else {
            self.notifier
                .emit(Notification::Status("Nothing to undo".to_string()));
            return false;
        };
        self.apply_snapshot(entry);
        true
    }

    /// Restore the next snapshot. Returns `false` at the end of history.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.step_forward().cloned() else {
            self.notifier
                .emit(Notification::Status("Nothing to redo".to_string()));
            return false;
        };
        self.apply_snapshot(entry);
        true
    }

    fn apply_snapshot(&mut self, entry: HistoryEntry) {
        self.document.set_markup(&entry.content);
        self.invalidate_nodes();
        if let Some(saved) = entry.selection {
            self.defer(Deferred::RestoreSelection(saved));
        }
        self.defer(Deferred::EndReplay);
        self.notifier.emit(Notification::ContentChanged);
    }

    /// The input path: a user edit landed, snapshot it and tell the host.
    pub(crate) fn commit_input(&mut self) {
        self.record();
        self.notifier.emit(Notification::ContentChanged);
        self.sync_format();
    }

    // ----- typing ---------------------------------------------------------

    /// Type text at the selection, replacing it.
    pub fn type_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.insert_text_silently(text);
        self.typing_styles.clear();
        self.commit_input();
    }

    fn insert_text_silently(&mut self, text: &str) {
        let range = self.live_range();
        let root = self.document.root();
        let caret = formatting::insert_text(
            self.document.dom_mut(),
            root,
            &range,
            text,
            &self.typing_styles,
        );
        self.selection = Some(caret);
    }

    /// Break the paragraph at the caret (Enter).
    pub fn insert_paragraph(&mut self) {
        let range = self.live_range();
        let root = self.document.root();
        let caret = formatting::insert_paragraph(self.document.dom_mut(), root, &range);
        self.selection = Some(caret);
        self.commit_input();
    }

    /// Delete backwards from the caret (Backspace).
    pub fn delete_backward(&mut self) {
        let range = self.live_range();
        let root = self.document.root();
        let before = self.document.content();
        let caret = formatting::delete_backward(self.document.dom_mut(), root, &range);
        self.selection = Some(caret);
        if self.document.content() != before {
            self.commit_input();
        }
    }

    // ----- clipboard ------------------------------------------------------

    /// Text covered by a non-collapsed selection.
    pub fn copy(&self) -> Option<String> {
        let saved = self.save_selection()?;
        let (start, end) = (saved.start.min(saved.end), saved.start.max(saved.end));
        if start == end {
            return None;
        }
        let text: String = self
            .document
            .text_content()
            .chars()
            .skip(start)
            .take(end - start)
            .collect();
        Some(text)
    }

    /// Copy the selected text, then delete it as one edit.
    pub fn cut(&mut self) -> Option<String> {
        let text = self.copy()?;
        let range = self.selection()?;
        let root = self.document.root();
        let caret = formatting::delete_contents(self.document.dom_mut(), root, &range);
        self.selection = Some(Range::collapsed(caret));
        self.commit_input();
        Some(text)
    }

    /// Insert plain text at the selection as one edit; each line break starts a new paragraph.
    pub fn paste(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let text = text.replace("\r\n", "\n");
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                let range = self.live_range();
                let root = self.document.root();
                let caret = formatting::insert_paragraph(self.document.dom_mut(), root, &range);
                self.selection = Some(caret);
            }
            if !line.is_empty() {
                self.insert_text_silently(line);
            }
        }
        self.typing_styles.clear();
        self.commit_input();
        true
    }

    // ----- inline formatting ----------------------------------------------

    /// Toggle an inline style. At a collapsed caret it becomes a typing style.
    pub fn toggle_style(&mut self, style: InlineStyle) -> bool {
        let range = self.live_range();
        if range.is_collapsed() {
            match self.typing_styles.iter().position(|&s| s == style) {
                Some(idx) => {
                    self.typing_styles.remove(idx);
                }
                None => self.typing_styles.push(style),
            }
            self.sync_format();
            return true;
        }
        let saved = self.save_selection();
        let root = self.document.root();
        if !formatting::toggle_inline(self.document.dom_mut(), root, &range, style) {
            return false;
        }
        self.reselect(saved);
        self.commit_input();
        true
    }

    fn reselect(&mut self, saved: Option<LogicalSelection>) {
        if let Some(saved) = saved {
            self.selection = Some(selection::restore(
                self.document.dom(),
                self.document.root(),
                &saved,
            ));
        }
    }

    fn restyle(
        &mut self,
        apply: impl FnOnce(&mut crate::dom::Dom, NodeId, &Range) -> bool,
    ) -> bool {
        let range = self.live_range();
        let saved = self.save_selection();
        let root = self.document.root();
        if !apply(self.document.dom_mut(), root, &range) {
            return false;
        }
        self.reselect(saved);
        self.commit_input();
        true
    }

    /// Apply a font family to the selection.
    pub fn set_font_family(&mut self, family: &str) -> bool {
        self.restyle(|dom, root, range| {
            formatting::set_font_attribute(dom, root, range, "face", family)
        })
    }

    /// Apply a legacy font size (1–7) to the selection.
    pub fn set_font_size(&mut self, size: u8) -> Result<bool, CommandError> {
        if !(1..=7).contains(&size) {
            return Err(CommandError::InvalidFontSize(size));
        }
        let value = size.to_string();
        Ok(self.restyle(|dom, root, range| {
            formatting::set_font_attribute(dom, root, range, "size", &value)
        }))
    }

    /// Colour the selected text.
    pub fn set_text_color(&mut self, color: &str) -> Result<bool, CommandError> {
        crate::commands::validate_color(color)?;
        Ok(self.restyle(|dom, root, range| {
            formatting::set_font_attribute(dom, root, range, "color", color)
        }))
    }

    /// Give the selected text a background colour.
    pub fn set_background_color(&mut self, color: &str) -> Result<bool, CommandError> {
        crate::commands::validate_color(color)?;
        Ok(self.restyle(|dom, root, range| formatting::set_background(dom, root, range, color)))
    }

    // ----- block formatting -----------------------------------------------

    /// Align the blocks in the selection.
    pub fn set_alignment(&mut self, alignment: Alignment) -> bool {
        self.restyle(|dom, root, range| formatting::set_alignment(dom, root, range, alignment))
    }

    /// Toggle a bullet or numbered list over the selected blocks.
    pub fn toggle_list(&mut self, kind: ListKind) -> bool {
        self.restyle(|dom, root, range| formatting::toggle_list(dom, root, range, kind))
    }

    /// Increase the left margin of the selected blocks by one step.
    pub fn indent(&mut self) -> bool {
        let step = self.config.indent_step_px;
        self.restyle(|dom, root, range| formatting::indent(dom, root, range, step))
    }

    /// Decrease the left margin of the selected blocks by one step.
    pub fn outdent(&mut self) -> bool {
        let step = self.config.indent_step_px;
        self.restyle(|dom, root, range| formatting::indent(dom, root, range, -step))
    }

    fn style_blocks(&mut self, scope: SpacingScope, property: &str, value: &str) -> bool {
        let root = self.document.root();
        let targets = match scope {
            SpacingScope::All => {
                self.document.wrap_stray_text();
                formatting::paragraph_blocks(self.document.dom(), root)
            }
            SpacingScope::Current => {
                let Some(range) = self.selection() else {
                    return false;
                };
                formatting::current_block(self.document.dom_mut(), root, &range)
                    .into_iter()
                    .collect()
            }
        };
        if targets.is_empty() {
            return false;
        }
        for &block in &targets {
            self.document.dom_mut().set_style(block, property, value);
        }
        debug!(property, value, blocks = targets.len(), "block spacing applied");
        self.commit_input();
        true
    }

    /// Set `margin-bottom` (px) on the current block or on every paragraph.
    pub fn set_paragraph_spacing(
        &mut self,
        pixels: f64,
        scope: SpacingScope,
    ) -> Result<bool, CommandError> {
        if !pixels.is_finite() || pixels < 0.0 {
            return Err(CommandError::InvalidSpacing(pixels));
        }
        Ok(self.style_blocks(scope, "margin-bottom", &format!("{pixels}px")))
    }

    /// Set `line-height` on the current block or on every paragraph.
    pub fn set_line_spacing(
        &mut self,
        value: f64,
        scope: SpacingScope,
    ) -> Result<bool, CommandError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CommandError::InvalidSpacing(value));
        }
        Ok(self.style_blocks(scope, "line-height", &value.to_string()))
    }

    // ----- inserts --------------------------------------------------------

    /// Insert an image at the caret.
    pub fn insert_image(&mut self, url: &str) -> bool {
        if url.trim().is_empty() {
            return false;
        }
        let range = self.live_range();
        let root = self.document.root();
        let dom = self.document.dom_mut();
        let image = dom.create_element_with("img", &[("src", url)]);
        let caret = formatting::insert_inline(dom, root, &range, &[image]);
        self.selection = Some(caret);
        self.commit_input();
        true
    }

    /// Insert preformatted text (a date/time stamp) at the caret.
    pub fn insert_date_time(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.type_text(text);
        true
    }

    /// Insert a `rows` x `cols` table after the caret's block; it is activated on the next tick.
    pub fn insert_table(&mut self, rows: usize, cols: usize) -> Result<NodeId, CommandError> {
        if rows == 0 || cols == 0 {
            return Err(CommandError::InvalidTableSize { rows, cols });
        }
        let markup = table_markup(rows, cols, &self.config.cell_placeholder);
        let range = self.selection();
        let root = self.document.root();
        let dom = self.document.dom_mut();
        let nodes = formatting::parse_fragment(dom, &markup);
        let Some(&table) = nodes.first() else {
            return Err(CommandError::InvalidTableSize { rows, cols });
        };
        let caret = formatting::insert_blocks(dom, root, range.as_ref(), &nodes);
        self.selection = Some(caret);
        debug!(rows, cols, %table, "table inserted");
        self.commit_input();
        self.defer(Deferred::ActivateTable(table));
        Ok(table)
    }

    // ----- search ---------------------------------------------------------

    /// Highlight every occurrence of `term`; selects the first. Returns the match count.
    pub fn search(&mut self, term: &str) -> usize {
        self.clear_search();
        if term.is_empty() {
            return 0;
        }
        let root = self.document.root();
        let spans = search::highlight(self.document.dom_mut(), root, term, &self.highlight);
        let count = spans.len();
        self.search.set(term, spans);
        debug!(term, count, "search highlighted");
        if count > 0 {
            self.select_match();
        }
        count
    }

    /// Remove all highlighting and forget the search.
    pub fn clear_search(&mut self) {
        let root = self.document.root();
        let class = self.highlight.class.clone();
        let saved = self.save_selection();
        let removed = search::clear_highlights(self.document.dom_mut(), root, &class);
        self.search.reset();
        if removed > 0 {
            self.reselect(saved);
        }
    }

    /// Current search state.
    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    fn select_match(&mut self) -> bool {
        let Some(span) = self.search.current_match() else {
            return false;
        };
        if !self.document.dom().is_attached(span) {
            return false;
        }
        let end = self.document.dom().children(span).len();
        self.set_range(Range::new(Boundary::new(span, 0), Boundary::new(span, end)));
        self.notifier.emit(Notification::ScrollIntoView(span));
        true
    }

    /// Select the next match, wrapping to the first. Returns the new index.
    pub fn find_next(&mut self) -> Option<usize> {
        let index = self.search.advance()?;
        self.select_match();
        Some(index)
    }

    /// Select the previous match, wrapping to the last. Returns the new index.
    pub fn find_previous(&mut self) -> Option<usize> {
        let index = self.search.retreat()?;
        self.select_match();
        Some(index)
    }

    /// Replace the current match with `replacement`.
    ///
    /// Snapshots before and (on the next tick) after, then re-runs the search.
    pub fn replace_current(&mut self, replacement: &str) -> bool {
        let Some(span) = self
            .search
            .current_match()
            .filter(|&s| self.document.dom().is_attached(s))
        else {
            return false;
        };
        let term = self.search.term().to_string();
        self.record();

        let end = self.document.dom().children(span).len();
        self.selection = Some(Range::new(Boundary::new(span, 0), Boundary::new(span, end)));
        self.insert_text_silently(replacement);

        self.defer(Deferred::Record);
        self.notifier.emit(Notification::ContentChanged);
        self.defer(Deferred::Search(term));
        true
    }

    /// Replace every occurrence of `term` in the serialized markup. Returns the count.
    ///
    /// The substitution runs over markup, not text: a term that also occurs inside tag names
    /// or attribute values is replaced there too.
    pub fn replace_all(&mut self, term: &str, replacement: &str) -> usize {
        if term.is_empty() {
            return 0;
        }
        self.clear_search();
        let markup = self.document.content();
        let (updated, count) = search::replace_literal(&markup, term, replacement);
        if count == 0 {
            return 0;
        }
        self.record();

        self.document.set_markup(&updated);
        self.document.wrap_stray_text();
        self.document.ensure_block();
        self.invalidate_nodes();
        debug!(term, count, "replace all");

        self.defer(Deferred::Record);
        self.notifier.emit(Notification::ContentChanged);
        count
    }

    // ----- tables ---------------------------------------------------------

    /// The active table.
    pub fn active_table(&self) -> Option<NodeId> {
        self.tables
            .active()
            .filter(|&t| self.document.dom().is_attached(t))
    }

    /// Table controller state.
    pub fn tables(&self) -> &TableController {
        &self.tables
    }

    fn activate_table(&mut self, table: NodeId) {
        let root = self.document.root();
        let dom = self.document.dom_mut();
        if self.tables.deactivate_all(dom, root) {
            self.notifier.emit(Notification::TablesDeactivated);
        }
        self.tables.activate(self.document.dom_mut(), table);
        self.notifier.emit(Notification::TableActivated);
    }

    /// Deactivate every table. Returns `true` if one was active.
    pub fn deactivate_tables(&mut self) -> bool {
        let root = self.document.root();
        let was_active = self.tables.deactivate_all(self.document.dom_mut(), root);
        if was_active {
            self.notifier.emit(Notification::TablesDeactivated);
        }
        was_active
    }

    /// A click on `node`: activates the enclosing table, or deactivates tables when the click
    /// lands outside any table.
    pub fn click(&mut self, node: NodeId) {
        if !self.document.dom().is_attached(node) {
            return;
        }
        match self.document.dom().closest(node, &["table"]) {
            Some(table) if self.tables.active() == Some(table) => {}
            Some(table) => self.activate_table(table),
            None => {
                self.deactivate_tables();
            }
        }
    }

    /// Pointer down on a table's drag handle.
    pub fn begin_table_drag(&mut self, table: NodeId, pointer: Point) -> bool {
        if !self.document.dom().is_attached(table) || !self.document.dom().has_tag(table, "table") {
            return false;
        }
        self.tables.begin_drag(table, pointer);
        self.pointer_changed = false;
        true
    }

    /// Pointer down on a table's resize handle. `rendered` is the size the host measured.
    pub fn begin_table_resize(
        &mut self,
        table: NodeId,
        pointer: Point,
        rendered: Option<Size>,
    ) -> bool {
        if !self.document.dom().is_attached(table) || !self.document.dom().has_tag(table, "table") {
            return false;
        }
        self.tables
            .begin_resize(self.document.dom(), table, pointer, rendered);
        self.pointer_changed = false;
        true
    }

    /// Pointer moved during a drag or resize.
    pub fn pointer_move(&mut self, pointer: Point) -> PointerEffect {
        let root = self.document.root();
        let effect = self
            .tables
            .pointer_move(self.document.dom_mut(), root, pointer);
        if effect != PointerEffect::None {
            self.pointer_changed = true;
        }
        effect
    }

    /// Pointer released. Ends any drag or resize; returns `true` if one was in progress.
    pub fn pointer_up(&mut self) -> bool {
        if !self.tables.pointer_up() {
            return false;
        }
        if std::mem::take(&mut self.pointer_changed) {
            self.record();
        }
        self.notifier.emit(Notification::ContentChanged);
        true
    }

    fn selected_cell(&self) -> Option<NodeId> {
        let range = self.selection()?;
        self.tables.cell_of(self.document.dom(), range.start.node)
    }

    fn table_edit(
        &mut self,
        edit: impl FnOnce(&mut TableController, &mut crate::dom::Dom, Option<NodeId>) -> bool,
    ) -> bool {
        if self.active_table().is_none() {
            return false;
        }
        let cell = self.selected_cell();
        if !edit(&mut self.tables, self.document.dom_mut(), cell) {
            return false;
        }
        self.commit_input();
        true
    }

    /// Insert a row above or below the selected cell's row (appends without a selected cell).
    pub fn insert_table_row(&mut self, position: RowPosition) -> bool {
        self.table_edit(|tables, dom, cell| tables.insert_row(dom, cell, position))
    }

    /// Insert a column before or after the selected cell (appends without a selected cell).
    pub fn insert_table_column(&mut self, position: ColumnPosition) -> bool {
        self.table_edit(|tables, dom, cell| tables.insert_column(dom, cell, position))
    }

    /// Append a row to the active table.
    pub fn append_table_row(&mut self) -> bool {
        self.table_edit(|tables, dom, _| tables.insert_row(dom, None, RowPosition::Below))
    }

    /// Append a column to the active table.
    pub fn append_table_column(&mut self) -> bool {
        self.table_edit(|tables, dom, _| tables.insert_column(dom, None, ColumnPosition::After))
    }

    /// Delete the selected row, or the last one. Refuses to delete the only row.
    pub fn delete_table_row(&mut self) -> bool {
        self.table_edit(|tables, dom, cell| tables.delete_row(dom, cell))
    }

    /// Delete the selected column, or the last one. Refuses to delete the only column.
    pub fn delete_table_column(&mut self) -> bool {
        self.table_edit(|tables, dom, cell| tables.delete_column(dom, cell))
    }

    /// Delete the active table.
    pub fn delete_table(&mut self) -> bool {
        if self.active_table().is_none() {
            return false;
        }
        let in_table = self.selected_cell().is_some();
        if !self.tables.delete_table(self.document.dom_mut()) {
            return false;
        }
        if self.document.ensure_block() || in_table {
            self.selection = None;
        }
        self.notifier.emit(Notification::TableDeleted);
        self.commit_input();
        true
    }

    /// Switch the active table's layout mode.
    pub fn set_table_alignment(&mut self, alignment: TableAlignment) -> bool {
        self.table_edit(|tables, dom, _| tables.set_alignment(dom, alignment))
    }

    // ----- view -----------------------------------------------------------

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor.
    pub fn set_zoom(&mut self, scale: f64) -> Result<(), CommandError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CommandError::InvalidZoom(scale));
        }
        self.zoom = scale;
        Ok(())
    }

    /// Toggle right-to-left layout; returns the new state.
    pub fn toggle_rtl(&mut self) -> bool {
        let rtl = self.document.toggle_rtl();
        self.notifier.emit(Notification::ContentChanged);
        rtl
    }

    // ----- state queries --------------------------------------------------

    /// Document state snapshot.
    pub fn document_state(&self) -> DocumentState {
        DocumentState {
            char_count: self.document.text_content().chars().count(),
            word_count: self.document.word_count(),
            is_modified: self.notifier.is_modified(),
            version: self.notifier.version(),
            rtl: self.document.is_rtl(),
        }
    }

    /// Undo/redo state snapshot.
    pub fn history_state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            entries: self.history.len(),
            index: self.history.index(),
            replaying: self.history.is_replaying(),
        }
    }

    /// Complete state snapshot.
    pub fn editor_state(&self) -> EditorState {
        let active = self.active_table();
        EditorState {
            document: self.document_state(),
            selection: self.save_selection(),
            format: self.format_state(),
            history: self.history_state(),
            search: SearchStatus {
                term: self.search.term().to_string(),
                match_count: self.search.len(),
                current: self.search.current(),
            },
            table: TableState {
                active,
                alignment: active.map(|t| TableAlignment::of_table(self.document.dom(), t)),
                interaction: self.tables.interaction(),
            },
            zoom: self.zoom,
        }
    }
}
