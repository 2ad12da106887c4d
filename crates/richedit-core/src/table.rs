//! Table Controller.
//!
//! Owns the per-editor table state: which table (if any) is active, and the transient pointer
//! interaction (dragging a table up/down among the root's blocks, or resizing it). Structural
//! edits (rows, columns, alignment, deletion) act on the active table.
//!
//! An active table carries two handle elements (`table-handle` for resizing and
//! `table-drag-handle` for moving). They are removed again on deactivation. Handles are empty
//! so they never contribute to the document text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Dom, NodeId};

/// Class of the resize handle element.
pub const RESIZE_HANDLE_CLASS: &str = "table-handle";
/// Class of the drag handle element.
pub const DRAG_HANDLE_CLASS: &str = "table-drag-handle";

/// Table layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableAlignment {
    /// Floats left, text wraps around it.
    LeftWrap,
    /// Floats right, text wraps around it.
    RightWrap,
    /// Centered, no text wrap.
    CenterNoWrap,
    /// Full width, no text wrap.
    #[default]
    FullWidthNoWrap,
}

impl TableAlignment {
    /// Every mode, in toolbar order.
    pub const ALL: [TableAlignment; 4] = [
        TableAlignment::LeftWrap,
        TableAlignment::RightWrap,
        TableAlignment::CenterNoWrap,
        TableAlignment::FullWidthNoWrap,
    ];

    /// Class name carried by the table element.
    pub fn class(self) -> &'static str {
        match self {
            TableAlignment::LeftWrap => "left-align",
            TableAlignment::RightWrap => "right-align",
            TableAlignment::CenterNoWrap => "center-align",
            TableAlignment::FullWidthNoWrap => "no-wrap",
        }
    }

    /// Value of the table's `width` style for this mode.
    pub fn width(self) -> &'static str {
        match self {
            TableAlignment::FullWidthNoWrap => "100%",
            _ => "auto",
        }
    }

    /// Mode recorded in a table's class list; full width when none is present.
    pub fn of_table(dom: &Dom, table: NodeId) -> Self {
        Self::ALL
            .into_iter()
            .find(|a| dom.has_class(table, a.class()))
            .unwrap_or_default()
    }
}

/// Where a new row goes relative to the selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPosition {
    /// Before the selected row.
    Above,
    /// After the selected row.
    Below,
}

/// Where a new column goes relative to the selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPosition {
    /// Before the selected column.
    Before,
    /// After the selected column.
    After,
}

/// A pointer position in host pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Construct a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rendered size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

/// Transient pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    /// No pointer interaction.
    #[default]
    Idle,
    /// Moving the active table; `anchor_y` resets after every move.
    Dragging {
        /// Vertical pointer position of the last move (or the drag start).
        anchor_y: f64,
    },
    /// Resizing the active table.
    Resizing {
        /// Pointer position at resize start.
        anchor: Point,
        /// Table width at resize start.
        start_width: f64,
        /// Table height at resize start.
        start_height: f64,
    },
}

/// Effect of a pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEffect {
    /// Nothing changed.
    None,
    /// The table swapped places with a neighbouring block.
    Moved,
    /// The table's size changed.
    Resized,
}

/// Per-editor table state.
#[derive(Debug, Clone)]
pub struct TableController {
    active: Option<NodeId>,
    interaction: Interaction,
    drag_threshold: f64,
    placeholder: String,
}

impl Default for TableController {
    fn default() -> Self {
        Self::new(30.0, " ")
    }
}

impl TableController {
    /// Create a controller with a drag threshold (pixels) and the text put into new cells.
    pub fn new(drag_threshold: f64, placeholder: &str) -> Self {
        Self {
            active: None,
            interaction: Interaction::Idle,
            drag_threshold,
            placeholder: placeholder.to_string(),
        }
    }

    /// The active table.
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Current pointer interaction.
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Forget the active table without touching the tree (the tree was replaced).
    pub fn reset(&mut self) -> bool {
        self.interaction = Interaction::Idle;
        self.active.take().is_some()
    }

    /// Make `table` the active table: normalize its alignment class, clear stray offsets and
    /// attach the handles.
    pub fn activate(&mut self, dom: &mut Dom, table: NodeId) {
        self.active = Some(table);
        dom.set_style(table, "margin-left", "");
        dom.set_style(table, "margin-top", "");

        let alignment = TableAlignment::of_table(dom, table);
        for other in TableAlignment::ALL {
            if other != alignment {
                dom.remove_class(table, other.class());
            }
        }
        dom.add_class(table, alignment.class());

        remove_handles(dom, table);
        let resize = dom.create_element_with("div", &[("class", RESIZE_HANDLE_CLASS)]);
        let drag = dom.create_element_with("div", &[("class", DRAG_HANDLE_CLASS)]);
        dom.append_child(table, resize);
        dom.append_child(table, drag);
        debug!(%table, alignment = alignment.class(), "table activated");
    }

    /// Strip handles from every table under `root` and clear the active table.
    ///
    /// Returns `true` if a table was active.
    pub fn deactivate_all(&mut self, dom: &mut Dom, root: NodeId) -> bool {
        for table in dom.elements_by_tag(root, "table") {
            remove_handles(dom, table);
        }
        self.interaction = Interaction::Idle;
        let was_active = self.active.take().is_some();
        if was_active {
            debug!("tables deactivated");
        }
        was_active
    }

    /// Start moving `table`; it becomes the active table.
    pub fn begin_drag(&mut self, table: NodeId, pointer: Point) {
        self.active = Some(table);
        self.interaction = Interaction::Dragging {
            anchor_y: pointer.y,
        };
    }

    /// Start resizing `table` from its rendered size.
    ///
    /// Inline pixel `width`/`height` styles are used when the host cannot measure the table.
    pub fn begin_resize(
        &mut self,
        dom: &Dom,
        table: NodeId,
        pointer: Point,
        rendered: Option<Size>,
    ) {
        let size = rendered.unwrap_or_else(|| Size {
            width: style_px(dom, table, "width").unwrap_or(0.0),
            height: style_px(dom, table, "height").unwrap_or(0.0),
        });
        self.active = Some(table);
        self.interaction = Interaction::Resizing {
            anchor: pointer,
            start_width: size.width,
            start_height: size.height,
        };
    }

    /// Apply a pointer move to the interaction in progress.
    pub fn pointer_move(&mut self, dom: &mut Dom, root: NodeId, pointer: Point) -> PointerEffect {
        let Some(table) = self.active else {
            return PointerEffect::None;
        };
        match self.interaction {
            Interaction::Idle => PointerEffect::None,
            Interaction::Dragging { anchor_y } => {
                let delta = pointer.y - anchor_y;
                if delta.abs() <= self.drag_threshold {
                    return PointerEffect::None;
                }
                let blocks: Vec<NodeId> = dom
                    .children(root)
                    .iter()
                    .copied()
                    .filter(|&n| dom.is_block(n))
                    .collect();
                let Some(idx) = blocks.iter().position(|&b| b == table) else {
                    return PointerEffect::None;
                };
                if delta < 0.0 && idx > 0 {
                    dom.insert_before(blocks[idx - 1], table);
                } else if delta > 0.0 && idx + 1 < blocks.len() {
                    dom.insert_after(blocks[idx + 1], table);
                } else {
                    return PointerEffect::None;
                }
                self.interaction = Interaction::Dragging {
                    anchor_y: pointer.y,
                };
                debug!(%table, up = delta < 0.0, "table moved");
                PointerEffect::Moved
            }
            Interaction::Resizing {
                anchor,
                start_width,
                start_height,
            } => {
                let width = start_width + (pointer.x - anchor.x);
                let height = start_height + (pointer.y - anchor.y);
                dom.set_style(table, "width", &format!("{}px", width.round()));
                dom.set_style(table, "height", &format!("{}px", height.round()));
                PointerEffect::Resized
            }
        }
    }

    /// End the pointer interaction. Returns `true` if a drag or resize was in progress.
    pub fn pointer_up(&mut self) -> bool {
        let was_interacting = self.interaction != Interaction::Idle;
        self.interaction = Interaction::Idle;
        was_interacting
    }

    /// Rows of `table` (through `thead`/`tbody`/`tfoot`, never into nested tables).
    pub fn rows(dom: &Dom, table: NodeId) -> Vec<NodeId> {
        let mut rows = Vec::new();
        for &child in dom.children(table) {
            match dom.tag(child) {
                Some("tr") => rows.push(child),
                Some("thead" | "tbody" | "tfoot") => rows.extend(
                    dom.children(child)
                        .iter()
                        .copied()
                        .filter(|&r| dom.has_tag(r, "tr")),
                ),
                _ => {}
            }
        }
        rows
    }

    /// Cells of a row.
    pub fn cells(dom: &Dom, row: NodeId) -> Vec<NodeId> {
        dom.children(row)
            .iter()
            .copied()
            .filter(|&c| dom.has_tag(c, "td") || dom.has_tag(c, "th"))
            .collect()
    }

    /// The cell of the active table that contains `node`, if any.
    pub fn cell_of(&self, dom: &Dom, node: NodeId) -> Option<NodeId> {
        let table = self.active?;
        if !dom.contains(node) {
            return None;
        }
        let cell = dom.closest(node, &["td", "th"])?;
        let owner = dom.closest(cell, &["table"])?;
        (owner == table).then_some(cell)
    }

    fn new_cell(&self, dom: &mut Dom) -> NodeId {
        let cell = dom.create_element("td");
        let text = dom.create_text(&self.placeholder);
        dom.append_child(cell, text);
        cell
    }

    fn new_row(&self, dom: &mut Dom, cells: usize) -> NodeId {
        let row = dom.create_element("tr");
        for _ in 0..cells {
            let cell = self.new_cell(dom);
            dom.append_child(row, cell);
        }
        row
    }

    /// Insert a row next to the row of `cell`, or append one when `cell` is `None`.
    ///
    /// The new row has as many cells as the reference row. Returns `false` if the table has no
    /// rows to copy the shape from.
    pub fn insert_row(
        &mut self,
        dom: &mut Dom,
        cell: Option<NodeId>,
        position: RowPosition,
    ) -> bool {
        let Some(table) = self.active else {
            return false;
        };
        let rows = Self::rows(dom, table);
        let reference = cell.and_then(|c| dom.parent(c)).filter(|r| rows.contains(r));
        match reference {
            Some(row) => {
                let new_row = self.new_row(dom, Self::cells(dom, row).len());
                match position {
                    RowPosition::Above => dom.insert_before(row, new_row),
                    RowPosition::Below => dom.insert_after(row, new_row),
                }
            }
            None => {
                let Some(&first) = rows.first() else {
                    return false;
                };
                let Some(&last) = rows.last() else {
                    return false;
                };
                let new_row = self.new_row(dom, Self::cells(dom, first).len());
                dom.insert_after(last, new_row);
            }
        }
        debug!(%table, rows = rows.len() + 1, "table row inserted");
        true
    }

    /// Insert a column next to `cell`'s column, or append one when `cell` is `None`.
    pub fn insert_column(
        &mut self,
        dom: &mut Dom,
        cell: Option<NodeId>,
        position: ColumnPosition,
    ) -> bool {
        let Some(table) = self.active else {
            return false;
        };
        let rows = Self::rows(dom, table);
        if rows.is_empty() {
            return false;
        }
        let index = cell.and_then(|c| {
            let row = dom.parent(c)?;
            let idx = Self::cells(dom, row).iter().position(|&x| x == c)?;
            Some(match position {
                ColumnPosition::Before => idx,
                ColumnPosition::After => idx + 1,
            })
        });

        for row in rows {
            let cells = Self::cells(dom, row);
            let new_cell = self.new_cell(dom);
            match index.and_then(|i| cells.get(i)) {
                Some(&before) => dom.insert_before(before, new_cell),
                None => match cells.last() {
                    Some(&last) => dom.insert_after(last, new_cell),
                    None => dom.append_child(row, new_cell),
                },
            }
        }
        debug!(%table, "table column inserted");
        true
    }

    /// Delete the row holding `cell`, or the last row. Refuses to delete the only row.
    pub fn delete_row(&mut self, dom: &mut Dom, cell: Option<NodeId>) -> bool {
        let Some(table) = self.active else {
            return false;
        };
        let rows = Self::rows(dom, table);
        if rows.len() <= 1 {
            return false;
        }
        let target = cell
            .and_then(|c| dom.parent(c))
            .filter(|r| rows.contains(r))
            .or(rows.last().copied());
        let Some(row) = target else {
            return false;
        };
        dom.detach(row);
        debug!(%table, rows = rows.len() - 1, "table row deleted");
        true
    }

    /// Delete the column of `cell`, or the last column. Refuses to delete the only column.
    pub fn delete_column(&mut self, dom: &mut Dom, cell: Option<NodeId>) -> bool {
        let Some(table) = self.active else {
            return false;
        };
        let rows = Self::rows(dom, table);
        let Some(&first) = rows.first() else {
            return false;
        };
        let width = Self::cells(dom, first).len();
        if width <= 1 {
            return false;
        }
        let index = cell
            .and_then(|c| {
                let row = dom.parent(c)?;
                Self::cells(dom, row).iter().position(|&x| x == c)
            })
            .unwrap_or(width - 1);

        for row in rows {
            if let Some(&cell) = Self::cells(dom, row).get(index) {
                dom.detach(cell);
            }
        }
        debug!(%table, column = index, "table column deleted");
        true
    }

    /// Remove the active table from the document.
    pub fn delete_table(&mut self, dom: &mut Dom) -> bool {
        let Some(table) = self.active.take() else {
            return false;
        };
        self.interaction = Interaction::Idle;
        dom.detach(table);
        debug!(%table, "table deleted");
        true
    }

    /// Replace the active table's class list with `alignment` and set its width.
    pub fn set_alignment(&mut self, dom: &mut Dom, alignment: TableAlignment) -> bool {
        let Some(table) = self.active else {
            return false;
        };
        dom.set_attr(table, "class", alignment.class());
        dom.set_style(table, "width", alignment.width());
        true
    }
}

/// Markup for a new `rows` x `cols` table followed by an empty paragraph.
pub fn table_markup(rows: usize, cols: usize, placeholder: &str) -> String {
    let mut markup = String::from(
        r#"<table border="1" cellspacing="0" cellpadding="5" class="no-wrap" style="border-collapse: collapse;">"#,
    );
    for _ in 0..rows {
        markup.push_str("<tr>");
        for _ in 0..cols {
            markup.push_str("<td>");
            markup.push_str(&crate::html::escape_text(placeholder));
            markup.push_str("</td>");
        }
        markup.push_str("</tr>");
    }
    markup.push_str("</table><p></p>");
    markup
}

fn remove_handles(dom: &mut Dom, table: NodeId) {
    let handles: Vec<NodeId> = dom
        .children(table)
        .iter()
        .copied()
        .filter(|&c| dom.has_class(c, RESIZE_HANDLE_CLASS) || dom.has_class(c, DRAG_HANDLE_CLASS))
        .collect();
    for handle in handles {
        dom.detach(handle);
    }
}

fn style_px(dom: &Dom, id: NodeId, property: &str) -> Option<f64> {
    dom.style(id, property)?
        .trim()
        .strip_suffix("px")?
        .trim()
        .parse()
        .ok()
}
