use richedit_core::{
    Command, CommandError, CommandResult, Editor, Interaction, Notification, NodeId, Point,
    PointerEffect, Size, TableAlignment, TableCommand, TableController,
};
use std::sync::{Arc, Mutex};

fn with_table(rows: usize, cols: usize) -> (Editor, NodeId) {
    let mut editor = Editor::new();
    editor.settle();
    let table = editor.insert_table(rows, cols).unwrap();
    editor.settle();
    (editor, table)
}

fn shape(editor: &Editor, table: NodeId) -> Vec<usize> {
    let dom = editor.document().dom();
    TableController::rows(dom, table)
        .into_iter()
        .map(|row| TableController::cells(dom, row).len())
        .collect()
}

fn first_table(editor: &Editor) -> NodeId {
    let doc = editor.document();
    doc.dom().elements_by_tag(doc.root(), "table")[0]
}

#[test]
fn test_insert_table_creates_grid_and_activates() {
    let mut editor = Editor::new();
    editor.settle();

    let table = editor.insert_table(2, 2).unwrap();
    assert_eq!(editor.active_table(), None);

    editor.settle();
    assert_eq!(editor.active_table(), Some(table));
    assert_eq!(shape(&editor, table), vec![2, 2]);
    assert!(editor.content().contains(r#"class="table-handle""#));
    assert!(editor.content().ends_with("</table><p></p>"));
}

#[test]
fn test_insert_table_rejects_empty_size() {
    let mut editor = Editor::new();
    assert_eq!(
        editor.insert_table(0, 3),
        Err(CommandError::InvalidTableSize { rows: 0, cols: 3 })
    );
}

#[test]
fn test_append_and_delete_rows_and_columns() {
    let (mut editor, table) = with_table(2, 2);

    assert!(editor.append_table_row());
    assert!(editor.append_table_column());
    assert_eq!(shape(&editor, table), vec![3, 3, 3]);

    assert!(editor.delete_table_row());
    assert!(editor.delete_table_column());
    assert_eq!(shape(&editor, table), vec![2, 2]);
}

#[test]
fn test_deleting_only_row_or_column_is_refused() {
    let (mut editor, table) = with_table(1, 1);
    let before = editor.content();

    assert!(!editor.delete_table_row());
    assert!(!editor.delete_table_column());
    assert_eq!(
        editor.execute(Command::Table(TableCommand::DeleteRow)),
        Ok(CommandResult::NoOp)
    );
    assert_eq!(editor.content(), before);
    assert_eq!(shape(&editor, table), vec![1]);
}

#[test]
fn test_row_edits_follow_selected_cell() {
    let mut editor = Editor::new();
    editor.settle();
    editor.set_content("<table><tr><td>a</td></tr><tr><td>b</td></tr></table>");
    let table = first_table(&editor);
    editor.click(table);
    assert_eq!(editor.active_table(), Some(table));

    // caret inside "a"
    editor.set_selection(0, 0);
    assert!(editor.delete_table_row());
    assert_eq!(editor.document().dom().text_content(table), "b");
}

#[test]
fn test_table_commands_require_active_table() {
    let mut editor = Editor::new();
    assert_eq!(
        editor.execute(Command::Table(TableCommand::AppendRow)),
        Err(CommandError::NoActiveTable)
    );
    assert_eq!(
        editor.execute(Command::Table(TableCommand::Deactivate)),
        Ok(CommandResult::Bool(false))
    );
}

#[test]
fn test_click_outside_deactivates() {
    let (mut editor, table) = with_table(2, 2);
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    editor.subscribe(move |n| sink.lock().unwrap().push(n.clone()));

    let first_block = editor.document().blocks()[0];
    editor.click(first_block);

    assert_eq!(editor.active_table(), None);
    assert!(!editor.content().contains("table-handle"));
    assert!(log.lock().unwrap().contains(&Notification::TablesDeactivated));

    let cell = {
        let dom = editor.document().dom();
        dom.elements_by_tag(table, "td")[0]
    };
    editor.click(cell);
    assert_eq!(editor.active_table(), Some(table));
    assert!(log.lock().unwrap().contains(&Notification::TableActivated));
}

#[test]
fn test_delete_table_notifies() {
    let (mut editor, _) = with_table(2, 2);
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    editor.subscribe(move |n| {
        if !matches!(n, Notification::SelectionStateChanged(_)) {
            sink.lock().unwrap().push(n.clone());
        }
    });

    assert!(editor.delete_table());
    assert_eq!(editor.active_table(), None);
    assert!(!editor.content().contains("<table"));
    assert_eq!(
        *log.lock().unwrap(),
        vec![Notification::TableDeleted, Notification::ContentChanged]
    );
}

#[test]
fn test_alignment_replaces_class_and_width() {
    let (mut editor, table) = with_table(1, 2);

    assert!(editor.set_table_alignment(TableAlignment::CenterNoWrap));
    let dom = editor.document().dom();
    assert_eq!(dom.attr(table, "class"), Some("center-align"));
    assert_eq!(dom.style(table, "width").as_deref(), Some("auto"));
    assert_eq!(TableAlignment::of_table(dom, table), TableAlignment::CenterNoWrap);

    assert!(editor.set_table_alignment(TableAlignment::FullWidthNoWrap));
    assert_eq!(
        editor.document().dom().style(table, "width").as_deref(),
        Some("100%")
    );
}

#[test]
fn test_drag_moves_table_between_blocks() {
    let mut editor = Editor::new();
    editor.settle();
    editor.set_content("<p>one</p><table><tr><td>x</td></tr></table><p>two</p>");
    editor.record();
    let table = first_table(&editor);

    assert!(editor.begin_table_drag(table, Point::new(0.0, 100.0)));
    assert_eq!(editor.pointer_move(Point::new(0.0, 90.0)), PointerEffect::None);
    assert_eq!(editor.pointer_move(Point::new(0.0, 60.0)), PointerEffect::Moved);
    assert!(editor.content().starts_with("<table"));

    assert!(editor.pointer_up());
    assert_eq!(editor.tables().interaction(), Interaction::Idle);
    assert!(!editor.pointer_up());

    editor.undo();
    editor.settle();
    assert!(editor.content().starts_with("<p>one</p>"));
}

#[test]
fn test_resize_follows_pointer() {
    let (mut editor, table) = with_table(2, 2);

    let rendered = Size {
        width: 200.0,
        height: 100.0,
    };
    assert!(editor.begin_table_resize(table, Point::new(10.0, 10.0), Some(rendered)));
    assert_eq!(
        editor.pointer_move(Point::new(60.4, 30.0)),
        PointerEffect::Resized
    );
    editor.pointer_up();

    let dom = editor.document().dom();
    assert_eq!(dom.style(table, "width").as_deref(), Some("250px"));
    assert_eq!(dom.style(table, "height").as_deref(), Some("120px"));
}

#[test]
fn test_deleting_the_only_block_leaves_an_empty_paragraph() {
    let mut editor = Editor::new();
    editor.settle();
    editor.set_content("<table><tr><td>a</td></tr><tr><td>b</td></tr></table>");
    let table = first_table(&editor);
    editor.click(table);

    assert!(editor.delete_table());
    assert_eq!(editor.content(), "<div><br></div>");
    assert_eq!(editor.selection(), None);

    editor.type_text("x");
    assert_eq!(editor.content(), "<div>x</div>");
}
