use richedit_core::{Editor, LogicalSelection};

#[test]
fn test_restore_beyond_length_clamps_to_end() {
    let mut editor = Editor::new();
    editor.set_content("<div>abc</div>");

    assert!(editor.restore_selection(Some(&LogicalSelection::caret(99))));
    assert_eq!(editor.save_selection(), Some(LogicalSelection::caret(3)));

    assert!(editor.restore_selection(Some(&LogicalSelection::span(1, 50))));
    assert_eq!(editor.save_selection(), Some(LogicalSelection::span(1, 3)));
}

#[test]
fn test_restore_without_selection_is_noop() {
    let mut editor = Editor::new();
    assert!(!editor.restore_selection(None));
    assert_eq!(editor.save_selection(), None);
}

#[test]
fn test_selection_spans_blocks_and_formatting() {
    let mut editor = Editor::new();
    editor.set_content("<div>ab<b>cd</b></div><p>ef</p>");

    editor.set_selection(3, 5);
    assert_eq!(editor.save_selection(), Some(LogicalSelection::span(3, 5)));

    editor.select_all();
    assert_eq!(editor.save_selection(), Some(LogicalSelection::span(0, 6)));
}

#[test]
fn test_selection_survives_content_rebuild() {
    let mut editor = Editor::new();
    editor.settle();
    editor.set_content("<div>hello world</div>");
    editor.record();

    editor.set_selection(6, 11);
    let saved = editor.save_selection();
    let stale = editor.selection().unwrap();

    editor.type_text("there");
    editor.undo();
    assert_eq!(editor.selection(), None);
    assert!(!editor.document().dom().contains(stale.start.node));

    editor.settle();
    editor.restore_selection(saved.as_ref());
    assert_eq!(editor.save_selection(), Some(LogicalSelection::span(6, 11)));
}

#[test]
fn test_stale_nodes_are_ignored() {
    let mut editor = Editor::new();
    editor.set_content("<table><tr><td>x</td></tr></table>");
    let doc = editor.document();
    let old_table = doc.dom().elements_by_tag(doc.root(), "table")[0];

    editor.set_content("<table><tr><td>y</td></tr></table>");
    editor.click(old_table);
    assert_eq!(editor.active_table(), None);
    assert!(!editor.begin_table_drag(old_table, Default::default()));
}
