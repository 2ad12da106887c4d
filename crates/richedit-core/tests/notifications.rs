use richedit_core::{Editor, EditorConfig, FormatState, LogicalSelection, Notification};
use std::sync::{Arc, Mutex};

fn recorded(editor: &mut Editor) -> Arc<Mutex<Vec<Notification>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    editor.subscribe(move |n| sink.lock().unwrap().push(n.clone()));
    log
}

#[test]
fn test_content_changes_bump_version() {
    let mut editor = Editor::new();
    let log = recorded(&mut editor);
    editor.settle();
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(editor.document_state().version, 0);

    editor.type_text("a");
    editor.type_text("b");
    let state = editor.document_state();
    assert_eq!(state.version, 2);
    assert_eq!(state.char_count, 2);
    assert!(state.is_modified);
    assert_eq!(
        log.lock()
            .unwrap()
            .iter()
            .filter(|n| **n == Notification::ContentChanged)
            .count(),
        2
    );
}

#[test]
fn test_format_state_pushed_only_when_changed() {
    let mut editor = Editor::new();
    editor.settle();
    editor.set_content("<div><b>bold</b> plain</div>");
    let log = recorded(&mut editor);

    editor.set_selection(1, 1);
    editor.set_selection(2, 2);
    editor.set_selection(6, 6);

    let pushed: Vec<FormatState> = log
        .lock()
        .unwrap()
        .iter()
        .filter_map(|n| match n {
            Notification::SelectionStateChanged(state) => Some(*state),
            _ => None,
        })
        .collect();
    assert_eq!(pushed.len(), 2);
    assert!(pushed[0].bold);
    assert!(!pushed[1].bold);
}

#[test]
fn test_boundary_undo_reports_status() {
    let mut editor = Editor::new();
    editor.settle();
    let log = recorded(&mut editor);

    assert!(!editor.undo());
    assert!(!editor.redo());
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            Notification::Status("Nothing to undo".to_string()),
            Notification::Status("Nothing to redo".to_string()),
        ]
    );
}

#[test]
fn test_undo_drops_active_table() {
    let mut editor = Editor::new();
    editor.settle();
    editor.insert_table(2, 2).unwrap();
    editor.settle();
    let log = recorded(&mut editor);

    editor.undo();
    assert_eq!(editor.active_table(), None);
    let log = log.lock().unwrap();
    assert_eq!(log[0], Notification::TablesDeactivated);
    assert_eq!(log[1], Notification::ContentChanged);
}

#[test]
fn test_editor_state_snapshot() {
    let mut editor = Editor::with_config(EditorConfig {
        initial_zoom: 1.5,
        ..EditorConfig::default()
    });
    editor.settle();
    editor.type_text("cat cat");
    editor.search("cat");

    let state = editor.editor_state();
    assert_eq!(state.zoom, 1.5);
    assert_eq!(state.search.match_count, 2);
    assert_eq!(state.search.current, Some(0));
    assert_eq!(state.selection, Some(LogicalSelection::span(0, 3)));
    assert!(state.history.can_undo);
    assert_eq!(state.table.active, None);
    assert_eq!(state.document.word_count.words, 2);
}

#[test]
fn test_independent_editors_do_not_share_state() {
    let mut first = Editor::new();
    let mut second = Editor::new();
    first.settle();
    second.settle();

    first.type_text("only here");
    assert_eq!(second.content(), "<div><br></div>");
    assert_eq!(second.document_state().version, 0);
}
