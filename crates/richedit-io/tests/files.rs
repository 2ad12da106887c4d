use pretty_assertions::assert_eq;
use richedit_core::Editor;
use richedit_io::{IoError, RecentFiles, load_file, open_into, save_file, save_from};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_without_extension_writes_html() {
    let dir = tempdir().unwrap();
    let written = save_file(dir.path().join("notes"), "<div>hi</div>").unwrap();

    assert_eq!(written, dir.path().join("notes.html"));
    let saved = fs::read_to_string(&written).unwrap();
    assert!(saved.contains("<title>notes.html</title>"));
    assert!(saved.contains("<div>hi</div>"));

    assert_eq!(load_file(&written).unwrap(), "<div>hi</div>");
}

#[test]
fn test_text_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.txt");
    save_file(&path, "<div>a &amp; b</div>").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "a & b");
    assert_eq!(load_file(&path).unwrap(), "a &amp; b");
}

#[test]
fn test_open_and_save_editor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    fs::write(&path, "line one\nline two").unwrap();

    let mut editor = Editor::new();
    editor.settle();
    open_into(&mut editor, &path).unwrap();
    assert_eq!(editor.content(), "<div>line one<br>line two</div>");
    assert!(!editor.document_state().is_modified);

    editor.type_text("!");
    assert!(editor.document_state().is_modified);
    assert!(editor.undo());
    editor.settle();
    assert_eq!(editor.content(), "<div>line one<br>line two</div>");

    let out = save_from(&mut editor, dir.path().join("copy.html")).unwrap();
    assert!(!editor.document_state().is_modified);
    assert!(fs::read_to_string(out).unwrap().contains("line one<br>line two"));
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let err = load_file(dir.path().join("absent.html")).unwrap_err();
    assert!(matches!(err, IoError::Io { .. }));
    assert!(err.to_string().contains("absent.html"));
}

#[test]
fn test_recent_files_persist_and_prune() {
    let dir = tempdir().unwrap();
    let kept = dir.path().join("kept.html");
    fs::write(&kept, "<div>x</div>").unwrap();
    let gone = dir.path().join("gone.html");

    let mut recent = RecentFiles::default();
    recent.push(&gone);
    recent.push(&kept);

    let store = dir.path().join("recent.json");
    recent.save(&store).unwrap();
    let mut loaded = RecentFiles::load(&store).unwrap();
    assert_eq!(loaded, recent);

    assert!(matches!(loaded.touch(&gone), Err(IoError::Missing(_))));
    assert_eq!(loaded.files(), [kept.clone()]);
    assert!(loaded.touch(&kept).is_ok());

    let empty = RecentFiles::load(dir.path().join("none.json")).unwrap();
    assert!(empty.is_empty());
}
