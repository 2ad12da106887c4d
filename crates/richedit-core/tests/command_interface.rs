use pretty_assertions::assert_eq;
use richedit_core::{
    Alignment, BlockCommand, ClipboardCommand, Command, CommandError, CommandResult,
    DocumentCommand, Editor, FormatCommand, InlineStyle, InsertCommand, ListKind,
    SelectionCommand, SpacingScope, ViewCommand, WordCount,
};

fn editor_with(markup: &str) -> Editor {
    let mut editor = Editor::new();
    editor.settle();
    editor.set_content(markup);
    editor
}

fn select(editor: &mut Editor, start: usize, end: usize) {
    editor
        .execute(Command::Selection(SelectionCommand::Set { start, end }))
        .unwrap();
}

#[test]
fn test_set_and_get_content() {
    let mut editor = Editor::new();
    editor
        .execute(Command::Document(DocumentCommand::SetContent {
            markup: "plain words".to_string(),
        }))
        .unwrap();
    assert_eq!(
        editor.execute(Command::Document(DocumentCommand::GetContent)),
        Ok(CommandResult::Text("<div>plain words</div>".to_string()))
    );

    editor.set_content("");
    assert_eq!(editor.content(), "<div><br></div>");
}

#[test]
fn test_word_count() {
    let mut editor = editor_with("<div>Hello world</div>");
    assert_eq!(
        editor.execute(Command::Document(DocumentCommand::WordCount)),
        Ok(CommandResult::WordCount(WordCount {
            words: 2,
            chars: 11
        }))
    );
}

#[test]
fn test_bold_toggle_round_trip() {
    let mut editor = editor_with("<div>hello world</div>");
    select(&mut editor, 0, 5);

    let toggle = Command::Format(FormatCommand::Toggle(InlineStyle::Bold));
    assert_eq!(editor.execute(toggle.clone()), Ok(CommandResult::Success));
    assert_eq!(editor.content(), "<div><b>hello</b> world</div>");
    assert!(editor.format_state().bold);

    editor.execute(toggle).unwrap();
    assert_eq!(editor.content(), "<div>hello world</div>");
}

#[test]
fn test_collapsed_toggle_sets_typing_style() {
    let mut editor = editor_with("<div>ab</div>");
    select(&mut editor, 1, 1);

    editor
        .execute(Command::Format(FormatCommand::Toggle(InlineStyle::Italic)))
        .unwrap();
    assert!(editor.format_state().italic);
    assert_eq!(editor.content(), "<div>ab</div>");

    editor.type_text("X");
    assert_eq!(editor.content(), "<div>a<i>X</i>b</div>");
}

#[test]
fn test_font_and_colour() {
    let mut editor = editor_with("<div>hello</div>");
    select(&mut editor, 0, 5);

    editor
        .execute(Command::Format(FormatCommand::TextColor {
            color: "#ff0000".to_string(),
        }))
        .unwrap();
    assert_eq!(editor.content(), r##"<div><font color="#ff0000">hello</font></div>"##);

    assert_eq!(
        editor.execute(Command::Format(FormatCommand::TextColor {
            color: "red".to_string(),
        })),
        Err(CommandError::InvalidColor("red".to_string()))
    );
    assert_eq!(
        editor.execute(Command::Format(FormatCommand::FontSize { size: 0 })),
        Err(CommandError::InvalidFontSize(0))
    );
}

#[test]
fn test_alignment_and_lists() {
    let mut editor = editor_with("<div>one</div><div>two</div>");
    select(&mut editor, 0, 6);

    editor
        .execute(Command::Block(BlockCommand::Align(Alignment::Center)))
        .unwrap();
    assert_eq!(
        editor.content(),
        r#"<div style="text-align: center;">one</div><div style="text-align: center;">two</div>"#
    );
    assert_eq!(editor.format_state().alignment, Alignment::Center);

    editor.set_content("<div>one</div><div>two</div>");
    select(&mut editor, 0, 6);
    editor
        .execute(Command::Block(BlockCommand::List(ListKind::Bullet)))
        .unwrap();
    assert_eq!(editor.content(), "<ul><li>one</li><li>two</li></ul>");
}

#[test]
fn test_indent_uses_configured_step() {
    let mut editor = editor_with("<p>x</p>");
    select(&mut editor, 0, 0);
    editor.execute(Command::Block(BlockCommand::Indent)).unwrap();
    assert_eq!(editor.content(), r#"<p style="margin-left: 40px;">x</p>"#);
    editor.execute(Command::Block(BlockCommand::Outdent)).unwrap();
    assert_eq!(editor.content(), "<p>x</p>");
}

#[test]
fn test_spacing_all_and_current() {
    let mut editor = editor_with("<p>a</p><p>b</p>");
    editor
        .execute(Command::Block(BlockCommand::ParagraphSpacing {
            pixels: 12.0,
            scope: SpacingScope::All,
        }))
        .unwrap();
    assert_eq!(
        editor.content(),
        r#"<p style="margin-bottom: 12px;">a</p><p style="margin-bottom: 12px;">b</p>"#
    );

    editor.set_content("<p>a</p><p>b</p>");
    assert_eq!(
        editor.execute(Command::Block(BlockCommand::LineSpacing {
            value: 1.5,
            scope: SpacingScope::Current,
        })),
        Ok(CommandResult::NoOp)
    );

    select(&mut editor, 1, 1);
    editor
        .execute(Command::Block(BlockCommand::LineSpacing {
            value: 1.5,
            scope: SpacingScope::Current,
        }))
        .unwrap();
    assert_eq!(editor.content(), r#"<p style="line-height: 1.5;">a</p><p>b</p>"#);

    assert!(matches!(
        editor.execute(Command::Block(BlockCommand::ParagraphSpacing {
            pixels: f64::NAN,
            scope: SpacingScope::All,
        })),
        Err(CommandError::InvalidSpacing(_))
    ));
}

#[test]
fn test_insert_image_and_date() {
    let mut editor = editor_with("<div>ab</div>");
    select(&mut editor, 1, 1);
    editor
        .execute(Command::Insert(InsertCommand::Image {
            url: "pic.png".to_string(),
        }))
        .unwrap();
    assert_eq!(editor.content(), r#"<div>a<img src="pic.png">b</div>"#);

    assert_eq!(
        editor.execute(Command::Insert(InsertCommand::Image { url: String::new() })),
        Ok(CommandResult::NoOp)
    );

    let mut editor = editor_with("<div>x</div>");
    select(&mut editor, 1, 1);
    editor
        .execute(Command::Insert(InsertCommand::DateTime {
            text: " 2024-01-01".to_string(),
        }))
        .unwrap();
    assert_eq!(editor.plain_text(), "x 2024-01-01");
}

#[test]
fn test_view_commands() {
    let mut editor = Editor::new();
    editor
        .execute(Command::View(ViewCommand::SetZoom { scale: 1.25 }))
        .unwrap();
    assert_eq!(editor.zoom(), 1.25);

    assert_eq!(
        editor.execute(Command::View(ViewCommand::ToggleRtl)),
        Ok(CommandResult::Bool(true))
    );
    assert!(editor.document_state().rtl);
    assert_eq!(
        editor.execute(Command::View(ViewCommand::ToggleRtl)),
        Ok(CommandResult::Bool(false))
    );
}

#[test]
fn test_batch_stops_at_first_error() {
    let mut editor = Editor::new();
    editor.settle();
    let result = editor.execute_batch(vec![
        Command::Insert(InsertCommand::Text {
            text: "kept".to_string(),
        }),
        Command::Insert(InsertCommand::Table { rows: 0, cols: 0 }),
        Command::Insert(InsertCommand::Text {
            text: "never".to_string(),
        }),
    ]);
    assert_eq!(result, Err(CommandError::InvalidTableSize { rows: 0, cols: 0 }));
    assert_eq!(editor.content(), "<div>kept</div>");
}

#[test]
fn test_enter_and_backspace() {
    let mut editor = editor_with("<div>abcd</div>");
    select(&mut editor, 2, 2);
    editor.execute(Command::Insert(InsertCommand::Paragraph)).unwrap();
    assert_eq!(editor.content(), "<div>ab</div><div>cd</div>");

    editor
        .execute(Command::Insert(InsertCommand::DeleteBackward))
        .unwrap();
    assert_eq!(editor.content(), "<div>abcd</div>");
}

#[test]
fn test_copy_returns_selected_text() {
    let mut editor = editor_with("<div>hello <b>big</b> world</div>");
    assert_eq!(
        editor.execute(Command::Clipboard(ClipboardCommand::Copy)),
        Ok(CommandResult::NoOp)
    );

    select(&mut editor, 3, 9);
    assert_eq!(
        editor.execute(Command::Clipboard(ClipboardCommand::Copy)),
        Ok(CommandResult::Text("lo big".to_string()))
    );
    assert_eq!(editor.content(), "<div>hello <b>big</b> world</div>");
}

#[test]
fn test_cut_deletes_selection_and_is_undoable() {
    let mut editor = editor_with("<div>hello world</div>");
    editor.record();

    select(&mut editor, 5, 11);
    assert_eq!(
        editor.execute(Command::Clipboard(ClipboardCommand::Cut)),
        Ok(CommandResult::Text(" world".to_string()))
    );
    assert_eq!(editor.content(), "<div>hello</div>");

    assert!(editor.undo());
    editor.settle();
    assert_eq!(editor.content(), "<div>hello world</div>");
}

#[test]
fn test_paste_replaces_selection_and_splits_lines() {
    let mut editor = editor_with("<div>hello world</div>");
    select(&mut editor, 0, 5);
    assert_eq!(
        editor.execute(Command::Clipboard(ClipboardCommand::Paste {
            text: "bye".to_string(),
        })),
        Ok(CommandResult::Success)
    );
    assert_eq!(editor.content(), "<div>bye world</div>");

    let mut editor = editor_with("<div>ab</div>");
    let entries = editor.history().len();
    assert!(editor.paste("x\r\ny"));
    assert_eq!(editor.content(), "<div>abx</div><div>y</div>");
    assert_eq!(editor.history().len(), entries + 1);

    assert_eq!(
        editor.execute(Command::Clipboard(ClipboardCommand::Paste {
            text: String::new(),
        })),
        Ok(CommandResult::NoOp)
    );
}
