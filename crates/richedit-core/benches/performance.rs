use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use richedit_core::{Command, Editor, FormatCommand, InlineStyle, SelectionCommand};

fn large_document(paragraphs: usize) -> String {
    let mut out = String::with_capacity(paragraphs * 96);
    for i in 0..paragraphs {
        out.push_str(&format!(
            "<p>{i:05} the quick <b>brown</b> fox jumps over the lazy dog (richedit benchmark)</p>"
        ));
    }
    out
}

fn loaded(markup: &str) -> Editor {
    let mut editor = Editor::new();
    editor.settle();
    editor.set_content(markup);
    editor
}

fn bench_load(c: &mut Criterion) {
    let markup = large_document(5_000);
    c.bench_function("load/5k_paragraphs", |b| {
        b.iter(|| {
            let editor = loaded(black_box(&markup));
            black_box(editor.word_count());
        })
    });
}

fn bench_typing_with_history(c: &mut Criterion) {
    let markup = large_document(1_000);
    c.bench_function("typing/100_keystrokes_1k_paragraphs", |b| {
        b.iter_batched(
            || {
                let mut editor = loaded(&markup);
                editor.set_selection(500, 500);
                editor
            },
            |mut editor| {
                for _ in 0..100 {
                    editor.type_text("x");
                }
                black_box(editor.history().len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_search_highlight(c: &mut Criterion) {
    let markup = large_document(5_000);
    c.bench_function("search/highlight_and_clear", |b| {
        b.iter_batched(
            || loaded(&markup),
            |mut editor| {
                let count = editor.search(black_box("fox"));
                editor.clear_search();
                black_box(count);
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_replace_all(c: &mut Criterion) {
    let markup = large_document(5_000);
    c.bench_function("search/replace_all", |b| {
        b.iter_batched(
            || loaded(&markup),
            |mut editor| {
                black_box(editor.replace_all("lazy", "sleepy"));
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_undo_redo(c: &mut Criterion) {
    let markup = large_document(1_000);
    c.bench_function("history/undo_redo_20_steps", |b| {
        b.iter_batched(
            || {
                let mut editor = loaded(&markup);
                editor.set_selection(0, 0);
                for _ in 0..20 {
                    editor.type_text("y");
                }
                editor
            },
            |mut editor| {
                for _ in 0..20 {
                    editor.undo();
                    editor.settle();
                }
                for _ in 0..20 {
                    editor.redo();
                    editor.settle();
                }
                black_box(editor.content().len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_toggle_bold(c: &mut Criterion) {
    let markup = large_document(1_000);
    c.bench_function("format/toggle_bold_whole_document", |b| {
        b.iter_batched(
            || {
                let mut editor = loaded(&markup);
                editor
                    .execute(Command::Selection(SelectionCommand::SelectAll))
                    .unwrap();
                editor
            },
            |mut editor| {
                editor
                    .execute(Command::Format(FormatCommand::Toggle(InlineStyle::Bold)))
                    .unwrap();
                black_box(editor.document_state().version);
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_load,
    bench_typing_with_history,
    bench_search_highlight,
    bench_replace_all,
    bench_undo_redo,
    bench_toggle_bold
);
criterion_main!(benches);
