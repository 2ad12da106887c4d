//! Loading and saving documents.

use std::fs;
use std::path::{Path, PathBuf};

use richedit_core::Editor;
use tracing::debug;

use crate::IoError;
use crate::convert::{export_html, export_plain_text, import_text};

/// On-disk format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveFormat {
    /// A standalone HTML document.
    #[default]
    Html,
    /// Tag-stripped plain text (`.txt`).
    Text,
}

impl SaveFormat {
    /// `.txt` (any case) saves plain text; every other path saves HTML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => SaveFormat::Text,
            _ => SaveFormat::Html,
        }
    }

    /// Render editor markup for this format.
    pub fn render(self, content: &str, title: &str) -> String {
        match self {
            SaveFormat::Html => export_html(content, title),
            SaveFormat::Text => export_plain_text(content),
        }
    }
}

/// The path a document is actually written to: `.html` is appended when there is no extension.
pub fn resolve_save_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("html")
    }
}

/// Read a file and convert it to editor markup.
pub fn load_file(path: impl AsRef<Path>) -> Result<String, IoError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
    debug!(path = %path.display(), bytes = raw.len(), "file loaded");
    Ok(import_text(&raw))
}

/// Write editor markup to `path` in the format its extension selects.
///
/// Returns the path written, which gains `.html` if it had no extension.
pub fn save_file(path: impl AsRef<Path>, content: &str) -> Result<PathBuf, IoError> {
    let target = resolve_save_path(path.as_ref());
    let format = SaveFormat::from_path(&target);
    let title = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let rendered = format.render(content, &title);
    fs::write(&target, rendered).map_err(|e| IoError::io(&target, e))?;
    debug!(path = %target.display(), ?format, "file saved");
    Ok(target)
}

/// Load `path` into `editor`. The loaded content becomes the undo floor and the saved state.
pub fn open_into(editor: &mut Editor, path: impl AsRef<Path>) -> Result<(), IoError> {
    let markup = load_file(path)?;
    editor.set_content(&markup);
    editor.record();
    editor.mark_saved();
    Ok(())
}

/// Save `editor`'s content to `path` and mark it saved. Returns the path written.
pub fn save_from(editor: &mut Editor, path: impl AsRef<Path>) -> Result<PathBuf, IoError> {
    let written = save_file(path, &editor.content())?;
    editor.mark_saved();
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_by_extension() {
        assert_eq!(SaveFormat::from_path(Path::new("a.TXT")), SaveFormat::Text);
        assert_eq!(SaveFormat::from_path(Path::new("a.htm")), SaveFormat::Html);
        assert_eq!(SaveFormat::from_path(Path::new("notes")), SaveFormat::Html);
    }

    #[test]
    fn test_missing_extension_gets_html() {
        assert_eq!(
            resolve_save_path(Path::new("dir/notes")),
            PathBuf::from("dir/notes.html")
        );
        assert_eq!(
            resolve_save_path(Path::new("dir/notes.txt")),
            PathBuf::from("dir/notes.txt")
        );
    }
}
