#![warn(missing_docs)]
//! `richedit-io` - File interchange for `richedit-core`.
//!
//! The editing engine only knows markup. This crate sits between it and the file system:
//!
//! - [`import_text`] turns file contents into markup (HTML passes through, plain text is
//!   escaped and line breaks become `<br>`).
//! - [`export_html`] / [`export_plain_text`] render markup for saving.
//! - [`save_file`] picks the format from the extension (`.txt` is plain text, everything else
//!   HTML; a bare name gains `.html`).
//! - [`RecentFiles`] keeps a small most-recently-used list that can be persisted as JSON.
//!
//! # Example
//!
//! ```rust
//! use richedit_io::{export_plain_text, import_text};
//!
//! let markup = import_text("first line\nsecond < third");
//! assert_eq!(markup, "first line<br>second &lt; third");
//! assert_eq!(export_plain_text(&markup), "first linesecond < third");
//! ```

pub mod convert;
mod error;
pub mod file;
pub mod recent;

pub use convert::{export_html, export_plain_text, import_text, looks_like_html};
pub use error::IoError;
pub use file::{SaveFormat, load_file, open_into, resolve_save_path, save_file, save_from};
pub use recent::{DEFAULT_RECENT_FILES, RecentFiles};
