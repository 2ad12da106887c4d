use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing documents and the recent-files list.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error on {}: {source}", path.display())]
    /// The file system refused a read or write.
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    #[error("file no longer exists: {}", .0.display())]
    /// A recent file was opened after it disappeared.
    Missing(PathBuf),

    #[error("recent files list is malformed: {0}")]
    /// The persisted recent-files list could not be parsed.
    RecentList(#[from] serde_json::Error),
}

impl IoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
