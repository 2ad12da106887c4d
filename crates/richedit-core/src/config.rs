//! Editor configuration.
//!
//! [`EditorConfig`] collects the tunables of an editing session. Every field has a default, so a
//! YAML document only needs to name what it changes:
//!
//! ```yaml
//! max_history_entries: 200
//! highlight_color: "#FFD700"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::history::DEFAULT_MAX_ENTRIES;
use crate::search::HighlightStyle;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    /// Reading the configuration file failed.
    Io(#[from] std::io::Error),

    #[error("invalid value for `{field}`: {reason}")]
    /// A field was present but out of range.
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Per-session tunables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Maximum number of history snapshots kept; the oldest is dropped beyond it.
    pub max_history_entries: usize,
    /// Vertical pointer travel (px) needed before a dragged table moves one block.
    pub drag_threshold_px: f64,
    /// Indent/outdent step (px) applied to `margin-left`.
    pub indent_step_px: i64,
    /// Class carried by search highlight wrappers.
    pub highlight_class: String,
    /// Background colour of search highlights.
    pub highlight_color: String,
    /// Text placed into newly created table cells.
    pub cell_placeholder: String,
    /// Zoom factor a new session starts with.
    pub initial_zoom: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let highlight = HighlightStyle::default();
        Self {
            max_history_entries: DEFAULT_MAX_ENTRIES,
            drag_threshold_px: 30.0,
            indent_step_px: 40,
            highlight_class: highlight.class,
            highlight_color: highlight.color,
            cell_placeholder: " ".to_string(),
            initial_zoom: 1.0,
        }
    }
}

impl EditorConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Check field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "max_history_entries",
                reason: "must be at least 1".into(),
            });
        }
        if !self.drag_threshold_px.is_finite() || self.drag_threshold_px < 0.0 {
            return Err(ConfigError::Invalid {
                field: "drag_threshold_px",
                reason: format!("{} is not a non-negative number", self.drag_threshold_px),
            });
        }
        if self.indent_step_px <= 0 {
            return Err(ConfigError::Invalid {
                field: "indent_step_px",
                reason: "must be positive".into(),
            });
        }
        if self.highlight_class.trim().is_empty()
            || self.highlight_class.contains(char::is_whitespace)
        {
            return Err(ConfigError::Invalid {
                field: "highlight_class",
                reason: "must be a single class name".into(),
            });
        }
        if !self.initial_zoom.is_finite() || self.initial_zoom <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "initial_zoom",
                reason: format!("{} is not a positive number", self.initial_zoom),
            });
        }
        Ok(())
    }

    /// Highlight appearance derived from this configuration.
    pub fn highlight_style(&self) -> HighlightStyle {
        HighlightStyle {
            class: self.highlight_class.clone(),
            color: self.highlight_color.clone(),
        }
    }
}
