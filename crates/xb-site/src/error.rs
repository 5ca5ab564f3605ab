//! Error type for page resolution and rendering.

use std::path::PathBuf;

/// Error returned when loading or rendering a site file fails.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Path escapes the base path (`..` segment, absolute path, drive prefix).
    #[error("Invalid file path: {0}")]
    InvalidPath(String),
    /// Resolved file does not exist.
    #[error("File does not exist: {}", .0.display())]
    NotFound(PathBuf),
    /// Template failed to compile or execute.
    #[error("Failed to render {path}: {source:#}")]
    Template {
        /// Path relative to the base path.
        path: String,
        /// Underlying template engine error.
        #[source]
        source: minijinja::Error,
    },
    /// Site configuration file is not valid TOML.
    #[error("Invalid site configuration {}: {source}", .path.display())]
    Config {
        /// Offending config file.
        path: PathBuf,
        /// Parse error.
        #[source]
        source: toml::de::Error,
    },
    /// Templates loading each other nested past the limit.
    #[error("Template nesting too deep while loading {0}")]
    TooDeep(String),
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiteError {
    /// Whether this error means "the file isn't there" rather than "the file is broken".
    ///
    /// Menus treat both a missing file and an unusable name as "no menu".
    pub(crate) fn is_absent(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidPath(_))
    }
}
