//! Error types for Tableflow.
//!
//! The modification engine itself never fails: out-of-range or unknown
//! targets are ignored and logged at `trace`. Errors only surface where a
//! caller asks for something that must exist, such as a cell for an index
//! path or a configuration file.

use std::path::PathBuf;

use crate::model::IndexPath;

/// Result type alias for Tableflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while binding a content adapter to a view.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The section index does not exist in the committed model.
    #[error("section {section} out of range ({count} sections)")]
    SectionOutOfRange { section: usize, count: usize },

    /// The row index does not exist in its section.
    #[error("row {path} out of range ({count} rows in section)")]
    RowOutOfRange { path: IndexPath, count: usize },

    /// No render recipe is registered for the content's type.
    #[error("no render recipe registered for content type '{type_name}'")]
    UnregisteredContent { type_name: &'static str },

    /// The view had no reusable view for the recipe's identifier.
    #[error("view returned no reusable view for identifier '{reuse_identifier}'")]
    NoReusableView { reuse_identifier: String },
}

/// Errors raised while loading adapter configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration text is not valid.
    #[error("invalid adapter configuration: {message}")]
    Parse { message: String },

    /// The configuration could not be serialized.
    #[error("failed to serialize adapter configuration: {message}")]
    Serialize { message: String },

    /// The configuration file could not be read.
    #[error("failed to read adapter configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Any error raised by Tableflow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Binding error.
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
