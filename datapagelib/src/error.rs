//! Error types for datapagelib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while projecting tables or building pages
#[derive(Error, Debug)]
pub enum DatapageError {
    /// A value could not be coerced to the numeric type its formatter needs
    #[error("cannot format {value} as {target}")]
    Format { value: String, target: &'static str },

    /// No column or descriptor with this name
    #[error("field '{0}' not found")]
    FieldNotFound(String),

    /// Two descriptors share a name
    #[error("duplicate field name '{0}'")]
    DuplicateField(String),

    /// Identifier contains characters outside `[0-9A-Za-z_]`
    #[error("invalid name '{0}': only ASCII letters, digits and '_' are allowed")]
    InvalidName(String),

    /// Output file name is empty after sanitization
    #[error("invalid basename for output file: '{0}.html'")]
    InvalidOutputName(String),

    /// Publishing would overwrite an existing file
    #[error("file exists: {0}")]
    FileExists(PathBuf),

    /// Failed to read an input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the output document
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A dataset row does not match the number of columns
    #[error("row {row} has {found} values, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A field declaration is inconsistent
    #[error("invalid field config: {0}")]
    Config(String),

    /// Template registration or rendering failed
    #[error("template error: {0}")]
    Template(String),

    /// JSON input could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
