//! All error types for the xliffsync crate.
//!
//! These are returned from all fallible operations (object parsing, XLIFF
//! reading and writing, synchronization runs, imports).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A structural keyword that the enclosing object kind cannot contain.
    #[error("object cannot be parsed: `{keyword}` is not supported in object type {object_type}")]
    UnsupportedControl { keyword: String, object_type: String },

    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("the xml in {} is invalid at byte {offset}: {message}", .path.display())]
    MalformedDocument {
        path: PathBuf,
        offset: u64,
        message: String,
    },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("operation requires translation mode `{required}`, but `{active}` is active")]
    ModeMismatch { required: String, active: String },
}

impl Error {
    /// Creates an error for a control keyword the object kind does not allow.
    pub fn unsupported_control(keyword: impl Into<String>, object_type: impl ToString) -> Self {
        Error::UnsupportedControl {
            keyword: keyword.into(),
            object_type: object_type.to_string(),
        }
    }

    /// Creates a malformed document error pointing at a byte offset.
    pub fn malformed(path: impl Into<PathBuf>, offset: u64, message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            path: path.into(),
            offset,
            message: message.into(),
        }
    }

    /// Byte offset of a malformed document error, so callers can show the spot.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::MalformedDocument { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
