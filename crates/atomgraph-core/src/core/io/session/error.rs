use crate::core::models::error::StructureError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Session version {version} is newer than the newest supported version {newest}")]
    UnsupportedVersion { version: i32, newest: i32 },

    #[error("Invalid session version {0}")]
    InvalidVersion(i32),

    #[error("Session data ended early while reading {context}")]
    Truncated { context: &'static str },

    #[error(
        "Session data ended inside a {record} record; its layout needs {ints} ints and {floats} floats"
    )]
    RecordTruncated {
        record: &'static str,
        ints: usize,
        floats: usize,
    },

    #[error("Session data has {ints} unread ints and {floats} unread floats")]
    TrailingData { ints: usize, floats: usize },

    #[error("Session file has bytes after the float block")]
    TrailingBytes,

    #[error("Value {value} does not fit in a session int")]
    TooLarge { value: usize },

    #[error("Invalid {field} value {value} in session data")]
    InvalidValue { field: &'static str, value: i64 },

    #[error("Session references {kind} {index}, but only {count} exist")]
    BadIndex {
        kind: &'static str,
        index: usize,
        count: usize,
    },

    #[error("Inconsistent session data: {0}")]
    Inconsistent(String),

    #[error(transparent)]
    Structure(#[from] StructureError),
}
