//! Unified error type for all store and directory operations.

/// Things that can go wrong when reading, replacing or extracting a document.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The backing file exists but could not be read or written.
    StorageUnavailable(String),
    /// Bytes are present but are not valid JSON, or not a JSON array.
    /// Carries the underlying parse message.
    CorruptDocument(String),
    /// Lenient extraction found no `[` ... `]` pair in the text.
    NoArrayFound,
    /// Lenient extraction parsed a value that is not an array.
    NotAnArray,
    /// Failed to turn the document into bytes.
    Serialize(String),
    /// A conditional replace lost the race against another writer.
    Conflict {
        /// Revision the caller based its change on.
        expected: u64,
        /// Revision the store was actually at.
        actual: u64,
    },
    /// A tag-conditional replace found different bytes on disk than the
    /// caller had read.
    Stale {
        /// Content tag the caller based its change on.
        expected: String,
        /// Content tag of the file when the replace was attempted.
        actual: String,
    },
    /// Bad configuration (invalid path, port, flag, etc.).
    Config(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::StorageUnavailable(msg) => write!(f, "storage unavailable: {msg}"),
            Error::CorruptDocument(msg) => write!(f, "corrupt document: {msg}"),
            Error::NoArrayFound => write!(f, "no JSON array found in text"),
            Error::NotAnArray => write!(f, "extracted JSON value is not an array"),
            Error::Serialize(msg) => write!(f, "serialization error: {msg}"),
            Error::Conflict { expected, actual } => write!(
                f,
                "revision conflict: expected {expected}, store is at {actual}"
            ),
            Error::Stale { expected, actual } => write!(
                f,
                "document changed since it was read: expected tag {expected}, found {actual}"
            ),
            Error::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StorageUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::StorageUnavailable(err.to_string())
        } else {
            // syntax, eof and data (wrong shape) all mean the bytes can't be
            // trusted as a document
            Error::CorruptDocument(err.to_string())
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
