//! Error types for tarstore.
//!
//! Every storager operation returns [`Result<T>`]. Failures coming from the
//! byte source or the tar decoder are wrapped with the operation name and the
//! requested path, so callers can tell which call failed without parsing
//! messages.
//!
//! End of a listing is not an error: the object iterator simply returns
//! `None`.

use std::io;

use crate::archive::ObjectMode;

/// Result type alias for tarstore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the storager and its configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration is missing a required option, names an unknown one, or
    /// carries a value that cannot be used.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A requested path or prefix can never name an archive entry.
    #[error("invalid path {0:?}")]
    InvalidPath(String),

    /// The configured archive location could not be opened.
    #[error("cannot open {location}: {source}")]
    LocationResolution {
        location: String,
        #[source]
        source: io::Error,
    },

    /// No entry in the archive normalizes to the requested path.
    #[error("{op} {path}: object not found")]
    ObjectNotFound { op: &'static str, path: String },

    /// The entry exists but its mode does not allow the operation.
    #[error("{op} {path}: invalid object mode {mode}")]
    InvalidObjectMode {
        op: &'static str,
        path: String,
        mode: ObjectMode,
    },

    /// The archive ended before the entry's declared size was copied.
    #[error("{op} {path}: unexpected end of archive, copied {copied} of {expected} bytes")]
    UnexpectedEof {
        op: &'static str,
        path: String,
        expected: u64,
        copied: u64,
    },

    /// Decoding or I/O failure while scanning or copying.
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(op: &'static str, path: &str, source: io::Error) -> Self {
        Error::Io {
            op,
            path: path.to_string(),
            source,
        }
    }

    pub(crate) fn not_found(op: &'static str, path: &str) -> Self {
        Error::ObjectNotFound {
            op,
            path: path.to_string(),
        }
    }

    /// Returns `true` for [`Error::ObjectNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound { .. })
    }
}
