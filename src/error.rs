use std::fmt;
use std::io;
use std::path::PathBuf;

/// Unified error type for the merge reader and its run files.
#[derive(Debug)]
pub enum Error {
    /// IO error from a source or run file.
    Io(io::Error),
    /// Malformed run file (bad magic, truncated record, CRC mismatch, bad payload).
    Corruption(String),
    /// A source could not be opened, or its first read failed, while building
    /// a merge reader. No reader is returned.
    Open {
        /// Index of the failing source in construction order.
        index: usize,
        /// Path of the source, when it was opened from one.
        path: Option<PathBuf>,
        source: Box<Error>,
    },
    /// A merge reader needs at least one source.
    NoSources,
    /// An encoded block does not fit in a run file record.
    RecordTooLarge(usize),
}

impl Error {
    /// Wrap an error raised while setting up source `index`.
    pub(crate) fn open(index: usize, path: Option<PathBuf>, err: Error) -> Self {
        Error::Open {
            index,
            path,
            source: Box::new(err),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Corruption(msg) => write!(f, "Corruption: {msg}"),
            Error::Open {
                index,
                path: Some(path),
                source,
            } => write!(f, "Cannot open source {index} ({}): {source}", path.display()),
            Error::Open {
                index,
                path: None,
                source,
            } => write!(f, "Cannot open source {index}: {source}"),
            Error::NoSources => write!(f, "No sources to merge"),
            Error::RecordTooLarge(len) => write!(f, "Record of {len} bytes is too large"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Open { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
