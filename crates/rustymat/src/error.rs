//! Error types for the high-level API.

use std::fmt;

use rustymat_format::error::FormatError;

/// Errors that can occur when using the high-level API.
#[derive(Debug)]
pub enum Error {
    /// I/O error from the filesystem or stream.
    Io(std::io::Error),
    /// Low-level format error.
    Format(FormatError),
    /// No variable with the requested name exists in the file.
    VariableNotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Format(e) => write!(f, "MAT-file format error: {e}"),
            Error::VariableNotFound(name) => write!(f, "variable not found: {name}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Format(e) => Some(e),
            Error::VariableNotFound(_) => None,
        }
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
