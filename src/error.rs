use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure conditions surfaced by the transport and by the client layer.
///
/// Every transport failure propagates unchanged to the caller; the only
/// downgrade in the whole crate is `NotFound` under a delete-family `force`
/// flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}: no such file or directory")]
    NotFound(String),
    #[error("{0}: already exists")]
    AlreadyExists(String),
    #[error("{0}: permission denied")]
    PermissionDenied(String),
    #[error("{0}: not a directory")]
    NotADirectory(String),
    #[error("{0}: directory not empty")]
    NotEmpty(String),
    #[error("working directory exceeds the name buffer")]
    NameTooLong,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("connection failed: {0}")]
    Connection(String),
    /// Any unclassified failure, including plain I/O
    #[error("I/O: {0}")]
    Io(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
