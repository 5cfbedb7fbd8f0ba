//! Error types for the dirattr core

use std::io;

/// Core error type, aligned with the POSIX xattr error surface.
///
/// Semantic absence of an attribute (or of the whole attribute directory) is
/// always [`FsError::NoData`], never a generic I/O or not-found failure, so
/// callers can tell "no such attribute" apart from a storage error. Errors
/// reported by the backing object store are passed through unchanged.
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    /// The attribute does not exist (ENODATA)
    #[error("no data")]
    NoData,
    /// The caller's listing buffer is too small (ERANGE)
    #[error("result does not fit in buffer")]
    Range,
    /// The attribute namespace is not registered (EOPNOTSUPP)
    #[error("not supported")]
    NotSupported,
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("access denied")]
    AccessDenied,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("name not allowed")]
    InvalidName,
    #[error("not a directory")]
    NotADirectory,
    #[error("is a directory")]
    IsADirectory,
    #[error("no space left")]
    NoSpace,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type FsResult<T> = Result<T, FsError>;
