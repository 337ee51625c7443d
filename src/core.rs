use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Largest path the historical fixed-size buffers could hold.
/// Nothing in this crate truncates to it; it is exported for callers that
/// must bound paths for an external interface.
pub const PATH_BUF_MAX: usize = 2048;

pub type Result<T> = std::result::Result<T, FsError>;

/// Failure signals of every operation in the crate.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("access denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("{} is not a regular file", path.display())]
    NotRegularFile { path: PathBuf },

    #[error("short write to {}: {written} of {expected} bytes", path.display())]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fieldless view of [`FsError`], handy for `match` and assertions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FsErrorKind {
    NotFound,
    PermissionDenied,
    NotRegularFile,
    ShortWrite,
    Io,
}

impl FsError {
    /// Classifies an OS error raised while working on `path`.
    pub fn from_io<P: AsRef<Path>>(path: P, err: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path },
            _ => FsError::Io { path, source: err },
        }
    }

    pub fn kind(&self) -> FsErrorKind {
        match self {
            FsError::NotFound { .. } => FsErrorKind::NotFound,
            FsError::PermissionDenied { .. } => FsErrorKind::PermissionDenied,
            FsError::NotRegularFile { .. } => FsErrorKind::NotRegularFile,
            FsError::ShortWrite { .. } => FsErrorKind::ShortWrite,
            FsError::Io { .. } => FsErrorKind::Io,
        }
    }

    /// Path the failed operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            FsError::NotFound { path }
            | FsError::PermissionDenied { path }
            | FsError::NotRegularFile { path }
            | FsError::ShortWrite { path, .. }
            | FsError::Io { path, .. } => path,
        }
    }
}
