//! Read-only memory mapping of whole files.
//!
//! A [`FileMap`] exposes the bytes of a regular file directly in the address
//! space, without copying them into a buffer. The mapping is released by
//! [`FileMap::unmap`] or, on every other exit path, when the value is dropped.
//!
//! Empty files are valid: they produce a zero-length map without asking the
//! OS for a mapping at all.
//!
//! The mapping reflects the file as the OS pages it in. If another process
//! truncates the file while it is mapped, touching the vanished pages faults
//! (for example `SIGBUS` on Unix); callers that need a stable snapshot should
//! use [`crate::read_file`] instead.

use std::fmt;
use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::slice;

use log::{debug, warn};

use crate::core::{FsError, Result};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix::Map as SysMap;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows::Map as SysMap;

/// One live platform mapping of a non-empty file.
pub(crate) trait RawMap: Sized {
    /// Maps the first `len` bytes of `file` read-only. `len` is never zero.
    fn map(file: &File, len: usize) -> io::Result<Self>;

    fn as_ptr(&self) -> *const u8;

    fn unmap(self) -> io::Result<()>;
}

fn map_failure(path: &Path, err: io::Error) -> FsError {
    match err.kind() {
        io::ErrorKind::NotFound => FsError::NotFound {
            path: path.to_path_buf(),
        },
        _ => FsError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

/// Read-only view of a whole file.
///
/// Dereferences to `&[u8]`. The slice borrows from the `FileMap`, so it
/// cannot outlive the mapping in safe code.
///
/// ### Example:
/// ```no_run
/// use fsu_kit::FileMap;
///
/// let map = FileMap::map("/etc/hostname").unwrap();
/// println!("{} bytes", map.len());
/// let starts_with_a = map.first() == Some(&b'a');
/// map.unmap().unwrap();
/// ```
pub struct FileMap {
    path: PathBuf,
    len: usize,
    raw: Option<SysMap>,
}

impl FileMap {
    /// Opens `path` read-only and maps its whole content.
    ///
    /// # Returns
    /// * `Err(FsError::NotFound)` - `path` does not exist.
    /// * `Err(FsError::NotRegularFile)` - `path` is a directory or a special file.
    /// * `Err(FsError::Io)` - anything else: permission denied, file too large
    ///   for the address space, mapping failure.
    pub fn map<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path).map_err(|e| map_failure(path, e))?;
        if !metadata.is_file() {
            return Err(FsError::NotRegularFile {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|e| map_failure(path, e))?;
        let size = file.metadata().map_err(|e| map_failure(path, e))?.len();
        let len = usize::try_from(size).map_err(|_| FsError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("file does not fit into the address space"),
        })?;

        let raw = if len == 0 {
            None
        } else {
            Some(SysMap::map(&file, len).map_err(|e| map_failure(path, e))?)
        };
        debug!("mapped {} bytes of {}", len, path.display());

        Ok(Self {
            path: path.to_path_buf(),
            len,
            raw,
        })
    }

    /// The mapped file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Exact size of the file at the time it was mapped.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start of the mapped region.
    ///
    /// Dangling (but non-null and aligned) for an empty file. The pointer is
    /// invalid once the map is unmapped or dropped.
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        match &self.raw {
            // SAFETY: the backend mapped exactly `len` readable bytes, which stay
            // mapped until `raw` is released, and `raw` cannot be released
            // while this borrow of `self` is alive.
            Some(raw) => unsafe { slice::from_raw_parts(raw.as_ptr(), self.len) },
            None => &[],
        }
    }

    /// Releases the mapping and reports the OS result.
    pub fn unmap(mut self) -> Result<()> {
        self.release()
            .map_err(|e| FsError::from_io(&self.path, e))?;
        debug!("unmapped {}", self.path.display());
        Ok(())
    }

    fn release(&mut self) -> io::Result<()> {
        match self.raw.take() {
            Some(raw) => raw.unmap(),
            None => Ok(()),
        }
    }
}

impl Deref for FileMap {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for FileMap {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for FileMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileMap")
            .field("path", &self.path)
            .field("len", &self.len)
            .finish()
    }
}

impl Drop for FileMap {
    fn drop(&mut self) {
        if self.raw.is_none() {
            return;
        }
        match self.release() {
            Ok(()) => debug!("released mapping of {}", self.path.display()),
            Err(e) => warn!("failed to release mapping of {}: {}", self.path.display(), e),
        }
    }
}

/// Maps `path`, hands the bytes to `f`, and unmaps afterwards.
///
/// The mapping is released even if `f` panics. A failure to unmap is reported
/// only after `f` has returned normally.
pub fn with_map<P, F, R>(path: P, f: F) -> Result<R>
where
    P: AsRef<Path>,
    F: FnOnce(&[u8]) -> R,
{
    let map = FileMap::map(path)?;
    let result = f(map.as_slice());
    map.unmap()?;
    Ok(result)
}
