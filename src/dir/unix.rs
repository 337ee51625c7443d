use std::ffi::{CStr, CString, OsString};
use std::io;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::Path;
use std::ptr::NonNull;

use super::RawDir;

/// POSIX directory stream. Nothing is read until the first `readdir`.
pub(crate) struct Dir {
    stream: NonNull<libc::DIR>,
}

impl RawDir for Dir {
    fn open(path: &Path) -> io::Result<(Self, Option<OsString>)> {
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "path contains a nul byte")
        })?;

        // SAFETY: `c_path` is a valid nul-terminated string for the duration of the call.
        let stream = unsafe { libc::opendir(c_path.as_ptr()) };
        let stream = NonNull::new(stream).ok_or_else(io::Error::last_os_error)?;

        Ok((Self { stream }, None))
    }

    fn read_next(&mut self) -> Option<OsString> {
        // SAFETY: `stream` came from a successful `opendir` and is closed only
        // by `close`, which consumes `self`.
        let entry = unsafe { libc::readdir(self.stream.as_ptr()) };
        if entry.is_null() {
            return None;
        }
        // SAFETY: a non-null `readdir` result points to a valid entry with a
        // nul-terminated `d_name`, valid until the next call on this stream.
        // The name is copied out before returning.
        let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) };
        Some(OsString::from_vec(name.to_bytes().to_vec()))
    }

    fn close(self) -> io::Result<()> {
        // SAFETY: the stream is open and is never used again after this call.
        if unsafe { libc::closedir(self.stream.as_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
