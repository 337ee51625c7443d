use std::ffi::OsString;
use std::io;
use std::mem;
use std::os::windows::ffi::{OsStrExt, OsStringExt};
use std::path::Path;

use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Storage::FileSystem::{
    FindClose, FindFirstFileW, FindNextFileW, WIN32_FIND_DATAW,
};

use super::RawDir;

/// Find handle. Opening it already yields the first entry.
pub(crate) struct Dir {
    handle: HANDLE,
}

fn name_of(data: &WIN32_FIND_DATAW) -> OsString {
    let len = data
        .cFileName
        .iter()
        .position(|&c| c == 0)
        .unwrap_or(data.cFileName.len());
    OsString::from_wide(&data.cFileName[..len])
}

fn search_pattern(path: &Path) -> io::Result<Vec<u16>> {
    let mut pattern: Vec<u16> = path.as_os_str().encode_wide().collect();
    if pattern.contains(&0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path contains a nul byte",
        ));
    }
    if !matches!(pattern.last(), Some(&c) if c == b'\\' as u16 || c == b'/' as u16) {
        pattern.push(b'\\' as u16);
    }
    pattern.extend([b'*' as u16, 0]);
    Ok(pattern)
}

impl RawDir for Dir {
    fn open(path: &Path) -> io::Result<(Self, Option<OsString>)> {
        let pattern = search_pattern(path)?;

        // SAFETY: WIN32_FIND_DATAW is plain data; all-zero is a valid value.
        let mut data: WIN32_FIND_DATAW = unsafe { mem::zeroed() };
        // SAFETY: `pattern` is nul-terminated and `data` is a valid out pointer.
        let handle = unsafe { FindFirstFileW(pattern.as_ptr(), &mut data) };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }

        Ok((Self { handle }, Some(name_of(&data))))
    }

    fn read_next(&mut self) -> Option<OsString> {
        // SAFETY: WIN32_FIND_DATAW is plain data; all-zero is a valid value.
        let mut data: WIN32_FIND_DATAW = unsafe { mem::zeroed() };
        // SAFETY: `handle` is an open find handle owned by `self`.
        if unsafe { FindNextFileW(self.handle, &mut data) } == 0 {
            return None;
        }
        Some(name_of(&data))
    }

    fn close(self) -> io::Result<()> {
        // SAFETY: the handle is open and is never used again after this call.
        if unsafe { FindClose(self.handle) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
