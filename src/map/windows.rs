use std::fs::File;
use std::io;
use std::os::windows::io::AsRawHandle;
use std::ptr;

use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
use windows_sys::Win32::System::Memory::{
    CreateFileMappingW, FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, PAGE_READONLY,
    UnmapViewOfFile,
};

use super::RawMap;

/// A read-only view plus the file-mapping object backing it. Both are
/// released together.
pub(crate) struct Map {
    mapping: HANDLE,
    view: MEMORY_MAPPED_VIEW_ADDRESS,
}

impl RawMap for Map {
    fn map(file: &File, len: usize) -> io::Result<Self> {
        // SAFETY: the file handle is valid for the duration of the call; a
        // zero maximum size maps the whole file.
        let mapping = unsafe {
            CreateFileMappingW(
                file.as_raw_handle() as HANDLE,
                ptr::null(),
                PAGE_READONLY,
                0,
                0,
                ptr::null(),
            )
        };
        if mapping.is_null() {
            return Err(io::Error::last_os_error());
        }

        // SAFETY: `mapping` is a valid read-only mapping object covering at
        // least `len` bytes.
        let view = unsafe { MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, len) };
        if view.Value.is_null() {
            let err = io::Error::last_os_error();
            // SAFETY: `mapping` is open and not used after this.
            unsafe { CloseHandle(mapping) };
            return Err(err);
        }

        Ok(Self { mapping, view })
    }

    fn as_ptr(&self) -> *const u8 {
        self.view.Value as *const u8
    }

    fn unmap(self) -> io::Result<()> {
        // SAFETY: `view` came from `MapViewOfFile` and is not used again.
        let unmapped = unsafe { UnmapViewOfFile(self.view) } != 0;
        let unmap_err = (!unmapped).then(io::Error::last_os_error);

        // SAFETY: `mapping` is open and not used again.
        let closed = unsafe { CloseHandle(self.mapping) } != 0;
        if let Some(err) = unmap_err {
            return Err(err);
        }
        if !closed {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
