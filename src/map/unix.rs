use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;
use std::ptr::{self, NonNull};

use super::RawMap;

/// Private read-only `mmap` of a file. The descriptor is not needed once the
/// mapping exists, so only the region is kept.
pub(crate) struct Map {
    ptr: NonNull<u8>,
    len: usize,
}

impl RawMap for Map {
    fn map(file: &File, len: usize) -> io::Result<Self> {
        // SAFETY: a fresh read-only mapping of a valid descriptor; the kernel
        // picks the address.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_PRIVATE,
                file.as_raw_fd(),
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        let ptr = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| io::Error::other("mmap returned a null address"))?;

        Ok(Self { ptr, len })
    }

    fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    fn unmap(self) -> io::Result<()> {
        // SAFETY: the region was returned by `mmap` with this exact length and
        // is never touched again after this call.
        if unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.len) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
