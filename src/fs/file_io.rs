//! Whole-file read/write and simple existence probes.
//!
//! Every call is a plain blocking operation on the host filesystem. Nothing is
//! retried, and a failed [`copy_file`] may leave its destination partially
//! written.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::core::{FsError, Result};

/// Reads the entire contents of a file into a byte vector.
///
/// The buffer is allocated from the size probed before reading, so a
/// well-behaved file is read with a single allocation.
///
/// # Returns
/// * `Ok(Vec<u8>)` - File content. An empty file yields an empty vector.
/// * `Err(FsError)` - `NotFound`, `PermissionDenied`, or `Io` for anything
///   else (including reading a directory).
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| FsError::from_io(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| FsError::from_io(path, e))?
        .len();
    let size = usize::try_from(size).map_err(|_| FsError::Io {
        path: path.to_path_buf(),
        source: io::Error::other("file does not fit into memory"),
    })?;

    let mut content = Vec::with_capacity(size);
    file.read_to_end(&mut content)
        .map_err(|e| FsError::from_io(path, e))?;
    debug!("read {} bytes from {}", content.len(), path.display());

    Ok(content)
}

/// Creates or truncates the file at `path` and writes `data` into it.
///
/// # Returns
/// * `Ok(usize)` - Number of bytes written, always `data.len()`.
/// * `Err(FsError::ShortWrite)` - The file accepted fewer bytes than requested.
/// * `Err(FsError)` - Any other failure to create or write the file.
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<usize> {
    let path = path.as_ref();
    let mut file = File::create(path).map_err(|e| FsError::from_io(path, e))?;
    let written = write_through(path, &mut file, data)?;
    debug!("wrote {} bytes to {}", written, path.display());
    Ok(written)
}

fn write_through<W: Write>(path: &Path, writer: &mut W, data: &[u8]) -> Result<usize> {
    let written = write_all_to(writer, data).map_err(|e| FsError::from_io(path, e))?;
    writer.flush().map_err(|e| FsError::from_io(path, e))?;
    if written != data.len() {
        return Err(FsError::ShortWrite {
            path: path.to_path_buf(),
            written,
            expected: data.len(),
        });
    }
    Ok(written)
}

/// Copies `src` to `dst` by reading the whole source and writing it out.
///
/// No atomic replace is attempted: if writing fails, `dst` is left in
/// whatever state the failed write produced.
pub fn copy_file<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Result<()> {
    let content = read_file(src)?;
    write_file(dst, &content)?;
    Ok(())
}

/// Returns the size of a regular file in bytes.
pub fn file_size<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|e| FsError::from_io(path, e))?;
    if !metadata.is_file() {
        return Err(FsError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }
    Ok(metadata.len())
}

/// Returns true if anything (file, directory, device...) exists at `path`.
pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists()
}

/// Returns true only if `path` exists and is a directory.
pub fn is_directory<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_dir()
}

/// Returns true only if `path` exists and is a regular file.
pub fn is_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}

/// Directory for temporary files of the current process.
pub fn temp_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Reads from `reader` until `buf` is full or the stream ends.
/// Returns the number of bytes read; a short count means end of stream.
pub fn read_exact_from<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Writes `buf` to `writer` until everything is accepted or the writer
/// stops taking bytes. Returns the number of bytes written.
pub fn write_all_to<W: Write>(writer: &mut W, buf: &[u8]) -> io::Result<usize> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}
