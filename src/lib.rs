//! A small, portable layer over filesystem primitives that differ between
//! operating systems.
//!
//! ### Overview
//!
//! `fsu-kit` gives upstream code one surface for the handful of filesystem
//! operations it needs, whatever the host OS:
//!
//! - **Path components**: directory, leaf name, base name and extension of a
//!   path, by plain splitting on `/` and `\`, byte-exact for non-UTF-8 names.
//! - **Whole-file I/O**: read a file into a buffer, write a buffer to a file,
//!   copy one file to another, probe existence and type.
//! - **Directory cursors**: [`DirCursor`] enumerates the children of a
//!   directory one name at a time, never yielding `.` or `..`.
//! - **File mappings**: [`FileMap`] exposes a file's bytes read-only in memory
//!   without copying them.
//!
//! **Key ideas**:
//! - **Scoped release**: cursors and mappings own their OS resources and free
//!   them on drop; `close()` and `unmap()` do it explicitly and report errors.
//! - **Typed failures**: every operation returns [`Result`] with an
//!   [`FsError`] naming what went wrong and on which path.
//! - **Blocking and single-owner**: no background threads, no async, no
//!   internal retries.
//!
//! ### Example:
//! ```no_run
//! use std::path::Path;
//! use fsu_kit::{DirCursor, FileMap, extension_of};
//!
//! let logs = Path::new("/var/log");
//! let mut cursor = DirCursor::open(logs).unwrap();
//! while let Some(name) = cursor.next_entry() {
//!     if extension_of(&name) == "log" {
//!         let map = FileMap::map(logs.join(&name)).unwrap();
//!         println!("{:?}: {} bytes", name, map.len());
//!     }
//! }
//! cursor.close().unwrap();
//! ```

mod core;
mod dir;
mod fs;
mod map;

pub use crate::core::{FsError, FsErrorKind, PATH_BUF_MAX, Result};
pub use crate::dir::{DirCursor, list_dir, with_dir};
pub use crate::fs::{
    base_name_of, copy_file, directory_of, extension_of, file_exists, file_size, is_directory,
    is_file, leaf_name_of, read_exact_from, read_file, temp_dir, write_all_to, write_file,
};
pub use crate::map::{FileMap, with_map};
