//! Directory enumeration through a single cursor type.
//!
//! Platforms disagree on when the first entry shows up: a POSIX directory
//! stream yields nothing until the first `readdir`, while a Windows find
//! handle already carries the first entry when it is opened. [`DirCursor`]
//! hides that difference. Opening never yields an entry; the first call to
//! [`DirCursor::next_entry`] yields the first real child, whichever backend is
//! underneath.
//!
//! ### Guarantees:
//! - **No pseudo-entries**: `.` and `..` are never returned, on any platform.
//! - **No ordering**: entries come in whatever order the OS enumerates them.
//! - **Scoped release**: the OS handle is released by [`DirCursor::close`] or,
//!   on every other exit path, when the cursor is dropped.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};

use crate::core::{FsError, Result};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix::Dir as SysDir;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows::Dir as SysDir;

/// One open platform directory handle.
pub(crate) trait RawDir: Sized {
    /// Opens the directory at `path`.
    /// Backends whose open call already produces the first entry hand it back
    /// as the second tuple element.
    fn open(path: &Path) -> io::Result<(Self, Option<OsString>)>;

    /// Next raw entry name, pseudo-entries included. `None` at the end.
    fn read_next(&mut self) -> Option<OsString>;

    fn close(self) -> io::Result<()>;
}

/// Backend-independent cursor state: the open handle plus the buffered entry
/// some backends deliver at open time.
struct Entries<D: RawDir> {
    raw: Option<D>,
    pending: Option<OsString>,
    exhausted: bool,
}

impl<D: RawDir> Entries<D> {
    fn open(path: &Path) -> io::Result<Self> {
        let (raw, first) = D::open(path)?;
        Ok(Self {
            raw: Some(raw),
            pending: first,
            exhausted: false,
        })
    }

    fn next_name(&mut self) -> Option<OsString> {
        loop {
            let name = match self.pending.take() {
                Some(name) => name,
                None => {
                    if self.exhausted {
                        return None;
                    }
                    match self.raw.as_mut()?.read_next() {
                        Some(name) => name,
                        None => {
                            self.exhausted = true;
                            return None;
                        }
                    }
                }
            };
            if name == "." || name == ".." {
                continue;
            }
            return Some(name);
        }
    }

    fn is_open(&self) -> bool {
        self.raw.is_some()
    }

    fn close(&mut self) -> io::Result<()> {
        self.pending = None;
        self.exhausted = true;
        match self.raw.take() {
            Some(raw) => raw.close(),
            None => Ok(()),
        }
    }
}

/// A lazy, non-restartable sequence of the child names of one directory.
///
/// ### Usage notes:
/// - Not thread-safe: one owner, one thread, for the whole lifetime.
/// - Names are returned as owned [`OsString`]s of exact length, never
///   truncated and never re-encoded.
/// - Independent cursors over the same directory do not interact.
///
/// ### Example:
/// ```no_run
/// use fsu_kit::DirCursor;
///
/// let mut cursor = DirCursor::open("/etc").unwrap();
/// while let Some(name) = cursor.next_entry() {
///     println!("{}", name.to_string_lossy());
/// }
/// cursor.close().unwrap();
/// ```
pub struct DirCursor {
    path: PathBuf,
    entries: Entries<SysDir>,
}

impl DirCursor {
    /// Opens a cursor positioned before the first entry of `path`.
    ///
    /// # Returns
    /// * `Err(FsError::NotFound)` - `path` does not exist or is not a directory.
    /// * `Err(FsError::PermissionDenied)` - the directory cannot be read.
    /// * `Err(FsError::Io)` - any other failure (for example, a nul byte in
    ///   `path`).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(FsError::NotFound {
                path: PathBuf::new(),
            });
        }

        let entries = Entries::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotADirectory => FsError::NotFound {
                path: path.to_path_buf(),
            },
            _ => FsError::from_io(path, e),
        })?;
        debug!("opened directory cursor on {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// The directory this cursor enumerates.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Advances to the next child and returns its name, or `None` once the
    /// directory is exhausted. Exhaustion is final: later calls keep
    /// returning `None`.
    pub fn next_entry(&mut self) -> Option<OsString> {
        let name = self.entries.next_name();
        if let Some(name) = &name {
            trace!("{}: entry {:?}", self.path.display(), name);
        }
        name
    }

    /// Releases the directory handle and reports the OS result.
    pub fn close(mut self) -> Result<()> {
        self.entries
            .close()
            .map_err(|e| FsError::from_io(&self.path, e))?;
        debug!("closed directory cursor on {}", self.path.display());
        Ok(())
    }
}

impl Iterator for DirCursor {
    type Item = OsString;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
    }
}

impl FusedIterator for DirCursor {}

impl fmt::Debug for DirCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirCursor")
            .field("path", &self.path)
            .field("open", &self.entries.is_open())
            .finish()
    }
}

impl Drop for DirCursor {
    fn drop(&mut self) {
        if !self.entries.is_open() {
            return;
        }
        match self.entries.close() {
            Ok(()) => debug!("released directory cursor on {}", self.path.display()),
            Err(e) => warn!(
                "failed to release directory cursor on {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Opens a cursor on `path`, hands it to `f`, and closes it afterwards.
///
/// The cursor is released even if `f` panics. A failure to close is reported
/// only after `f` has returned normally.
pub fn with_dir<P, F, R>(path: P, f: F) -> Result<R>
where
    P: AsRef<Path>,
    F: FnOnce(&mut DirCursor) -> R,
{
    let mut cursor = DirCursor::open(path)?;
    let result = f(&mut cursor);
    cursor.close()?;
    Ok(result)
}

/// Collects the names of all children of `path`, in enumeration order.
pub fn list_dir<P: AsRef<Path>>(path: P) -> Result<Vec<OsString>> {
    with_dir(path, |cursor| cursor.collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FsErrorKind;
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::rc::Rc;
    use tempdir::TempDir;

    /// Backend that hands out the first entry at open time, like a find
    /// handle. Entry names are taken from the comma-separated path.
    struct EagerDir {
        names: std::vec::IntoIter<OsString>,
        closed: Rc<Cell<u32>>,
    }

    impl RawDir for EagerDir {
        fn open(path: &Path) -> io::Result<(Self, Option<OsString>)> {
            let listing = path.to_string_lossy();
            let mut names: std::vec::IntoIter<OsString> = listing
                .split(',')
                .filter(|name| !name.is_empty())
                .map(OsString::from)
                .collect::<Vec<_>>()
                .into_iter();
            let first = names.next();
            let closed = Rc::new(Cell::new(0));
            Ok((Self { names, closed }, first))
        }

        fn read_next(&mut self) -> Option<OsString> {
            self.names.next()
        }

        fn close(self) -> io::Result<()> {
            self.closed.set(self.closed.get() + 1);
            Ok(())
        }
    }

    fn eager(listing: &str) -> Entries<EagerDir> {
        Entries::open(Path::new(listing)).unwrap()
    }

    fn names(list: &[&str]) -> BTreeSet<OsString> {
        list.iter().map(OsString::from).collect()
    }

    fn setup_test_env() -> TempDir {
        TempDir::new("dir_cursor_test").unwrap()
    }

    mod normalization {
        use super::*;

        #[test]
        fn test_eager_first_entry_is_yielded_first() {
            let mut entries = eager(".,first,..,second");

            assert_eq!(entries.next_name(), Some(OsString::from("first")));
            assert_eq!(entries.next_name(), Some(OsString::from("second")));
            assert_eq!(entries.next_name(), None);
            assert_eq!(entries.next_name(), None);
        }

        #[test]
        fn test_eager_first_entry_not_a_pseudo_entry() {
            let mut entries = eager("only");

            assert_eq!(entries.next_name(), Some(OsString::from("only")));
            assert_eq!(entries.next_name(), None);
        }

        #[test]
        fn test_eager_only_pseudo_entries() {
            let mut entries = eager(".,..");
            assert_eq!(entries.next_name(), None);
        }

        #[test]
        fn test_names_resembling_pseudo_entries_are_kept() {
            let mut entries = eager("...,.hidden,..x");
            let got: BTreeSet<_> = std::iter::from_fn(|| entries.next_name()).collect();
            assert_eq!(got, names(&["...", ".hidden", "..x"]));
        }

        #[test]
        fn test_close_releases_once() {
            let mut entries = eager("a,b");
            let closed = Rc::clone(&entries.raw.as_ref().unwrap().closed);

            entries.close().unwrap();
            entries.close().unwrap();

            assert_eq!(closed.get(), 1);
            assert!(!entries.is_open());
            assert_eq!(entries.next_name(), None);
        }
    }

    mod open {
        use super::*;

        #[test]
        fn test_open_nonexistent_path() {
            let temp_dir = setup_test_env();
            let err = DirCursor::open(temp_dir.path().join("missing")).unwrap_err();
            assert_eq!(err.kind(), FsErrorKind::NotFound);
        }

        #[test]
        fn test_open_regular_file_fails() {
            let temp_dir = setup_test_env();
            let file = temp_dir.path().join("file.txt");
            std::fs::write(&file, b"content").unwrap();

            let err = DirCursor::open(&file).unwrap_err();
            assert_eq!(err.kind(), FsErrorKind::NotFound);
        }

        #[test]
        fn test_open_empty_path() {
            let err = DirCursor::open("").unwrap_err();
            assert_eq!(err.kind(), FsErrorKind::NotFound);
        }

        #[test]
        #[cfg(unix)]
        fn test_open_permission_denied() {
            use std::os::unix::fs::PermissionsExt;

            // SAFETY: geteuid has no preconditions.
            if unsafe { libc::geteuid() } == 0 {
                // root ignores mode bits
                return;
            }

            let temp_dir = setup_test_env();
            let locked = temp_dir.path().join("locked");
            std::fs::create_dir(&locked).unwrap();
            std::fs::set_permissions(&locked, PermissionsExt::from_mode(0o000)).unwrap();

            let result = DirCursor::open(&locked);

            std::fs::set_permissions(&locked, PermissionsExt::from_mode(0o755)).unwrap();
            assert_eq!(result.unwrap_err().kind(), FsErrorKind::PermissionDenied);
        }
    }

    mod enumerate {
        use super::*;

        #[test]
        fn test_empty_directory() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            let mut cursor = DirCursor::open(temp_dir.path())?;

            assert_eq!(cursor.next_entry(), None);
            assert_eq!(cursor.next_entry(), None);
            cursor.close()?;
            Ok(())
        }

        #[test]
        fn test_yields_each_child_once() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            let root = temp_dir.path();
            std::fs::write(root.join("a.txt"), b"a")?;
            std::fs::write(root.join(".hidden"), b"h")?;
            std::fs::create_dir(root.join("sub"))?;
            std::fs::write(root.join("sub").join("nested.txt"), b"n")?;

            let listed = list_dir(root)?;
            let unique: BTreeSet<_> = listed.iter().cloned().collect();

            assert_eq!(listed.len(), 3);
            assert_eq!(unique, names(&["a.txt", ".hidden", "sub"]));
            Ok(())
        }

        #[test]
        fn test_matches_std_read_dir() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            for i in 0..50 {
                std::fs::write(temp_dir.path().join(format!("file-{i}")), b"")?;
            }

            let ours: BTreeSet<_> = list_dir(temp_dir.path())?.into_iter().collect();
            let expected: BTreeSet<_> = std::fs::read_dir(temp_dir.path())?
                .map(|e| e.map(|e| e.file_name()))
                .collect::<std::io::Result<_>>()?;

            assert_eq!(ours, expected);
            Ok(())
        }

        #[test]
        fn test_unicode_names() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            std::fs::write(temp_dir.path().join("файл с пробелами.txt"), b"")?;

            let listed = list_dir(temp_dir.path())?;
            assert_eq!(listed, vec![OsString::from("файл с пробелами.txt")]);
            Ok(())
        }

        #[test]
        fn test_independent_cursors() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            std::fs::write(temp_dir.path().join("x"), b"")?;
            std::fs::write(temp_dir.path().join("y"), b"")?;

            let mut first = DirCursor::open(temp_dir.path())?;
            let mut second = DirCursor::open(temp_dir.path())?;
            let a = first.next_entry();
            let all_second: BTreeSet<_> = second.by_ref().collect();
            let rest_first: BTreeSet<_> = first.by_ref().collect();

            assert!(a.is_some());
            assert_eq!(all_second, names(&["x", "y"]));
            assert_eq!(rest_first.len(), 1);
            first.close()?;
            second.close()?;
            Ok(())
        }

        #[test]
        fn test_with_dir_returns_closure_result() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            std::fs::write(temp_dir.path().join("one"), b"")?;

            let count = with_dir(temp_dir.path(), |cursor| cursor.count())?;
            assert_eq!(count, 1);
            Ok(())
        }

        #[test]
        fn test_stays_exhausted_through_adapters() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            std::fs::write(temp_dir.path().join("only"), b"")?;

            let mut cursor = DirCursor::open(temp_dir.path())?.fuse();
            assert_eq!(cursor.next(), Some(OsString::from("only")));
            assert_eq!(cursor.next(), None);
            assert_eq!(cursor.next(), None);
            Ok(())
        }

        #[test]
        fn test_debug_shows_path() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            let cursor = DirCursor::open(temp_dir.path())?;

            let text = format!("{cursor:?}");
            assert!(text.starts_with("DirCursor"));
            assert!(text.contains(&format!("{:?}", temp_dir.path())));
            assert!(text.contains("open: true"));
            Ok(())
        }

        #[test]
        fn test_path_is_kept() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            let cursor = DirCursor::open(temp_dir.path())?;
            assert_eq!(cursor.path(), temp_dir.path());
            Ok(())
        }
    }

    #[cfg(target_os = "linux")]
    mod leaks {
        use super::*;

        /// Number of open descriptors of this process that point at `dir`.
        fn open_handles_on(dir: &Path) -> usize {
            std::fs::read_dir("/proc/self/fd")
                .unwrap()
                .filter_map(|e| e.ok())
                .filter_map(|e| std::fs::read_link(e.path()).ok())
                .filter(|target| target == dir)
                .count()
        }

        #[test]
        fn test_close_releases_handle() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            let dir = temp_dir.path().canonicalize()?;

            let cursor = DirCursor::open(&dir)?;
            assert_eq!(open_handles_on(&dir), 1);
            cursor.close()?;
            assert_eq!(open_handles_on(&dir), 0);
            Ok(())
        }

        #[test]
        fn test_drop_releases_handle() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            let dir = temp_dir.path().canonicalize()?;

            {
                let mut cursor = DirCursor::open(&dir)?;
                let _ = cursor.next_entry();
                assert_eq!(open_handles_on(&dir), 1);
            }
            assert_eq!(open_handles_on(&dir), 0);
            Ok(())
        }

        #[test]
        fn test_early_return_releases_handle() -> anyhow::Result<()> {
            let temp_dir = setup_test_env();
            let dir = temp_dir.path().canonicalize()?;

            fn first_entry_or_fail(dir: &Path) -> Result<OsString> {
                let mut cursor = DirCursor::open(dir)?;
                cursor.next_entry().ok_or(FsError::NotFound {
                    path: dir.to_path_buf(),
                })
            }

            assert!(first_entry_or_fail(&dir).is_err());
            assert_eq!(open_handles_on(&dir), 0);
            Ok(())
        }
    }
}
