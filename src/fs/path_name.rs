//! Path component extraction by plain separator splitting.
//!
//! Paths are raw byte sequences: both `/` and `\` are accepted as separators
//! on every platform and no text decoding happens, so names that are not
//! valid UTF-8 survive untouched. No normalization is done: `.` and `..`
//! components are ordinary text here. All functions borrow from the input and
//! never allocate.

use std::ffi::OsStr;
use std::ops::Range;

fn is_separator(b: u8) -> bool {
    b == b'/' || b == b'\\'
}

fn last_separator(bytes: &[u8]) -> Option<usize> {
    bytes.iter().rposition(|&b| is_separator(b))
}

/// Position of the extension dot inside a leaf name.
/// A dot in the first position starts a hidden name, not an extension.
fn extension_dot(leaf: &[u8]) -> Option<usize> {
    match leaf.iter().rposition(|&b| b == b'.') {
        Some(0) | None => None,
        Some(idx) => Some(idx),
    }
}

/// Sub-slice of `path`. Both ends of `range` must be string ends or sit next
/// to an ASCII separator or dot.
fn sub(path: &OsStr, range: Range<usize>) -> &OsStr {
    let bytes = path.as_encoded_bytes();
    // SAFETY: the range is cut only at string ends and at ASCII bytes, which
    // are always boundaries of the platform encoding.
    unsafe { OsStr::from_encoded_bytes_unchecked(&bytes[range]) }
}

/// Returns everything before the last separator.
///
/// * No separator: returns `""`.
/// * The only separator is the leading one (`/a`): returns the root separator
///   itself, so the parent of a top-level entry is still a usable path.
pub fn directory_of<P: AsRef<OsStr> + ?Sized>(path: &P) -> &OsStr {
    let path = path.as_ref();
    match last_separator(path.as_encoded_bytes()) {
        Some(0) => sub(path, 0..1),
        Some(idx) => sub(path, 0..idx),
        None => OsStr::new(""),
    }
}

/// Returns everything after the last separator, or the whole `path` if it
/// has none.
pub fn leaf_name_of<P: AsRef<OsStr> + ?Sized>(path: &P) -> &OsStr {
    let path = path.as_ref();
    let bytes = path.as_encoded_bytes();
    match last_separator(bytes) {
        Some(idx) => sub(path, idx + 1..bytes.len()),
        None => path,
    }
}

/// Returns the leaf name with its last `.`-delimited extension removed.
pub fn base_name_of<P: AsRef<OsStr> + ?Sized>(path: &P) -> &OsStr {
    let leaf = leaf_name_of(path);
    match extension_dot(leaf.as_encoded_bytes()) {
        Some(idx) => sub(leaf, 0..idx),
        None => leaf,
    }
}

/// Returns the text after the last `.` of the leaf name, or `""` when there
/// is no dot or the dot is the leaf's first character.
pub fn extension_of<P: AsRef<OsStr> + ?Sized>(path: &P) -> &OsStr {
    let leaf = leaf_name_of(path);
    let bytes = leaf.as_encoded_bytes();
    match extension_dot(bytes) {
        Some(idx) => sub(leaf, idx + 1..bytes.len()),
        None => OsStr::new(""),
    }
}
