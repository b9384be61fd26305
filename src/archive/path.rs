use crate::error::{Error, Result};

/// Separator used in logical paths, regardless of platform.
pub const SEPARATOR: char = '/';

/// Normalize a raw archive name into a logical path.
///
/// Directories always end with [`SEPARATOR`]. Anything else passes through
/// untouched, including a trailing separator: whether an entry is a
/// directory is decided by its header, not by its name. No `.` or `..`
/// segments are resolved.
pub fn normalize(raw: &str, is_dir: bool) -> String {
    if is_dir && !raw.ends_with(SEPARATOR) {
        let mut path = String::with_capacity(raw.len() + 1);
        path.push_str(raw);
        path.push(SEPARATOR);
        return path;
    }
    raw.to_string()
}

/// Reject request paths that no tar entry can carry.
pub fn validate(path: &str) -> Result<()> {
    if path.contains('\0') {
        return Err(Error::InvalidPath(path.to_string()));
    }
    Ok(())
}
