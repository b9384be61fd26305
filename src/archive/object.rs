use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tar::EntryType;

use super::path::normalize;
use super::reader::EntryHeader;

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const PERMISSION_BITS: u32 = 0o7777;

/// Kind of object an archive entry maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectMode {
    File,
    Dir,
    /// Hard or symbolic link; the target is passed through, never followed.
    Link,
    /// Devices, FIFOs, sparse files and anything else.
    Unknown,
}

impl fmt::Display for ObjectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            ObjectMode::File => "file",
            ObjectMode::Dir => "dir",
            ObjectMode::Link => "link",
            ObjectMode::Unknown => "unknown",
        })
    }
}

/// Classify a record.
///
/// A record is a directory when its type flag says so, when its mode bits
/// carry `S_IFDIR`, or when it uses the legacy `\0` flag with a name ending
/// in `/` (old tar's way of writing directories). A `0` flag with a trailing
/// `/` stays a file.
pub fn classify(header: &EntryHeader) -> ObjectMode {
    if header.entry_type.is_dir() || header.mode & S_IFMT == S_IFDIR {
        return ObjectMode::Dir;
    }
    if header.type_flag == EntryHeader::AREGTYPE && header.name.ends_with(super::SEPARATOR) {
        return ObjectMode::Dir;
    }
    match header.entry_type {
        EntryType::Regular | EntryType::Continuous => ObjectMode::File,
        EntryType::Link | EntryType::Symlink => ObjectMode::Link,
        _ => ObjectMode::Unknown,
    }
}

/// Metadata of one object in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Logical path.
    pub path: String,
    pub mode: ObjectMode,
    /// Payload size, only set for files.
    pub content_length: Option<u64>,
    /// Permission bits from the header, without file type bits.
    pub permissions: u32,
    pub last_modified: Option<SystemTime>,
    pub link_target: Option<String>,
}

impl Object {
    pub fn from_header(header: &EntryHeader) -> Self {
        let mode = classify(header);
        Self {
            path: normalize(&header.name, mode == ObjectMode::Dir),
            mode,
            content_length: (mode == ObjectMode::File).then_some(header.size),
            permissions: header.mode & PERMISSION_BITS,
            last_modified: header
                .mtime
                .and_then(|secs| UNIX_EPOCH.checked_add(Duration::from_secs(secs))),
            link_target: header.link_name.clone(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.mode == ObjectMode::Dir
    }

    pub fn is_file(&self) -> bool {
        self.mode == ObjectMode::File
    }
}
