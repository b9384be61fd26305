//! In-memory archive builder for unit tests.
//!
//! Names are written into the header verbatim so tests control trailing
//! slashes and type flags exactly.

use tar::{Builder, EntryType, Header};

pub const MTIME: u64 = 1_700_000_000;

pub struct TestEntry {
    pub name: &'static str,
    pub type_flag: u8,
    pub mode: u32,
    pub data: &'static [u8],
    /// Mode field bytes written verbatim instead of `mode`.
    pub raw_mode: Option<[u8; 8]>,
}

impl TestEntry {
    pub fn dir(name: &'static str, mode: u32) -> Self {
        Self {
            name,
            type_flag: EntryType::Directory.as_byte(),
            mode,
            data: b"",
            raw_mode: None,
        }
    }

    pub fn file(name: &'static str, mode: u32, data: &'static [u8]) -> Self {
        Self {
            name,
            type_flag: EntryType::Regular.as_byte(),
            mode,
            data,
            raw_mode: None,
        }
    }

    pub fn with_flag(mut self, type_flag: u8) -> Self {
        self.type_flag = type_flag;
        self
    }

    pub fn with_raw_mode(mut self, raw_mode: [u8; 8]) -> Self {
        self.raw_mode = Some(raw_mode);
        self
    }
}

pub fn header_for(entry: &TestEntry) -> Header {
    let mut header = Header::new_ustar();
    header.set_size(entry.data.len() as u64);
    header.set_mode(entry.mode);
    header.set_mtime(MTIME);
    header.set_uid(0);
    header.set_gid(0);
    {
        let old = header.as_old_mut();
        old.name[..entry.name.len()].copy_from_slice(entry.name.as_bytes());
        old.linkflag = [entry.type_flag];
        if let Some(raw_mode) = entry.raw_mode {
            old.mode = raw_mode;
        }
    }
    header.set_cksum();
    header
}

pub fn build(entries: &[TestEntry]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for entry in entries {
        builder
            .append(&header_for(entry), entry.data)
            .expect("append entry");
    }
    builder.into_inner().expect("finish archive")
}

/// GNU base-256 encoding of `value` for an 8-byte field.
pub fn base256_mode(value: u64) -> [u8; 8] {
    let mut field = [0u8; 8];
    field[1..].copy_from_slice(&value.to_be_bytes()[1..]);
    field[0] = 0x80;
    field
}

/// The three-entry archive used throughout the tests.
pub fn fixture() -> Vec<u8> {
    build(&[
        TestEntry::dir("dir/", 0o700),
        TestEntry::file("world.txt", 0o600, b"world!"),
        TestEntry::file("dir/hello.txt", 0o600, b"hello,"),
    ])
}
