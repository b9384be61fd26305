//! End-to-end tests against tar files on disk.
//!
//! Each test writes a fresh archive into a temporary file and talks to it
//! through a storager built from option pairs, the way an application would.

use std::io::Write;
use std::thread;

use tar::{Builder, EntryType, Header};
use tarstore::{Config, Error, ObjectMode, ReadOptions, Storager};
use tempfile::NamedTempFile;

struct Entry {
    name: &'static str,
    entry_type: EntryType,
    mode: u32,
    content: &'static [u8],
}

const FIXTURE: &[Entry] = &[
    Entry {
        name: "dir/",
        entry_type: EntryType::Directory,
        mode: 0o700,
        content: b"",
    },
    Entry {
        name: "world.txt",
        entry_type: EntryType::Regular,
        mode: 0o600,
        content: b"world!",
    },
    Entry {
        name: "dir/hello.txt",
        entry_type: EntryType::Regular,
        mode: 0o600,
        content: b"hello,",
    },
];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_archive(entries: &[Entry]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp");
    {
        let mut builder = Builder::new(file.as_file_mut());
        for entry in entries {
            let mut header = Header::new_ustar();
            header.set_entry_type(entry.entry_type);
            header.set_mode(entry.mode);
            header.set_size(entry.content.len() as u64);
            header.set_mtime(1_600_000_000);
            builder
                .append_data(&mut header, entry.name, entry.content)
                .expect("append");
        }
        builder.finish().expect("finish");
    }
    file.flush().expect("flush");
    file
}

fn setup(entries: &[Entry]) -> (NamedTempFile, Storager) {
    init_logging();
    let file = write_archive(entries);
    let endpoint = format!("file:{}", file.path().display());
    let config = Config::from_pairs([("endpoint", endpoint.as_str())]).expect("config");
    let storager = Storager::from_config(&config).expect("new storager");
    (file, storager)
}

fn list_paths(storager: &Storager, prefix: &str) -> Vec<String> {
    let mut lister = storager.list(prefix).expect("list");
    lister
        .objects()
        .expect("objects")
        .map(|o| o.expect("next").path)
        .collect()
}

fn read_string(storager: &Storager, path: &str) -> String {
    let mut buf = Vec::new();
    let n = storager.read(path, &mut buf).expect("read");
    assert_eq!(n as usize, buf.len());
    String::from_utf8(buf).expect("utf8")
}

#[test]
fn list() {
    let (_file, storager) = setup(FIXTURE);
    assert_eq!(
        list_paths(&storager, ""),
        ["dir/", "world.txt", "dir/hello.txt"]
    );
}

#[test]
fn list_with_prefix() {
    let (_file, storager) = setup(FIXTURE);
    assert_eq!(list_paths(&storager, "dir/"), ["dir/", "dir/hello.txt"]);
}

#[test]
fn read() {
    let (_file, storager) = setup(FIXTURE);
    assert_eq!(read_string(&storager, "world.txt"), "world!");
    assert_eq!(read_string(&storager, "dir/hello.txt"), "hello,");
}

#[test]
fn stat() {
    let (_file, storager) = setup(FIXTURE);
    let object = storager.stat("world.txt").expect("stat");
    assert_eq!(object.path, "world.txt");
    assert_eq!(object.mode, ObjectMode::File);
    assert_eq!(object.content_length, Some(6));
    assert_eq!(object.permissions, 0o600);
}

#[test]
fn stat_directory() {
    let (_file, storager) = setup(FIXTURE);
    let object = storager.stat("dir/").expect("stat");
    assert_eq!(object.path, "dir/");
    assert_eq!(object.mode, ObjectMode::Dir);
    assert_eq!(object.content_length, None);

    let err = storager.read("dir/", &mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidObjectMode { .. }), "{err}");
}

/// Write entries whose header bytes are set by hand, the way other tar
/// writers lay them out.
struct RawEntry {
    name: &'static str,
    entry_type: EntryType,
    mode: [u8; 8],
    content: &'static [u8],
}

fn write_raw_archive(entries: &[RawEntry]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp");
    {
        let mut builder = Builder::new(file.as_file_mut());
        for entry in entries {
            let mut header = Header::new_ustar();
            header.set_entry_type(entry.entry_type);
            header.set_size(entry.content.len() as u64);
            header.set_mtime(1_600_000_000);
            let old = header.as_old_mut();
            old.name[..entry.name.len()].copy_from_slice(entry.name.as_bytes());
            old.mode = entry.mode;
            header.set_cksum();
            builder.append(&header, entry.content).expect("append");
        }
        builder.finish().expect("finish");
    }
    file.flush().expect("flush");
    file
}

fn open_storager(file: &NamedTempFile) -> Storager {
    init_logging();
    let endpoint = format!("file:{}", file.path().display());
    let config = Config::from_pairs([("endpoint", endpoint.as_str())]).expect("config");
    Storager::from_config(&config).expect("new storager")
}

const OCTAL_0600: [u8; 8] = *b"0000600\0";

#[test]
fn bare_directory() {
    let file = write_raw_archive(&[
        RawEntry {
            name: "bare",
            entry_type: EntryType::Directory,
            mode: *b"0000755\0",
            content: b"",
        },
        RawEntry {
            name: "bare/inner.txt",
            entry_type: EntryType::Regular,
            mode: OCTAL_0600,
            content: b"inner",
        },
    ]);
    let storager = open_storager(&file);

    assert_eq!(list_paths(&storager, ""), ["bare/", "bare/inner.txt"]);
    for request in ["bare", "bare/"] {
        let object = storager.stat(request).expect("stat");
        assert_eq!(object.path, "bare/");
        assert_eq!(object.mode, ObjectMode::Dir);
        assert_eq!(object.content_length, None);
    }
    let err = storager.read("bare", &mut Vec::new()).unwrap_err();
    assert!(matches!(err, Error::InvalidObjectMode { .. }), "{err}");
}

#[test]
fn base256_mode() {
    // 0x8000_01c0: a directory mode bit above the octal range, plus 0700
    let go_dir_mode = [0x80, 0, 0, 0, 0x80, 0, 0x01, 0xc0];
    let file = write_raw_archive(&[
        RawEntry {
            name: "dir/",
            entry_type: EntryType::Directory,
            mode: go_dir_mode,
            content: b"",
        },
        RawEntry {
            name: "world.txt",
            entry_type: EntryType::Regular,
            mode: OCTAL_0600,
            content: b"world!",
        },
        RawEntry {
            name: "dir/hello.txt",
            entry_type: EntryType::Regular,
            mode: OCTAL_0600,
            content: b"hello,",
        },
    ]);
    let storager = open_storager(&file);

    assert_eq!(
        list_paths(&storager, ""),
        ["dir/", "world.txt", "dir/hello.txt"]
    );
    let dir = storager.stat("dir/").expect("stat");
    assert_eq!(dir.mode, ObjectMode::Dir);
    assert_eq!(dir.permissions, 0o700);
    assert_eq!(read_string(&storager, "dir/hello.txt"), "hello,");
    assert_eq!(storager.stat("world.txt").expect("stat").permissions, 0o600);
}

#[test]
fn every_listed_path_can_be_stated() {
    let (_file, storager) = setup(FIXTURE);
    for path in list_paths(&storager, "") {
        assert_eq!(storager.stat(&path).expect("stat").path, path);
    }
}

#[test]
fn missing_object() {
    let (_file, storager) = setup(FIXTURE);
    assert!(storager.stat("nope.txt").unwrap_err().is_not_found());
    assert!(
        storager
            .read("nope.txt", &mut Vec::new())
            .unwrap_err()
            .is_not_found()
    );
}

#[test]
fn repeated_calls_agree() {
    let (_file, storager) = setup(FIXTURE);
    assert_eq!(list_paths(&storager, ""), list_paths(&storager, ""));
    assert_eq!(
        storager.stat("dir/hello.txt").expect("stat"),
        storager.stat("dir/hello.txt").expect("stat")
    );
    assert_eq!(read_string(&storager, "world.txt"), read_string(&storager, "world.txt"));
}

#[test]
fn first_duplicate_wins() {
    let (_file, storager) = setup(&[
        Entry {
            name: "a.txt",
            entry_type: EntryType::Regular,
            mode: 0o644,
            content: b"first",
        },
        Entry {
            name: "a.txt",
            entry_type: EntryType::Regular,
            mode: 0o600,
            content: b"second!",
        },
    ]);
    assert_eq!(list_paths(&storager, ""), ["a.txt", "a.txt"]);
    assert_eq!(storager.stat("a.txt").expect("stat").content_length, Some(5));
    assert_eq!(read_string(&storager, "a.txt"), "first");
}

#[test]
fn large_payload_is_byte_exact() {
    init_logging();
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

    let mut file = NamedTempFile::new().expect("create temp");
    {
        let mut builder = Builder::new(file.as_file_mut());
        let mut header = Header::new_gnu();
        header.set_mode(0o644);
        header.set_size(payload.len() as u64);
        header.set_mtime(0);
        builder
            .append_data(&mut header, "blob.bin", payload.as_slice())
            .expect("append");
        builder.finish().expect("finish");
    }

    let config = Config::from_pairs([
        ("endpoint", file.path().to_str().expect("utf8 path")),
        ("buffer_size", "512"),
    ])
    .expect("config");
    let storager = Storager::from_config(&config).expect("new storager");

    let mut out = Vec::new();
    assert_eq!(storager.read("blob.bin", &mut out).expect("read"), 200_000);
    assert_eq!(out, payload);

    let mut tail = Vec::new();
    let options = ReadOptions {
        offset: 199_990,
        size: None,
    };
    assert_eq!(storager.read_with("blob.bin", &mut tail, options).expect("read"), 10);
    assert_eq!(tail, payload[199_990..]);
}

#[test]
fn concurrent_calls() {
    let (_file, storager) = setup(FIXTURE);
    thread::scope(|s| {
        for _ in 0..8 {
            let storager = storager.clone();
            s.spawn(move || {
                assert_eq!(list_paths(&storager, "").len(), 3);
                assert_eq!(read_string(&storager, "dir/hello.txt"), "hello,");
            });
        }
    });
}

#[test]
fn missing_archive() {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let endpoint = format!("file:{}", dir.path().join("gone.tar").display());
    let config = Config::from_pairs([("endpoint", endpoint)]).expect("config");

    // construction does not touch the file
    let storager = Storager::from_config(&config).expect("new storager");
    assert!(matches!(
        storager.list(""),
        Err(Error::LocationResolution { .. })
    ));
    assert!(matches!(
        storager.stat("world.txt"),
        Err(Error::LocationResolution { .. })
    ));
}

#[test]
fn rejects_bad_config() {
    assert!(matches!(
        Config::from_pairs([("endpont", "file:/tmp/a.tar")]),
        Err(Error::InvalidConfig(_))
    ));
    assert!(matches!(
        Config::from_pairs(Vec::<(String, String)>::new()),
        Err(Error::InvalidConfig(_))
    ));
}
