use std::borrow::Cow;
use std::io::{self, Read};

use log::{debug, trace, warn};
use tar::{Archive, Entries, Entry, EntryType};

/// Header fields of one archive record, as decoded.
///
/// The name already has GNU long-name and PAX path records applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    pub name: String,
    /// Raw type flag byte. Kept next to `entry_type` because the decoder
    /// folds the legacy `\0` flag into [`EntryType::Regular`].
    pub type_flag: u8,
    pub entry_type: EntryType,
    pub size: u64,
    pub mode: u32,
    /// Seconds since the epoch, `None` when the field does not decode.
    pub mtime: Option<u64>,
    pub link_name: Option<String>,
}

impl EntryHeader {
    /// Legacy regular-file flag written by pre-POSIX tar.
    pub const AREGTYPE: u8 = b'\0';

    /// Mode and mtime are metadata only: a field that does not decode is
    /// logged and replaced, it never ends the scan.
    fn from_entry<R: Read>(entry: &Entry<'_, R>) -> Self {
        let header = entry.header();
        let name = lossy(entry.path_bytes());
        let old = header.as_old();

        let mode = numeric_field(&old.mode).unwrap_or_else(|| {
            warn!("unreadable mode {:?} for {:?}, using 0", old.mode, name);
            0
        });
        let mtime = numeric_field(&old.mtime);
        if mtime.is_none() {
            warn!("unreadable mtime {:?} for {:?}", old.mtime, name);
        }

        Self {
            type_flag: old.linkflag[0],
            entry_type: header.entry_type(),
            size: entry.size(),
            // only the low bits carry file type and permissions
            mode: mode as u32,
            mtime,
            link_name: entry.link_name_bytes().map(lossy),
            name,
        }
    }
}

/// Decode a numeric header field.
///
/// Fields are octal text, or GNU base-256 when the top bit of the first
/// byte is set. Negative base-256 values, garbage and overflow give `None`;
/// an all-blank field is zero.
fn numeric_field(field: &[u8]) -> Option<u64> {
    let (&first, rest) = field.split_first()?;
    if first & 0x80 != 0 {
        if first & 0x40 != 0 {
            return None;
        }
        return rest.iter().try_fold(u64::from(first & 0x3f), |acc, &b| {
            acc.checked_mul(256)?.checked_add(u64::from(b))
        });
    }

    let text = field
        .iter()
        .skip_while(|&&b| b == b' ')
        .take_while(|&&b| b != 0 && b != b' ')
        .map(|&b| b as char)
        .collect::<String>();
    if text.is_empty() {
        return Some(0);
    }
    u64::from_str_radix(&text, 8).ok()
}

fn lossy(bytes: Cow<'_, [u8]>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Records the decoder consumes on behalf of the entry that follows them.
fn is_extension_record(ty: EntryType) -> bool {
    ty.is_pax_global_extensions()
        || ty.is_pax_local_extensions()
        || ty.is_gnu_longname()
        || ty.is_gnu_longlink()
}

/// Sequential reader over one opened archive stream.
pub struct ArchiveReader<R: Read> {
    archive: Archive<R>,
}

impl<R: Read> ArchiveReader<R> {
    pub fn new(stream: R) -> Self {
        Self {
            archive: Archive::new(stream),
        }
    }

    /// Start walking the records.
    ///
    /// A stream can be walked once: calling this again after records were
    /// consumed fails, since the decoder is no longer at the start.
    pub fn records(&mut self) -> io::Result<Records<'_, R>> {
        Ok(Records {
            entries: self.archive.entries()?,
            done: false,
        })
    }
}

/// One archive record: decoded header plus the payload reader.
///
/// `data` is positioned at the first payload byte until read.
pub struct Record<'a, R: 'a + Read> {
    pub header: EntryHeader,
    pub data: Entry<'a, R>,
}

/// Iterator over records in archive order.
///
/// Stops after the first error.
pub struct Records<'a, R: 'a + Read> {
    entries: Entries<'a, R>,
    done: bool,
}

impl<'a, R: Read> Iterator for Records<'a, R> {
    type Item = io::Result<Record<'a, R>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let entry = match self.entries.next() {
                None => {
                    debug!("end of tar archive");
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(entry)) => entry,
            };

            let header = EntryHeader::from_entry(&entry);

            if is_extension_record(header.entry_type) {
                debug!(
                    "skipping {:?} extension record {:?}",
                    header.entry_type, header.name
                );
                continue;
            }

            trace!(
                "record {:?} type={:?} size={}",
                header.name, header.entry_type, header.size
            );
            return Some(Ok(Record {
                header,
                data: entry,
            }));
        }
    }
}
