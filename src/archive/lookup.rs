use std::io::Read;

use log::debug;

use super::object::Object;
use super::reader::ArchiveReader;
use crate::error::{Error, Result};

/// An entry located by [`lookup`].
pub struct Found<'a, R: 'a + Read> {
    pub object: Object,
    /// Payload reader, positioned at the first payload byte.
    pub data: tar::Entry<'a, R>,
}

/// Find the first entry whose logical path equals `path`.
///
/// Scans from the start of the archive and stops at the first match, leaving
/// the stream at the start of that entry's payload. An entry matches when
/// its logical path equals `path`, or when its raw archive name does: a
/// directory stored as `bare` is found by `bare` and reported as `bare/`.
pub fn lookup<'a, R: Read>(
    reader: &'a mut ArchiveReader<R>,
    op: &'static str,
    path: &str,
) -> Result<Found<'a, R>> {
    let records = reader.records().map_err(|e| Error::io(op, path, e))?;

    for record in records {
        let record = record.map_err(|e| Error::io(op, path, e))?;
        let object = Object::from_header(&record.header);
        if object.path == path || record.header.name == path {
            debug!("{op} {path}: found {} entry", object.mode);
            return Ok(Found {
                object,
                data: record.data,
            });
        }
    }

    Err(Error::not_found(op, path))
}
