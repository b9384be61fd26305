use std::io::Read;

use log::trace;

use super::object::Object;
use super::reader::{ArchiveReader, Records};
use crate::error::{Error, Result};

/// An opened archive, ready to be listed once.
///
/// The lister owns the underlying stream; dropping it closes the stream,
/// whether or not the listing ran to the end.
pub struct Lister<R: Read> {
    reader: ArchiveReader<R>,
    prefix: String,
}

impl<R: Read> Lister<R> {
    pub fn new(stream: R, prefix: impl Into<String>) -> Self {
        Self {
            reader: ArchiveReader::new(stream),
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Lazily yield objects in archive order.
    ///
    /// Each step reads the next header from the stream. Objects whose path
    /// does not start with the prefix are skipped, but the scan still walks
    /// the whole archive. The listing is single-pass: once objects have been
    /// read, a second call fails.
    pub fn objects(&mut self) -> Result<Objects<'_, R>> {
        let records = self
            .reader
            .records()
            .map_err(|e| Error::io("list", &self.prefix, e))?;
        Ok(Objects {
            records,
            prefix: &self.prefix,
        })
    }
}

/// Iterator over the objects of a [`Lister`].
///
/// `None` marks the end of the archive. A decode error is yielded once and
/// ends the iteration.
pub struct Objects<'a, R: 'a + Read> {
    records: Records<'a, R>,
    prefix: &'a str,
}

impl<R: Read> Iterator for Objects<'_, R> {
    type Item = Result<Object>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(Error::io("list", self.prefix, e))),
            };

            let object = Object::from_header(&record.header);
            if !object.path.starts_with(self.prefix) {
                trace!("{:?} outside prefix {:?}", object.path, self.prefix);
                continue;
            }
            return Some(Ok(object));
        }
    }
}
