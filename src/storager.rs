//! Object-storage facade over a tar archive.
//!
//! [`Storager`] holds nothing but its byte source. Every call opens a fresh
//! stream and scans from the first header, so calls never share a read
//! position and can run concurrently from several threads.

use std::io::{self, Read, Write};
use std::sync::Arc;

use log::debug;

use crate::archive::{self, ArchiveReader, Found, Lister, Object};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::io::{ByteSource, resolve};

/// Stream type handed out by byte sources.
pub type ArchiveStream = Box<dyn Read + Send>;

/// Byte range of a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Payload bytes to skip before copying.
    pub offset: u64,
    /// Maximum number of bytes to copy, `None` for the rest of the payload.
    pub size: Option<u64>,
}

/// Read-only storager over one tar archive.
pub struct Storager<S: ?Sized + ByteSource = dyn ByteSource> {
    source: Arc<S>,
}

impl<S: ?Sized + ByteSource> Clone for Storager<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl Storager {
    /// Create a storager for the configured endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = resolve(config)?;
        debug!("storager for {}", config.endpoint);
        Ok(Self { source })
    }
}

impl<S: ?Sized + ByteSource> Storager<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn location(&self) -> String {
        self.source.location()
    }

    fn open(&self) -> Result<ArchiveStream> {
        let location = self.source.location();
        debug!("opening {location}");
        self.source
            .open()
            .map_err(|source| Error::LocationResolution { location, source })
    }

    /// Open the archive for listing objects under `prefix`.
    ///
    /// Open failures are returned here, before any object is read. Use
    /// [`Lister::objects`] to walk the listing.
    pub fn list(&self, prefix: &str) -> Result<Lister<ArchiveStream>> {
        archive::validate(prefix)?;
        Ok(Lister::new(self.open()?, prefix))
    }

    /// Metadata of the first entry at `path`.
    pub fn stat(&self, path: &str) -> Result<Object> {
        archive::validate(path)?;
        let mut reader = ArchiveReader::new(self.open()?);
        let found = archive::lookup(&mut reader, "stat", path)?;
        Ok(found.object)
    }

    /// Copy the whole payload of the file at `path` into `dst`.
    ///
    /// Returns the number of bytes written, always the size declared in the
    /// entry header. On error, whatever reached `dst` is incomplete.
    pub fn read<W: Write + ?Sized>(&self, path: &str, dst: &mut W) -> Result<u64> {
        self.read_with(path, dst, ReadOptions::default())
    }

    /// Copy a byte range of the file at `path` into `dst`.
    ///
    /// The range is clamped to the payload: an offset past the end copies
    /// nothing.
    pub fn read_with<W: Write + ?Sized>(
        &self,
        path: &str,
        dst: &mut W,
        options: ReadOptions,
    ) -> Result<u64> {
        archive::validate(path)?;
        let mut reader = ArchiveReader::new(self.open()?);
        let found = archive::lookup(&mut reader, "read", path)?;
        copy_payload(found, path, dst, options)
    }
}

fn copy_payload<R: Read, W: Write + ?Sized>(
    found: Found<'_, R>,
    path: &str,
    dst: &mut W,
    options: ReadOptions,
) -> Result<u64> {
    let Found { object, mut data } = found;
    if !object.is_file() {
        return Err(Error::InvalidObjectMode {
            op: "read",
            path: path.to_string(),
            mode: object.mode,
        });
    }

    let length = object.content_length.unwrap_or(0);
    let offset = options.offset.min(length);
    let remaining = length - offset;
    let expected = options.size.map_or(remaining, |size| size.min(remaining));
    let truncated = |copied| Error::UnexpectedEof {
        op: "read",
        path: path.to_string(),
        expected,
        copied,
    };

    if offset > 0 {
        let skipped = io::copy(&mut (&mut data).take(offset), &mut io::sink())
            .map_err(|e| Error::io("read", path, e))?;
        if skipped < offset {
            return Err(truncated(0));
        }
    }

    let mut out = Tally { inner: dst, written: 0 };
    match io::copy(&mut data.take(expected), &mut out) {
        Ok(copied) if copied == expected => Ok(copied),
        Ok(copied) => Err(truncated(copied)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(truncated(out.written)),
        Err(e) => Err(Error::io("read", path, e)),
    }
}

/// Counts bytes accepted by the destination.
struct Tally<'w, W: ?Sized> {
    inner: &'w mut W,
    written: u64,
}

impl<W: Write + ?Sized> Write for Tally<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
