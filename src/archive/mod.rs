//! Tar archive scanning.
//!
//! This module turns tar's sequential record stream into objects addressed
//! by logical path.
//!
//! ## Architecture
//!
//! - [`reader`]: record-by-record access on top of the `tar` decoder
//! - [`path`]: logical path normalization
//! - [`object`]: object metadata and mode classification
//! - [`lister`]: lazy, archive-ordered listing
//! - [`lookup`]: first-match search by logical path
//!
//! ## Why every call rescans
//!
//! A tar archive is a run of 512-byte header blocks each followed by its
//! payload, terminated by two zero blocks. There is no index, so finding one
//! entry means walking the headers from the start. Nothing is cached between
//! calls: a scan always reflects the archive as it is when opened.
//!
//! ## Ordering
//!
//! Objects come out in archive order. Entries are neither sorted nor
//! deduplicated; when two entries share a logical path, lookups return the
//! first one.

mod lister;
mod lookup;
mod object;
mod path;
mod reader;

pub use lister::{Lister, Objects};
pub use lookup::{Found, lookup};
pub use object::{Object, ObjectMode, classify};
pub use path::{SEPARATOR, normalize, validate};
pub use reader::{ArchiveReader, EntryHeader, Record, Records};

#[cfg(test)]
pub(crate) mod testutil;
