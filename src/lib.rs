//! # tarstore
//!
//! Read-only object storage over tar archives.
//!
//! A tar archive is exposed as an immutable key-value store: objects are
//! listed in archive order, looked up by logical path, and their bytes are
//! streamed into any writer. Archives can live on the local filesystem or
//! behind an HTTP(S) URL.
//!
//! ## Features
//!
//! - Lazy, archive-ordered listing with prefix filtering
//! - Stat and read by logical path, first entry wins on duplicates
//! - Ranged reads within a file entry
//! - GNU long names and PAX paths, through the `tar` decoder
//! - Stateless: every call reopens the source, so a storager can be shared
//!   across threads
//!
//! ## Example
//!
//! ```no_run
//! use tarstore::{Config, Storager};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_pairs([("endpoint", "file:/tmp/archive.tar")])?;
//!     let storager = Storager::from_config(&config)?;
//!
//!     // List all objects in the archive
//!     let mut lister = storager.list("")?;
//!     for object in lister.objects()? {
//!         println!("{}", object?.path);
//!     }
//!
//!     // Read one file to stdout
//!     storager.read("world.txt", &mut std::io::stdout())?;
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod storager;

pub use archive::{Lister, Object, ObjectMode, Objects};
pub use cli::Cli;
pub use config::{Config, Endpoint};
pub use error::{Error, Result};
pub use io::{ByteSource, HttpSource, LocalFileSource};
pub use storager::{ArchiveStream, ReadOptions, Storager};
