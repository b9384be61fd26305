mod http;
mod local;

pub use http::HttpSource;
pub use local::LocalFileSource;

use std::io::{self, Read};
use std::sync::Arc;

use crate::config::{Config, Endpoint};
use crate::error::{Error, Result};

/// Trait for sequential data sources holding a tar archive
pub trait ByteSource: Send + Sync {
    /// Open a fresh stream positioned at offset 0
    ///
    /// Every call returns an independent stream, so concurrent scans never
    /// share a read position.
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;

    /// Human readable location, used in errors and logs
    fn location(&self) -> String;
}

/// Resolve the configured endpoint to a byte source
pub fn resolve(config: &Config) -> Result<Arc<dyn ByteSource>> {
    match &config.endpoint {
        Endpoint::File(path) => Ok(Arc::new(
            LocalFileSource::new(path).with_buffer_size(config.buffer_size),
        )),
        Endpoint::Http(url) => {
            let source = HttpSource::new(url.clone(), config.http_timeout).map_err(|e| {
                Error::LocationResolution {
                    location: url.clone(),
                    source: io::Error::other(e),
                }
            })?;
            Ok(Arc::new(source))
        }
    }
}
