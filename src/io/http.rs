use reqwest::blocking::Client;
use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::ByteSource;

/// HTTP source for remote tar archives
///
/// Every open issues a plain GET and streams the response body, so a scan
/// only downloads as far as it reads.
pub struct HttpSource {
    client: Client,
    url: String,
    transferred_bytes: Arc<AtomicU64>,
}

impl HttpSource {
    /// Create a new HTTP source
    ///
    /// No request is sent until the first open.
    pub fn new(url: String, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url,
            transferred_bytes: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

impl ByteSource for HttpSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        let resp = self.client.get(&self.url).send().map_err(io::Error::other)?;

        if !resp.status().is_success() {
            return Err(io::Error::other(format!(
                "HTTP request failed with status: {}",
                resp.status()
            )));
        }

        Ok(Box::new(CountingReader {
            inner: resp,
            counter: self.transferred_bytes.clone(),
        }))
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

struct CountingReader<R> {
    inner: R,
    counter: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}
