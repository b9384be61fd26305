//! Storager configuration.
//!
//! A [`Config`] names the archive location and a couple of tuning knobs. It
//! can be built directly or from `key=value` option pairs, in which case the
//! recognized options are:
//!
//! | key            | value                                   | default |
//! |----------------|-----------------------------------------|---------|
//! | `endpoint`     | archive location, see [`Endpoint`]      | required |
//! | `buffer_size`  | read buffer for local files, in bytes   | 65536   |
//! | `http_timeout` | request timeout for HTTP sources, in s  | 30      |
//!
//! Unknown keys are rejected so typos fail at construction instead of being
//! silently ignored.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Location of a tar archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A file on the local filesystem.
    File(PathBuf),
    /// An `http://` or `https://` URL.
    Http(String),
}

impl FromStr for Endpoint {
    type Err = Error;

    /// Accepts `file:<path>`, `file://<path>`, `http(s)://...` and bare paths.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidConfig("empty endpoint".to_string()));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Endpoint::Http(s.to_string()));
        }
        if let Some(path) = s.strip_prefix("file://").or_else(|| s.strip_prefix("file:")) {
            if path.is_empty() {
                return Err(Error::InvalidConfig(format!("endpoint {s:?} has no path")));
            }
            return Ok(Endpoint::File(PathBuf::from(path)));
        }
        if let Some((scheme, _)) = s.split_once("://") {
            return Err(Error::InvalidConfig(format!(
                "unsupported endpoint scheme {scheme:?}"
            )));
        }
        Ok(Endpoint::File(PathBuf::from(s)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::File(path) => write!(f, "file:{}", path.display()),
            Endpoint::Http(url) => f.write_str(url),
        }
    }
}

/// Validated storager configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Endpoint,
    /// Capacity of the buffer wrapped around local archive files.
    pub buffer_size: usize,
    /// Whole-request timeout applied by HTTP sources.
    pub http_timeout: Duration,
}

impl Config {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            buffer_size: DEFAULT_BUFFER_SIZE,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Build a config from option pairs.
    ///
    /// Later pairs override earlier ones with the same key.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut endpoint = None;
        let mut buffer_size = DEFAULT_BUFFER_SIZE;
        let mut http_timeout = DEFAULT_HTTP_TIMEOUT;

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "endpoint" => endpoint = Some(value.parse::<Endpoint>()?),
                "buffer_size" => {
                    buffer_size = parse_number(key, value)?;
                    if buffer_size == 0 {
                        return Err(Error::InvalidConfig(
                            "buffer_size must be greater than zero".to_string(),
                        ));
                    }
                }
                "http_timeout" => http_timeout = Duration::from_secs(parse_number(key, value)?),
                _ => return Err(Error::InvalidConfig(format!("unknown option {key:?}"))),
            }
        }

        let endpoint =
            endpoint.ok_or_else(|| Error::InvalidConfig("missing endpoint".to_string()))?;
        Ok(Self {
            endpoint,
            buffer_size,
            http_timeout,
        })
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{key} must be a number, got {value:?}")))
}
