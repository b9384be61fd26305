use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use super::ByteSource;

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Local archive file, reopened for every scan
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    path: PathBuf,
    buffer_size: usize,
}

impl LocalFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for LocalFileSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::with_capacity(self.buffer_size, file)))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
