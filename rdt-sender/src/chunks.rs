//! Lazy file chunking for the sender's input stream.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use rdt_core::UDP_MAX_CHUNK_SIZE;

/// Iterator yielding a file's contents in protocol-sized slices.
///
/// A read error ends the stream early; the caller picks it up afterwards
/// with [`FileChunks::take_error`], since the sender's input contract is a
/// plain iterator of chunks.
pub struct FileChunks {
    reader: BufReader<File>,
    file_len: u64,
    error: Option<io::Error>,
    done: bool,
}

impl FileChunks {
    /// Open `path` for chunked reading.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        Ok(Self {
            reader: BufReader::new(file),
            file_len,
            error: None,
            done: false,
        })
    }

    /// Total size of the underlying file in bytes.
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// The read error that ended the stream early, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl Iterator for FileChunks {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.done {
            return None;
        }

        let mut chunk = vec![0u8; UDP_MAX_CHUNK_SIZE];
        let mut filled = 0;
        while filled < chunk.len() {
            match self.reader.read(&mut chunk[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(e);
                    self.done = true;
                    return None;
                }
            }
        }

        if filled == 0 {
            self.done = true;
            return None;
        }
        chunk.truncate(filled);
        Some(chunk)
    }
}

// ── Tests ────────────────────────────────────────────────────────
