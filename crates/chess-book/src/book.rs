//! Opening book: placement key -> move table with a first-miss latch.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{BookError, FormatError};
use crate::placement::placement_key;
use crate::record::{BookRecord, decode_record};

const READER_BUF_CAP: usize = 64 * 1024;

/// Book table loaded from a packed record file.
///
/// The first lookup that misses disables the book for good: the table is
/// dropped and every later lookup answers `None` without touching the file.
#[derive(Debug, Default)]
pub struct OpeningBook {
    moves: HashMap<String, String>,
    enabled: bool,
}

impl OpeningBook {
    /// Load every record from `reader` until end of input.
    ///
    /// Later records overwrite earlier ones with the same key.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, BookError> {
        let mut moves = HashMap::new();
        let mut buf = [0u8; BookRecord::SIZE];
        let mut offset = 0u64;
        loop {
            let len = read_record(&mut reader, &mut buf)?;
            if len == 0 {
                break;
            }
            if len != BookRecord::SIZE {
                return Err(BookError::TruncatedRecord { offset, len });
            }
            let (key, mv) =
                decode_entry(&buf).map_err(|source| BookError::Format { offset, source })?;
            moves.insert(key, mv);
            offset += BookRecord::SIZE as u64;
        }
        Ok(Self {
            moves,
            enabled: true,
        })
    }

    /// Load a book file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BookError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| BookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let book = Self::from_reader(BufReader::with_capacity(READER_BUF_CAP, file))?;
        log::info!("loaded opening book {} ({} positions)", path.display(), book.len());
        Ok(book)
    }

    /// Load `primary`, or `fallback` when `primary` cannot be opened.
    ///
    /// Only the open is retried. A corrupt file is fatal whichever one it is.
    pub fn open_with_fallback<P: AsRef<Path>, Q: AsRef<Path>>(
        primary: P,
        fallback: Q,
    ) -> Result<Self, BookError> {
        match Self::open(primary.as_ref()) {
            Err(BookError::Io { path, source }) => {
                log::warn!("book {} unavailable ({source}), trying fallback", path.display());
                Self::open(fallback)
            }
            other => other,
        }
    }

    /// A book that answers nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Look up the move for a placement key. A miss disables the book.
    pub fn get(&mut self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        match self.moves.get(key) {
            Some(mv) => Some(mv.clone()),
            None => {
                log::debug!(
                    "book miss for {key}, disabling book ({} entries released)",
                    self.moves.len()
                );
                self.disable();
                None
            }
        }
    }

    /// Look up without tripping the latch.
    pub fn peek(&self, key: &str) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.moves.get(key).map(String::as_str)
    }

    /// Release the table and refuse all further lookups.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.moves = HashMap::new();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.moves.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn decode_entry(bytes: &[u8]) -> Result<(String, String), FormatError> {
    let record = decode_record(bytes)?;
    Ok((placement_key(&record.board), record.mv.to_uci()?))
}

/// Fill `buf` as far as the input allows. Returns the number of bytes read;
/// less than `buf.len()` only at end of input.
fn read_record<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
