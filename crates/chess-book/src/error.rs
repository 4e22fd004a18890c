//! Error types for book decoding and loading

use std::path::PathBuf;

/// A record (or part of one) does not match the packed layout.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Record is not exactly one record long
    #[error("book record must be {expected} bytes, got {actual}")]
    RecordLength { expected: usize, actual: usize },

    /// A bit field would run past the end of the record
    #[error("insufficient bits for {field}: needed {needed}, {available} left")]
    ShortField {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// Square index outside 0..64
    #[error("invalid square index: {0}")]
    SquareIndex(u8),
}

/// Loading a book file failed. All variants abort the whole load.
#[derive(thiserror::Error, Debug)]
pub enum BookError {
    #[error("failed to open book {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed reading book data: {0}")]
    Read(#[from] std::io::Error),

    /// The file ends in a partial record
    #[error("incomplete record at byte offset {offset}: {len} trailing bytes")]
    TruncatedRecord { offset: u64, len: usize },

    #[error("malformed record at byte offset {offset}: {source}")]
    Format {
        offset: u64,
        #[source]
        source: FormatError,
    },
}
