//! Opening-book support for the move agent.
//!
//! The book is a headerless file of fixed 34-byte records. Each record packs a
//! full board (64 × 4 bits) and the move to play from it. Loading turns every
//! record into a FEN piece-placement key and a UCI move string.

pub mod book;
pub mod error;
pub mod placement;
pub mod record;
pub mod square;

pub use book::OpeningBook;
pub use error::{BookError, FormatError};
pub use placement::{placement_field, placement_key};
pub use record::{BoardSquares, BookRecord, MoveRecord, decode_record};
pub use square::{promotion_suffix, square_name};
