//! Square and promotion naming for book moves.

use crate::error::FormatError;

/// Coordinate name of a board index: file = index % 8, rank = 8 - index / 8.
///
/// Index 0 is `a8` and index 63 is `h1`.
pub fn square_name(index: u8) -> Result<String, FormatError> {
    if index > 63 {
        return Err(FormatError::SquareIndex(index));
    }
    let file = (b'a' + index % 8) as char;
    let rank = 8 - index / 8;
    Ok(format!("{file}{rank}"))
}

/// Promotion letter appended to a UCI move. Code 0 (and anything unknown) has none.
pub fn promotion_suffix(code: u8) -> Option<char> {
    match code {
        1 => Some('n'),
        2 => Some('b'),
        3 => Some('r'),
        4 => Some('q'),
        _ => None,
    }
}
