//! FEN piece-placement keys.
//!
//! The book and the query side must derive keys the same way, otherwise no
//! lookup can ever hit. Both go through this module.

use crate::record::BoardSquares;

/// Piece letters for square values 1-12. Value 0 is an empty square.
const PIECE_LETTERS: [char; 12] = ['P', 'N', 'B', 'R', 'Q', 'K', 'p', 'n', 'b', 'r', 'q', 'k'];

fn piece_letter(value: u8) -> Option<char> {
    match value {
        1..=12 => Some(PIECE_LETTERS[usize::from(value) - 1]),
        _ => None,
    }
}

/// Encode a board as the piece-placement field of a FEN string.
///
/// Rows are emitted from rank 8 (indices 0..8) down to rank 1 (56..64),
/// files a to h, runs of empty squares as a single digit.
pub fn placement_key(board: &BoardSquares) -> String {
    let mut key = String::with_capacity(71);
    for (row, squares) in board.chunks_exact(8).enumerate() {
        if row > 0 {
            key.push('/');
        }
        let mut empty = 0u8;
        for &value in squares {
            match piece_letter(value) {
                Some(letter) => {
                    if empty > 0 {
                        key.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    key.push(letter);
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            key.push((b'0' + empty) as char);
        }
    }
    key
}

/// Piece-placement field of a full FEN (text before the first space).
pub fn placement_field(fen: &str) -> &str {
    fen.split(' ').next().unwrap_or(fen)
}
