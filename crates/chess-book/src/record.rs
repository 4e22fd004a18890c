//! Packed book record decoding.
//!
//! # Layout (34 bytes = 272 bits, MSB-first across the byte stream)
//!
//! | field     | bits   | notes                                   |
//! |-----------|--------|-----------------------------------------|
//! | board     | 64 × 4 | square values 0-12, index 0 = a8        |
//! | from      | 6      | square index 0-63                       |
//! | to        | 6      | square index 0-63                       |
//! | promotion | 3      | 0 none, 1 n, 2 b, 3 r, 4 q              |
//! | padding   | 1      | ignored                                 |

use crate::error::FormatError;
use crate::square::{promotion_suffix, square_name};

/// Square values of a decoded board. 0 = empty, 1-6 = PNBRQK, 7-12 = pnbrqk.
pub type BoardSquares = [u8; 64];

/// Highest valid square value (black king).
pub const MAX_PIECE_CODE: u8 = 12;
/// Highest valid promotion code (queen).
pub const MAX_PROMOTION_CODE: u8 = 4;

const SQUARE_BITS: usize = 4;
const INDEX_BITS: usize = 6;
const PROMOTION_BITS: usize = 3;

/// Move stored in a book record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: u8,
    pub to: u8,
    pub promotion: u8,
}

impl MoveRecord {
    /// Coordinate notation, e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(&self) -> Result<String, FormatError> {
        let mut s = square_name(self.from)?;
        s.push_str(&square_name(self.to)?);
        if let Some(c) = promotion_suffix(self.promotion) {
            s.push(c);
        }
        Ok(s)
    }
}

/// One decoded book entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookRecord {
    pub board: BoardSquares,
    pub mv: MoveRecord,
}

impl BookRecord {
    /// Size in bytes
    pub const SIZE: usize = 34;

    /// Pack into the on-disk layout. The padding bit is written as 0.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = BitWriter::new();
        for &sq in &self.board {
            out.write(u32::from(sq), SQUARE_BITS);
        }
        out.write(u32::from(self.mv.from), INDEX_BITS);
        out.write(u32::from(self.mv.to), INDEX_BITS);
        out.write(u32::from(self.mv.promotion), PROMOTION_BITS);
        out.bytes
    }
}

/// Decode one record.
///
/// Square values 13-15 have no piece letter and decode as empty; promotion
/// codes 5-7 decode as no promotion.
pub fn decode_record(bytes: &[u8]) -> Result<BookRecord, FormatError> {
    if bytes.len() != BookRecord::SIZE {
        return Err(FormatError::RecordLength {
            expected: BookRecord::SIZE,
            actual: bytes.len(),
        });
    }

    let mut bits = BitStream::new(bytes);
    let mut board = [0u8; 64];
    for sq in board.iter_mut() {
        let value = bits.read("board square", SQUARE_BITS)? as u8;
        *sq = if value > MAX_PIECE_CODE { 0 } else { value };
    }
    let from = bits.read("from-square index", INDEX_BITS)? as u8;
    let to = bits.read("to-square index", INDEX_BITS)? as u8;
    let promotion = bits.read("promotion piece", PROMOTION_BITS)? as u8;
    let promotion = if promotion > MAX_PROMOTION_CODE {
        0
    } else {
        promotion
    };

    Ok(BookRecord {
        board,
        mv: MoveRecord {
            from,
            to,
            promotion,
        },
    })
}

/// MSB-first bit reader over a byte slice.
struct BitStream<'a> {
    data: &'a [u8],
    bit_cursor: usize,
}

impl<'a> BitStream<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_cursor: 0,
        }
    }

    fn remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_cursor)
    }

    /// Read `n` bits (n <= 32), first bit read becomes the most significant.
    fn read(&mut self, field: &'static str, n: usize) -> Result<u32, FormatError> {
        let available = self.remaining();
        if available < n {
            return Err(FormatError::ShortField {
                field,
                needed: n,
                available,
            });
        }
        let mut result = 0u32;
        for _ in 0..n {
            let byte = self.data[self.bit_cursor / 8];
            let bit = (byte >> (7 - (self.bit_cursor & 7))) & 1;
            result = (result << 1) | u32::from(bit);
            self.bit_cursor += 1;
        }
        Ok(result)
    }
}

/// MSB-first bit writer producing exactly one record.
struct BitWriter {
    bytes: [u8; BookRecord::SIZE],
    bit_cursor: usize,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            bytes: [0u8; BookRecord::SIZE],
            bit_cursor: 0,
        }
    }

    fn write(&mut self, value: u32, n: usize) {
        for i in (0..n).rev() {
            if (value >> i) & 1 == 1 {
                self.bytes[self.bit_cursor / 8] |= 0x80 >> (self.bit_cursor & 7);
            }
            self.bit_cursor += 1;
        }
    }
}
