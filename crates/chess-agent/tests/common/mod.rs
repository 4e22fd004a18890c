//! Shared helpers for chess-agent integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chess_book::{BookRecord, MoveRecord};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

pub fn mock_engine() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mock_uci_engine"))
}

/// Book holding one entry: start position -> e2e4.
pub fn write_start_book(dir: &Path) -> PathBuf {
    let mut board = [0u8; 64];
    let back = [4u8, 2, 3, 5, 6, 3, 2, 4];
    for (file, piece) in back.iter().enumerate() {
        board[file] = piece + 6;
        board[8 + file] = 7;
        board[48 + file] = 1;
        board[56 + file] = *piece;
    }
    let rec = BookRecord {
        board,
        mv: MoveRecord {
            from: 52,
            to: 36,
            promotion: 0,
        },
    };
    let path = dir.join("chess_data.bin");
    std::fs::write(&path, rec.to_bytes()).unwrap();
    path
}

/// Commands the mock engine received, one per line.
pub fn read_log(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
