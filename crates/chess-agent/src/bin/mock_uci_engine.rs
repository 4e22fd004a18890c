//! Minimal scripted UCI engine for integration tests.
//!
//! Answers `uci` and `isready`, and replies to every `go` with a fixed move
//! (`e2e4` for white to move, `e7e5` for black).
//!
//! Built with the `cli` feature; see `--help` for the scripting flags.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Scripted UCI engine for chess-agent tests")]
struct Script {
    /// Append every received command to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Never send `uciok`
    #[arg(long, default_value_t = false)]
    stall_handshake: bool,

    /// Never send `bestmove`
    #[arg(long, default_value_t = false)]
    stall_search: bool,

    /// Exit as soon as a search starts
    #[arg(long, default_value_t = false)]
    exit_on_go: bool,

    /// Ignore `quit` and SIGTERM; only SIGKILL ends the process
    #[arg(long, default_value_t = false)]
    ignore_quit: bool,
}

fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(unix)]
fn ignore_sigterm() {
    // SAFETY: installs the default ignore disposition; no handler code runs.
    unsafe {
        libc::signal(libc::SIGTERM, libc::SIG_IGN);
    }
}

#[cfg(not(unix))]
fn ignore_sigterm() {}

fn main() -> io::Result<()> {
    let script = Script::parse();
    if script.ignore_quit {
        ignore_sigterm();
    }
    let mut log = script.log.as_deref().map(open_log).transpose()?;
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    let mut black_to_move = false;

    for line in stdin.lock().lines() {
        let line = line?;
        let cmd = line.trim();
        if let Some(log) = log.as_mut() {
            writeln!(log, "{cmd}")?;
            log.flush()?;
        }
        let mut tokens = cmd.split_whitespace();
        match tokens.next() {
            Some("uci") => {
                writeln!(out, "id name MockEngine")?;
                writeln!(out, "id author chess-agent")?;
                writeln!(out, "option name Hash type spin default 16 min 1 max 1024")?;
                if !script.stall_handshake {
                    writeln!(out, "uciok")?;
                }
            }
            Some("isready") => writeln!(out, "readyok")?,
            Some("position") => {
                // position fen <placement> <side> ...
                black_to_move = tokens.nth(2) == Some("b");
            }
            Some("go") => {
                if script.exit_on_go {
                    return Ok(());
                }
                if !script.stall_search {
                    let mv = if black_to_move { "e7e5" } else { "e2e4" };
                    writeln!(out, "info depth 1 score cp 0 pv {mv}")?;
                    writeln!(out, "bestmove {mv}")?;
                }
            }
            Some("quit") if !script.ignore_quit => return Ok(()),
            _ => {}
        }
        out.flush()?;
    }
    Ok(())
}
