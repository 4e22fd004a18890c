//! UCI engine subprocess client.
//!
//! Session lifecycle:
//!
//! ```text
//! Unstarted -> Handshaking -> Ready -> (Searching -> Ready)* -> Stopped
//! ```
//!
//! Every command is followed by a blocking read until the expected sentinel
//! line shows up. Without `read_timeout` a silent engine blocks the caller
//! forever. With it the whole wait for the sentinel, however many other lines
//! arrive meanwhile, ends in [`EngineError::ProtocolStall`].

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::EngineError;

/// Hash size requested at handshake (MiB). The engine is asked for the
/// minimum so a long game does not grow its memory.
pub const DEFAULT_HASH_MB: u32 = 1;

/// How long a dropped session waits for the engine to exit before killing it.
const ENGINE_EXIT_TIMEOUT: Duration = Duration::from_secs(2);
const ENGINE_EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Settings for one engine process.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    pub hash_mb: u32,
    /// Send `setoption name Clear Hash` after every search.
    pub clear_hash_after_search: bool,
    /// Upper bound on every sentinel wait. `None` waits forever.
    pub read_timeout: Option<Duration>,
}

impl EngineConfig {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            hash_mb: DEFAULT_HASH_MB,
            clear_hash_after_search: true,
            read_timeout: None,
        }
    }

    /// Same settings, different executable.
    pub fn with_path<P: Into<PathBuf>>(&self, path: P) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unstarted,
    Handshaking,
    Ready,
    Searching,
    Stopped,
}

/// Command writer plus the stream of engine output lines.
///
/// Holds the protocol logic; [`EngineSession`] wires it to a real process.
pub struct UciChannel<W: Write> {
    writer: W,
    rx: Receiver<String>,
    read_timeout: Option<Duration>,
}

impl<W: Write> UciChannel<W> {
    pub fn new(writer: W, rx: Receiver<String>, read_timeout: Option<Duration>) -> Self {
        Self {
            writer,
            rx,
            read_timeout,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        log::debug!("> {cmd}");
        self.writer.write_all(cmd.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Next output line, trimmed.
    ///
    /// `start` is when the wait for `expected` began; the read timeout counts
    /// from there, not from the previous line.
    pub fn recv_line(
        &self,
        expected: &'static str,
        start: Instant,
    ) -> Result<String, EngineError> {
        let line = match self.read_timeout {
            None => self.rx.recv().map_err(|_| EngineError::Disconnected { expected })?,
            Some(waited) => {
                let remaining = waited.saturating_sub(start.elapsed());
                if remaining.is_zero() {
                    return Err(EngineError::ProtocolStall { expected, waited });
                }
                self.rx.recv_timeout(remaining).map_err(|e| match e {
                    RecvTimeoutError::Timeout => EngineError::ProtocolStall { expected, waited },
                    RecvTimeoutError::Disconnected => EngineError::Disconnected { expected },
                })?
            }
        };
        Ok(line.trim().to_string())
    }

    /// `uci` ... `uciok`, then `isready` and the hash size.
    ///
    /// `readyok` is not awaited; the engine answers it before the next search.
    pub fn handshake(&mut self, hash_mb: u32) -> Result<(), EngineError> {
        self.send("uci")?;
        let start = Instant::now();
        loop {
            let line = self.recv_line("uciok", start)?;
            if line == "uciok" {
                break;
            }
            log::trace!("< {line}");
        }
        self.send("isready")?;
        self.send(&format!("setoption name Hash value {hash_mb}"))?;
        Ok(())
    }

    /// Search `fen` for `movetime_ms` and return the engine's bestmove.
    pub fn search(
        &mut self,
        fen: &str,
        movetime_ms: u64,
        clear_hash: bool,
    ) -> Result<String, EngineError> {
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go movetime {movetime_ms}"))?;

        let start = Instant::now();
        let bestmove = loop {
            let line = self.recv_line("bestmove", start)?;
            if line.starts_with("bestmove") {
                break parse_bestmove(&line)?;
            }
            log::trace!("< {line}");
        };

        if clear_hash {
            self.send("setoption name Clear Hash")?;
        }
        Ok(bestmove)
    }
}

fn parse_bestmove(line: &str) -> Result<String, EngineError> {
    line.split_whitespace()
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| EngineError::MalformedBestMove(line.to_string()))
}

/// One live engine process.
pub struct EngineSession {
    child: Child,
    channel: UciChannel<BufWriter<ChildStdin>>,
    config: EngineConfig,
    state: SessionState,
}

impl EngineSession {
    /// Start the engine and complete the handshake.
    pub fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: config.path.clone(),
                source,
            })?;
        let stdin = child.stdin.take().ok_or(EngineError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(EngineError::MissingPipe("stdout"))?;

        let (tx, rx) = mpsc::channel::<String>();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut session = Self {
            child,
            channel: UciChannel::new(BufWriter::new(stdin), rx, config.read_timeout),
            config: config.clone(),
            state: SessionState::Unstarted,
        };
        session.state = SessionState::Handshaking;
        session.channel.handshake(config.hash_mb)?;
        session.state = SessionState::Ready;
        log::info!("engine {} ready (pid {})", config.path.display(), session.child.id());
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Search a position for `movetime_ms` and return the move.
    pub fn query(&mut self, fen: &str, movetime_ms: u64) -> Result<String, EngineError> {
        self.state = SessionState::Searching;
        let mv = self
            .channel
            .search(fen, movetime_ms, self.config.clear_hash_after_search)?;
        self.state = SessionState::Ready;
        Ok(mv)
    }

    /// Send `quit`, ask the process to terminate and wait for it to exit.
    pub fn stop(mut self) -> Result<(), EngineError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        let quit = self.request_exit();
        let status = self.child.wait()?;
        log::info!("engine {} stopped ({status})", self.config.path.display());
        quit
    }

    /// Send `quit` and SIGTERM without waiting.
    fn request_exit(&mut self) -> Result<(), EngineError> {
        self.state = SessionState::Stopped;
        let quit = self.channel.send("quit");
        if let Err(e) = request_termination(&mut self.child) {
            log::debug!("terminate request failed: {e}");
        }
        quit
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        let _ = self.request_exit();
        let deadline = Instant::now() + ENGINE_EXIT_TIMEOUT;
        while Instant::now() < deadline {
            if let Ok(Some(_)) = self.child.try_wait() {
                return;
            }
            thread::sleep(ENGINE_EXIT_POLL_INTERVAL);
        }
        log::warn!("engine {} did not exit, killing it", self.config.path.display());
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(unix)]
fn request_termination(child: &mut Child) -> std::io::Result<()> {
    let pid = child.id() as libc::pid_t;
    // SAFETY: kill(2) only signals our own unreaped child; no memory is shared.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) -> std::io::Result<()> {
    child.kill()
}
