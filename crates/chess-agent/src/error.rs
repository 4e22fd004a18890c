//! Error types for the engine client and the move decider

use std::path::PathBuf;
use std::time::Duration;

/// Failures talking to the engine subprocess.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// The executable could not be started
    #[error("failed to spawn engine at {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A standard stream was not piped
    #[error("engine {0} pipe unavailable")]
    MissingPipe(&'static str),

    /// Writing to the engine failed
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine output closed before the expected line arrived
    #[error("engine exited while waiting for {expected}")]
    Disconnected { expected: &'static str },

    /// The expected line did not arrive within the configured read timeout
    #[error("no {expected} from engine within {waited:?}")]
    ProtocolStall {
        expected: &'static str,
        waited: Duration,
    },

    /// `bestmove` line without a move token
    #[error("malformed bestmove line: {0:?}")]
    MalformedBestMove(String),
}

/// Failures surfaced by [`crate::MoveDecider`].
#[derive(thiserror::Error, Debug)]
pub enum AgentError {
    /// Neither the primary nor the fallback engine could be started
    #[error("engine unavailable (primary: {primary}; fallback: {fallback})")]
    EngineUnavailable {
        primary: EngineError,
        #[source]
        fallback: EngineError,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Configuration file problems
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
