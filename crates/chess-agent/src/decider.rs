//! Per-query move selection: opening book first, engine search after.

use std::path::PathBuf;

use chess_book::{OpeningBook, placement_field};
use serde::{Deserialize, Serialize};

use crate::engine::{EngineConfig, EngineSession};
use crate::error::{AgentError, EngineError};
use crate::time_budget::TimeBudgetPolicy;

/// One request from the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Position as FEN
    pub board: String,
    /// Overage time left for the rest of the game, in seconds
    #[serde(rename = "remainingOverageTime")]
    pub remaining_overage_time: f64,
}

/// Something that can pick a move for a position within a time budget.
pub trait MoveEngine {
    fn best_move(&mut self, fen: &str, movetime_ms: u64) -> Result<String, EngineError>;

    fn stop(self) -> Result<(), EngineError>
    where
        Self: Sized;
}

/// Creates engines for the decider.
pub trait EngineLauncher {
    type Engine: MoveEngine;

    fn launch(&mut self, config: &EngineConfig) -> Result<Self::Engine, EngineError>;
}

impl MoveEngine for EngineSession {
    fn best_move(&mut self, fen: &str, movetime_ms: u64) -> Result<String, EngineError> {
        self.query(fen, movetime_ms)
    }

    fn stop(self) -> Result<(), EngineError> {
        EngineSession::stop(self)
    }
}

/// Launches engine subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl EngineLauncher for ProcessLauncher {
    type Engine = EngineSession;

    fn launch(&mut self, config: &EngineConfig) -> Result<EngineSession, EngineError> {
        EngineSession::spawn(config)
    }
}

/// Answers queries for the lifetime of one game.
///
/// The book is consulted until its first miss and never again. The engine is
/// launched on the first miss and reused by every later query.
pub struct MoveDecider<L: EngineLauncher = ProcessLauncher> {
    book: OpeningBook,
    policy: TimeBudgetPolicy,
    engine_config: EngineConfig,
    fallback_path: PathBuf,
    launcher: L,
    engine: Option<L::Engine>,
}

impl MoveDecider<ProcessLauncher> {
    pub fn new(
        book: OpeningBook,
        policy: TimeBudgetPolicy,
        engine_config: EngineConfig,
        fallback_path: PathBuf,
    ) -> Self {
        Self::with_launcher(book, policy, engine_config, fallback_path, ProcessLauncher)
    }
}

impl<L: EngineLauncher> MoveDecider<L> {
    pub fn with_launcher(
        book: OpeningBook,
        policy: TimeBudgetPolicy,
        engine_config: EngineConfig,
        fallback_path: PathBuf,
        launcher: L,
    ) -> Self {
        Self {
            book,
            policy,
            engine_config,
            fallback_path,
            launcher,
            engine: None,
        }
    }

    pub fn decide(&mut self, obs: &Observation) -> Result<String, AgentError> {
        if self.book.is_enabled() {
            if let Some(mv) = self.book.get(placement_field(&obs.board)) {
                log::debug!("book move {mv}");
                return Ok(mv);
            }
            log::info!("left the opening book");
        }

        let movetime_ms = self.policy.move_time_ms(obs.remaining_overage_time);
        log::debug!(
            "searching {movetime_ms}ms ({:.3}s overage left)",
            obs.remaining_overage_time
        );
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => self.launch_engine()?,
        };
        let engine = self.engine.insert(engine);
        Ok(engine.best_move(&obs.board, movetime_ms)?)
    }

    fn launch_engine(&mut self) -> Result<L::Engine, AgentError> {
        match self.launcher.launch(&self.engine_config) {
            Ok(engine) => Ok(engine),
            Err(primary) => {
                log::warn!(
                    "primary engine failed ({primary}), trying {}",
                    self.fallback_path.display()
                );
                let fallback_config = self.engine_config.with_path(&self.fallback_path);
                self.launcher
                    .launch(&fallback_config)
                    .map_err(|fallback| AgentError::EngineUnavailable { primary, fallback })
            }
        }
    }

    pub fn book(&self) -> &OpeningBook {
        &self.book
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Stop the engine if one was started.
    pub fn shutdown(mut self) -> Result<(), EngineError> {
        match self.engine.take() {
            Some(engine) => engine.stop(),
            None => Ok(()),
        }
    }
}
