//! Move agent: opening book first, UCI engine search after.
//!
//! [`MoveDecider`] answers one observation at a time. It consults the
//! [`chess_book::OpeningBook`] until the first miss, then drives a single
//! [`EngineSession`] with a per-move budget from [`TimeBudgetPolicy`].

pub mod config;
pub mod decider;
pub mod engine;
pub mod error;
pub mod time_budget;

pub use config::AgentConfig;
pub use decider::{EngineLauncher, MoveDecider, MoveEngine, Observation, ProcessLauncher};
pub use engine::{EngineConfig, EngineSession, SessionState, UciChannel};
pub use error::{AgentError, ConfigError, EngineError};
pub use time_budget::{TimeBudgetPolicy, TimeTier};
