//! Agent configuration (TOML).
//!
//! Every section is optional. Paths default to the competition layout; the
//! primary book / engine paths can be overridden from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_book::{BookError, OpeningBook};
use serde::{Deserialize, Serialize};

use crate::decider::MoveDecider;
use crate::engine::{DEFAULT_HASH_MB, EngineConfig};
use crate::error::ConfigError;
use crate::time_budget::TimeBudgetPolicy;

pub const BOOK_PATH_ENV: &str = "CHESS_AGENT_BOOK";
pub const ENGINE_PATH_ENV: &str = "CHESS_AGENT_ENGINE";

const DEFAULT_BOOK_PATH: &str = "/kaggle_simulations/agent/chess_data.bin";
const DEFAULT_BOOK_FALLBACK: &str = "./chess_data.bin";
const DEFAULT_ENGINE_PATH: &str = "/kaggle_simulations/agent/AltairChess";
const DEFAULT_ENGINE_FALLBACK: &str = "./submissions/altairchess_with_esteriod_v2.1.4/AltairChess";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub book: BookSection,
    pub engine: EngineSection,
    pub time: TimeBudgetPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookSection {
    pub path: PathBuf,
    pub fallback_path: PathBuf,
    /// `false` skips loading and goes straight to the engine
    pub enabled: bool,
}

impl Default for BookSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_BOOK_PATH),
            fallback_path: PathBuf::from(DEFAULT_BOOK_FALLBACK),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub path: PathBuf,
    pub fallback_path: PathBuf,
    pub args: Vec<String>,
    pub hash_mb: u32,
    pub clear_hash_after_search: bool,
    /// Unset = wait for the engine indefinitely
    pub read_timeout_ms: Option<u64>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_ENGINE_PATH),
            fallback_path: PathBuf::from(DEFAULT_ENGINE_FALLBACK),
            args: Vec::new(),
            hash_mb: DEFAULT_HASH_MB,
            clear_hash_after_search: true,
            read_timeout_ms: None,
        }
    }
}

impl AgentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `CHESS_AGENT_BOOK` / `CHESS_AGENT_ENGINE` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(path) = lookup(BOOK_PATH_ENV).filter(|p| !p.is_empty()) {
            self.book.path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENGINE_PATH_ENV).filter(|p| !p.is_empty()) {
            self.engine.path = PathBuf::from(path);
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            path: self.engine.path.clone(),
            args: self.engine.args.clone(),
            hash_mb: self.engine.hash_mb,
            clear_hash_after_search: self.engine.clear_hash_after_search,
            read_timeout: self.engine.read_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn open_book(&self) -> Result<OpeningBook, BookError> {
        if !self.book.enabled {
            log::info!("opening book disabled by config");
            return Ok(OpeningBook::disabled());
        }
        OpeningBook::open_with_fallback(&self.book.path, &self.book.fallback_path)
    }

    /// Load the book and build a decider that launches engine processes.
    pub fn build_decider(&self) -> Result<MoveDecider, BookError> {
        Ok(MoveDecider::new(
            self.open_book()?,
            self.time.clone(),
            self.engine_config(),
            self.engine.fallback_path.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_budget::TimeTier;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = AgentConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AgentConfig::default());
        assert_eq!(cfg.book.path, Path::new(DEFAULT_BOOK_PATH));
        assert_eq!(cfg.engine.hash_mb, 1);
        assert!(cfg.engine.clear_hash_after_search);
        assert_eq!(cfg.engine_config().read_timeout, None);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = AgentConfig::from_toml_str(
            r#"
            [engine]
            path = "/usr/local/bin/stockfish"
            args = ["--quiet"]
            read_timeout_ms = 5000

            [time]
            default_ms = 300
            tiers = [{ below = 2.0, movetime_ms = 100 }]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.engine.fallback_path, Path::new(DEFAULT_ENGINE_FALLBACK));
        let engine = cfg.engine_config();
        assert_eq!(engine.path, Path::new("/usr/local/bin/stockfish"));
        assert_eq!(engine.args, ["--quiet"]);
        assert_eq!(engine.read_timeout, Some(Duration::from_millis(5000)));
        assert_eq!(
            cfg.time.tiers,
            [TimeTier {
                below: 2.0,
                movetime_ms: 100
            }]
        );
        assert_eq!(cfg.time.move_time_ms(5.0), 300);
        assert_eq!(cfg.book, BookSection::default());
    }

    #[test]
    fn unknown_type_is_parse_error() {
        let err = AgentConfig::from_toml_str("[engine]\nhash_mb = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_primary_paths() {
        let mut cfg = AgentConfig::default();
        cfg.apply_env_with(|key| match key {
            BOOK_PATH_ENV => Some("/data/book.bin".to_string()),
            ENGINE_PATH_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.book.path, Path::new("/data/book.bin"));
        assert_eq!(cfg.engine.path, Path::new(DEFAULT_ENGINE_PATH));
        assert_eq!(cfg.book.fallback_path, Path::new(DEFAULT_BOOK_FALLBACK));
    }

    #[test]
    fn disabled_book_skips_loading() {
        let cfg = AgentConfig::from_toml_str("[book]\nenabled = false\npath = \"/nonexistent\"")
            .unwrap();
        let book = cfg.open_book().unwrap();
        assert!(!book.is_enabled());
    }

    #[test]
    fn missing_load_path_reports_read_error() {
        let err = AgentConfig::load(Path::new("/nonexistent/agent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
