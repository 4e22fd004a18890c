//! EngineSession against the scripted mock engine

mod common;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chess_agent::{
    AgentError, EngineConfig, EngineError, EngineSession, MoveDecider, Observation, SessionState,
    TimeBudgetPolicy,
};
use chess_book::OpeningBook;
use common::{AFTER_E4, START_FEN, mock_engine, read_log};

fn logged_config(log: &std::path::Path) -> EngineConfig {
    let mut cfg = EngineConfig::new(mock_engine());
    cfg.args = vec!["--log".to_string(), log.display().to_string()];
    cfg
}

#[test]
fn handshake_query_and_stop() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("commands.log");
    let mut session = EngineSession::spawn(&logged_config(&log)).unwrap();
    assert_eq!(session.state(), SessionState::Ready);

    assert_eq!(session.query(START_FEN, 175).unwrap(), "e2e4");
    assert_eq!(session.query(AFTER_E4, 90).unwrap(), "e7e5");
    assert_eq!(session.state(), SessionState::Ready);
    session.stop().unwrap();

    let expected = vec![
        "uci".to_string(),
        "isready".to_string(),
        "setoption name Hash value 1".to_string(),
        format!("position fen {START_FEN}"),
        "go movetime 175".to_string(),
        "setoption name Clear Hash".to_string(),
        format!("position fen {AFTER_E4}"),
        "go movetime 90".to_string(),
    ];
    // commands sent after the last bestmove race with SIGTERM on stop
    let log = read_log(&log);
    assert!(log.len() >= expected.len(), "{log:?}");
    assert_eq!(log[..expected.len()], expected[..]);
}

#[test]
fn missing_executable_is_spawn_error() {
    let cfg = EngineConfig::new("/nonexistent/engine-binary");
    match EngineSession::spawn(&cfg) {
        Err(EngineError::Spawn { path, .. }) => {
            assert_eq!(path, PathBuf::from("/nonexistent/engine-binary"))
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("spawn should fail"),
    }
}

#[test]
fn stalled_handshake_times_out() {
    let mut cfg = EngineConfig::new(mock_engine());
    cfg.args = vec!["--stall-handshake".to_string()];
    cfg.read_timeout = Some(Duration::from_millis(200));
    match EngineSession::spawn(&cfg) {
        Err(EngineError::ProtocolStall { expected, .. }) => assert_eq!(expected, "uciok"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("handshake should stall"),
    }
}

#[test]
fn stalled_search_times_out() {
    let mut cfg = EngineConfig::new(mock_engine());
    cfg.args = vec!["--stall-search".to_string()];
    cfg.read_timeout = Some(Duration::from_millis(300));
    let mut session = EngineSession::spawn(&cfg).unwrap();
    let err = session.query(START_FEN, 75).unwrap_err();
    assert!(matches!(err, EngineError::ProtocolStall { expected: "bestmove", .. }));
}

#[test]
fn engine_exit_mid_search_is_disconnect() {
    let mut cfg = EngineConfig::new(mock_engine());
    cfg.args = vec!["--exit-on-go".to_string()];
    let mut session = EngineSession::spawn(&cfg).unwrap();
    let err = session.query(START_FEN, 75).unwrap_err();
    assert!(matches!(err, EngineError::Disconnected { expected: "bestmove" }));
}

#[cfg(unix)]
#[test]
fn dropping_session_kills_engine_that_ignores_quit() {
    let mut cfg = EngineConfig::new(mock_engine());
    cfg.args = vec!["--ignore-quit".to_string()];
    let mut session = EngineSession::spawn(&cfg).unwrap();
    assert_eq!(session.query(START_FEN, 75).unwrap(), "e2e4");

    let start = Instant::now();
    drop(session);
    // quit and SIGTERM are ignored; drop returns only once the kill is reaped
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
fn decider_falls_back_to_working_engine() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("commands.log");
    let mut primary = logged_config(&log);
    primary.path = PathBuf::from("/nonexistent/engine-binary");
    let mut decider = MoveDecider::new(
        OpeningBook::disabled(),
        TimeBudgetPolicy::default(),
        primary,
        mock_engine(),
    );

    for (fen, remaining, expected) in [(START_FEN, 8.0, "e2e4"), (AFTER_E4, 0.4, "e7e5")] {
        let obs = Observation {
            board: fen.to_string(),
            remaining_overage_time: remaining,
        };
        assert_eq!(decider.decide(&obs).unwrap(), expected);
    }
    decider.shutdown().unwrap();

    let log = read_log(&log);
    // one handshake only: the session is reused
    assert_eq!(log.iter().filter(|l| *l == "uci").count(), 1);
    assert!(log.contains(&"go movetime 175".to_string()));
    assert!(log.contains(&"go movetime 75".to_string()));
}

#[test]
fn decider_without_any_engine_fails() {
    let mut decider = MoveDecider::new(
        OpeningBook::disabled(),
        TimeBudgetPolicy::default(),
        EngineConfig::new("/nonexistent/a"),
        PathBuf::from("/nonexistent/b"),
    );
    let obs = Observation {
        board: START_FEN.to_string(),
        remaining_overage_time: 10.0,
    };
    match decider.decide(&obs) {
        Err(AgentError::EngineUnavailable { primary, fallback }) => {
            assert!(matches!(primary, EngineError::Spawn { .. }));
            assert!(matches!(fallback, EngineError::Spawn { .. }));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
