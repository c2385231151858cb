//! UCI command round-trips, grounded on the teacher's
//! `tests/uci_integration.rs` style of driving the engine through string
//! commands rather than calling internal APIs directly.

use ventoux::config::EngineConfig;
use ventoux::engine::Engine;

#[test]
fn position_then_perft_matches_known_node_count() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_position(None, &[]).unwrap();
    assert_eq!(engine.perft(2), 400);
}

#[test]
fn position_with_moves_then_fen_round_trips() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_position(None, &["e2e4".to_string(), "e7e5".to_string()]).unwrap();
    assert_eq!(
        engine.position().fen(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
    );
}

#[test]
fn setoption_hash_resizes_transposition_table() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_hash_mb(4);
    assert_eq!(engine.config().hash_mb, 4);
}

#[test]
fn ucinewgame_resets_to_startpos() {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_position(None, &["e2e4".to_string()]).unwrap();
    engine.ucinewgame();
    assert_eq!(engine.position().fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
}
