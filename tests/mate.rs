//! End-to-end search scenarios from the external-interfaces test plan:
//! mate detection, avoiding a stalemating move, and root-move-count sanity.

use ventoux::config::EngineConfig;
use ventoux::engine::Engine;
use ventoux::timeman::TimeControl;

fn new_engine() -> Engine {
    Engine::new(EngineConfig::default())
}

#[test]
fn finds_mate_in_one() {
    let mut engine = new_engine();
    engine.set_position(Some("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1"), &[]).unwrap();
    let result = engine.go(TimeControl::Depth(2));
    assert!(result.score >= ventoux::search::VALUE_MATE - 2);
    assert_eq!(result.best_move.to().rank(), 7);
}

#[test]
fn avoids_stalemate_and_finds_progress() {
    let mut engine = new_engine();
    engine.set_position(Some("8/8/8/8/8/3k4/3p4/3K4 b - - 0 1"), &[]).unwrap();
    let result = engine.go(TimeControl::Depth(4));
    assert!(!result.best_move.is_null());
}

#[test]
fn startpos_depth_one_has_twenty_root_moves() {
    let mut engine = new_engine();
    let moves = engine.divide(1);
    assert_eq!(moves.len(), 20);
}

#[test]
fn startpos_shallow_score_is_near_equal() {
    let mut engine = new_engine();
    let result = engine.go(TimeControl::Depth(1));
    assert!(result.score >= -50 && result.score <= 50);
}
