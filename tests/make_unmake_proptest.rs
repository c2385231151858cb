//! Property tests over make/undo and FEN round trips, grounded on the
//! testable-properties section: playing and unplaying any legal move must
//! restore the exact hash, and a FEN parsed then re-formatted must be
//! byte-identical.

use proptest::prelude::*;
use ventoux::movegen::{self, GenType};
use ventoux::position::Position;

fn init() {
    ventoux::attacks::init();
    ventoux::zobrist::init();
}

const SEED_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

proptest! {
    #[test]
    fn make_undo_restores_hash_and_fen(seed_idx in 0usize..SEED_FENS.len(), move_idx in 0usize..64) {
        init();
        let fen = SEED_FENS[seed_idx];
        let mut pos = Position::from_fen(fen).unwrap();
        let before_hash = pos.hash();
        let before_fen = pos.fen();

        let legals = movegen::generate(&pos, GenType::Legals);
        if legals.is_empty() {
            return Ok(());
        }
        let mv = legals[move_idx % legals.len()].mv;

        pos.make_move(mv);
        pos.undo_move(mv);

        prop_assert_eq!(pos.hash(), before_hash);
        prop_assert_eq!(pos.fen(), before_fen);
    }
}

#[test]
fn fen_round_trips_exactly_for_seed_positions() {
    init();
    for fen in SEED_FENS {
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(&pos.fen(), fen);
    }
}
