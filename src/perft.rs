//! `go perft <depth>` support and the node-count fixtures under
//! `tests/perft.rs`. Grounded on the teacher's debug/testing helpers; perft
//! itself is a bulk-counting tree walk with no pruning, used to validate
//! move generation and make/unmake against known-exact node counts.

use crate::movegen::{self, GenType};
use crate::position::Position;

#[must_use]
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = movegen::generate(pos, GenType::Legals);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for scored in &moves {
        pos.make_move(scored.mv);
        nodes += perft(pos, depth - 1);
        pos.undo_move(scored.mv);
    }
    nodes
}

/// `divide`: per-root-move node counts, for diffing against a reference
/// engine when perft disagrees.
#[must_use]
pub fn divide(pos: &mut Position, depth: u32) -> Vec<(crate::types::Move, u64)> {
    let moves = movegen::generate(pos, GenType::Legals);
    let mut out = Vec::with_capacity(moves.len());
    for scored in &moves {
        pos.make_move(scored.mv);
        let nodes = if depth == 0 { 1 } else { perft(pos, depth - 1) };
        pos.undo_move(scored.mv);
        out.push((scored.mv, nodes));
    }
    out
}
