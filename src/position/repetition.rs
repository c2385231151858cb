//! Upcoming-repetition oracle and draw detection (C2 §4.2 edge case: detect
//! a repeatable position without playing it out). Grounded on the cuckoo
//! table built in `crate::zobrist` and the classic "does some reversible
//! move transform our key into a key we've already seen" check; during
//! search a single occurrence within the current line is enough to prune
//! (a forced repetition is as good as a draw), while root-level draw
//! claims need the full threefold count.

use super::Position;

#[must_use]
pub fn upcoming_repetition(pos: &Position) -> bool {
    let end = pos.halfmove_clock() as usize;
    if end < 3 {
        return false;
    }
    let len = pos.key_history.len();
    let original_key = pos.hash();

    let mut i = 3usize;
    while i <= end {
        if i + 1 > len {
            break;
        }
        let other_key = pos.key_history[len - 1 - i];
        let move_key = original_key ^ other_key;
        if let Some((s1, s2, _piece)) = crate::zobrist::cuckoo_lookup(move_key) {
            if crate::attacks::between(s1, s2) & pos.occupied() == 0 {
                let (empty_sq, occupied_sq) = if pos.piece_at(s1).is_none() {
                    (s1, s2)
                } else {
                    (s2, s1)
                };
                let _ = empty_sq;
                let piece_there = pos.piece_at(occupied_sq);
                if !piece_there.is_none() && piece_there.color() == pos.side_to_move() {
                    return true;
                }
            }
        }
        i += 2;
    }
    false
}

/// `ply_from_root` lets search treat a repetition that occurs entirely
/// within the current search line (beyond the root) as a draw on its first
/// occurrence, while a repetition anchored at or before the root needs the
/// full threefold count before it's claimable.
#[must_use]
pub fn is_draw(pos: &Position, ply_from_root: usize) -> bool {
    if pos.halfmove_clock() >= 100 {
        return true;
    }
    let len = pos.key_history.len();
    if len < 5 {
        return false;
    }
    let current = pos.hash();
    let limit = (pos.halfmove_clock() as usize).min(len - 1);

    let mut count = 0u32;
    let mut i = 4usize;
    while i <= limit {
        if pos.key_history[len - 1 - i] == current {
            count += 1;
            if ply_from_root > i || count >= 2 {
                return true;
            }
        }
        i += 2;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::types::{MoveKind, Move, Square};

    #[test]
    fn shuffling_knights_back_and_forth_is_a_draw() {
        crate::attacks::init();
        crate::zobrist::init();
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K1N1 w - - 0 1").unwrap();
        let out = Move::new(Square::from_file_rank(6, 0), Square::from_file_rank(5, 2), MoveKind::Quiet);
        let back = Move::new(Square::from_file_rank(5, 2), Square::from_file_rank(6, 0), MoveKind::Quiet);
        for _ in 0..2 {
            pos.make_move(out);
            pos.make_move(back);
        }
        assert!(pos.is_draw(0));
    }
}
