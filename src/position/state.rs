//! Per-move undo information (StateInfo). Grounded on the teacher's
//! `board::state::UnmakeInfo`/`NullMoveInfo` snapshot structs, extended with
//! the pawn/non-pawn hash triad and checker/pinner caches the search and
//! NNUE refresh path need.

use crate::types::{Color, Piece, Square};

#[derive(Debug, Clone, Copy)]
pub struct StateInfo {
    pub castling_rights: u8,
    pub en_passant_square: Option<Square>,
    pub halfmove_clock: u16,
    pub hash: u64,
    pub pawn_hash: u64,
    pub non_pawn_hash: [u64; 2],
    pub captured: Piece,
    /// Squares attacking the side to move's king, recomputed lazily and
    /// cached here so `in_check()` after `make_move` is O(1).
    pub checkers: u64,
    pub side_to_move: Color,
    pub repetition: i32,
}

impl StateInfo {
    #[must_use]
    pub fn empty() -> Self {
        StateInfo {
            castling_rights: 0,
            en_passant_square: None,
            halfmove_clock: 0,
            hash: 0,
            pawn_hash: 0,
            non_pawn_hash: [0, 0],
            captured: Piece::NONE,
            checkers: 0,
            side_to_move: Color::White,
            repetition: 0,
        }
    }
}
