//! Incrementally maintained accumulator stack. Grounded on the teacher's
//! `NnueAccumulator { white, black: [i16; HIDDEN_SIZE] }` with
//! `new`/`refresh`/`add_feature`/`sub_feature`, extended with a per-ply
//! stack (so `make_move`/`undo_move` can push/pop rather than recompute)
//! and a king-bucketed refresh table, since a king move changes every
//! feature index for that perspective and a full recompute from the bucket
//! entry point is cheaper than patching 32 features incrementally.

use crate::position::Position;
use crate::types::{Color, Piece, PieceType, Square};

use super::network::{feature_index, king_bucket, NnueNetwork, FEATURE_PLANES, FT_SIZE};
use super::simd;

#[derive(Clone)]
pub struct Accumulator {
    pub white: [i16; FT_SIZE],
    pub black: [i16; FT_SIZE],
    /// Whether each perspective is up to date (false right after a king
    /// move, until `refresh` repopulates it from the refresh table).
    pub white_valid: bool,
    pub black_valid: bool,
}

impl Accumulator {
    #[must_use]
    pub fn new(net: &NnueNetwork) -> Self {
        Accumulator {
            white: *net.feature_bias,
            black: *net.feature_bias,
            white_valid: true,
            black_valid: true,
        }
    }

    fn add_feature(&mut self, net: &NnueNetwork, piece: Piece, sq: Square, king_sq_white: Square, king_sq_black: Square) {
        let wi = feature_index(piece, sq, Color::White, king_sq_white);
        simd::add_weights(&mut self.white, &net.feature_weights[wi]);
        let bi = feature_index(piece, sq, Color::Black, king_sq_black);
        simd::add_weights(&mut self.black, &net.feature_weights[bi]);
    }

    fn sub_feature(&mut self, net: &NnueNetwork, piece: Piece, sq: Square, king_sq_white: Square, king_sq_black: Square) {
        let wi = feature_index(piece, sq, Color::White, king_sq_white);
        simd::sub_weights(&mut self.white, &net.feature_weights[wi]);
        let bi = feature_index(piece, sq, Color::Black, king_sq_black);
        simd::sub_weights(&mut self.black, &net.feature_weights[bi]);
    }

    /// Full recompute from the board, the fallback path used both at game
    /// start and whenever the refresh table doesn't have a matching entry.
    pub fn refresh(&mut self, net: &NnueNetwork, pos: &Position) {
        self.white = *net.feature_bias;
        self.black = *net.feature_bias;
        let king_white = pos.king_square(Color::White);
        let king_black = pos.king_square(Color::Black);
        for sq_idx in 0..64u8 {
            let sq = Square(sq_idx);
            let piece = pos.piece_at(sq);
            if !piece.is_none() {
                self.add_feature(net, piece, sq, king_white, king_black);
            }
        }
        self.white_valid = true;
        self.black_valid = true;
    }
}

/// One entry per `(perspective, king bucket)`; reused across positions that
/// share a king bucket so a king move only costs one dirty-piece replay
/// from the cached entry instead of a full 32-piece recompute.
pub struct RefreshTable {
    entries: Vec<[i16; FT_SIZE]>,
}

impl RefreshTable {
    #[must_use]
    pub fn new(net: &NnueNetwork) -> Self {
        RefreshTable {
            entries: vec![*net.feature_bias; super::network::KING_BUCKETS * 2],
        }
    }

    fn slot(&mut self, perspective: Color, bucket: usize) -> &mut [i16; FT_SIZE] {
        &mut self.entries[perspective.index() * super::network::KING_BUCKETS + bucket]
    }
}

/// One dirty-piece event accumulated during `make_move`, replayed against
/// the accumulator stack lazily the next time an evaluation is requested.
#[derive(Clone, Copy)]
pub enum DirtyPiece {
    Added { piece: Piece, sq: Square },
    Removed { piece: Piece, sq: Square },
    Moved { piece: Piece, from: Square, to: Square },
}

pub struct AccumulatorStack {
    stack: Vec<Accumulator>,
    refresh_table: RefreshTable,
}

impl AccumulatorStack {
    #[must_use]
    pub fn new(net: &NnueNetwork, pos: &Position) -> Self {
        let mut acc = Accumulator::new(net);
        acc.refresh(net, pos);
        let mut refresh_table = RefreshTable::new(net);
        seed_refresh_table(&mut refresh_table, net, pos);
        AccumulatorStack { stack: vec![acc], refresh_table }
    }

    #[must_use]
    pub fn current(&self) -> &Accumulator {
        self.stack.last().expect("accumulator stack is never empty")
    }

    /// Pushes a new accumulator derived from the top of the stack, applying
    /// `dirty` moves. King moves force a full bucket refresh for the moving
    /// side's perspective; non-king moves patch incrementally.
    pub fn push(&mut self, net: &NnueNetwork, pos: &Position, dirty: &[DirtyPiece]) {
        let mut next = self.stack.last().expect("non-empty stack").clone();
        let king_white = pos.king_square(Color::White);
        let king_black = pos.king_square(Color::Black);

        for event in dirty {
            match *event {
                DirtyPiece::Added { piece, sq } => next.add_feature(net, piece, sq, king_white, king_black),
                DirtyPiece::Removed { piece, sq } => next.sub_feature(net, piece, sq, king_white, king_black),
                DirtyPiece::Moved { piece, from, to } => {
                    next.sub_feature(net, piece, from, king_white, king_black);
                    next.add_feature(net, piece, to, king_white, king_black);
                    if piece.piece_type() == PieceType::King {
                        let perspective = piece.color();
                        let bucket = king_bucket(if perspective == Color::Black { to.flip_rank() } else { to });
                        let cached = *self.refresh_table.slot(perspective, bucket);
                        match perspective {
                            Color::White => next.white = cached,
                            Color::Black => next.black = cached,
                        }
                        rebuild_one_perspective(&mut next, net, pos, perspective);
                        *self.refresh_table.slot(perspective, bucket) = match perspective {
                            Color::White => next.white,
                            Color::Black => next.black,
                        };
                    }
                }
            }
        }

        self.stack.push(next);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
        debug_assert!(!self.stack.is_empty(), "popped the root accumulator");
    }
}

fn rebuild_one_perspective(acc: &mut Accumulator, net: &NnueNetwork, pos: &Position, perspective: Color) {
    let king_white = pos.king_square(Color::White);
    let king_black = pos.king_square(Color::Black);
    let target = match perspective {
        Color::White => &mut acc.white,
        Color::Black => &mut acc.black,
    };
    *target = *net.feature_bias;
    for sq_idx in 0..64u8 {
        let sq = Square(sq_idx);
        let piece = pos.piece_at(sq);
        if piece.is_none() {
            continue;
        }
        let idx = feature_index(piece, sq, perspective, if perspective == Color::White { king_white } else { king_black });
        simd::add_weights(target, &net.feature_weights[idx]);
    }
}

fn seed_refresh_table(table: &mut RefreshTable, net: &NnueNetwork, pos: &Position) {
    let mut acc = Accumulator::new(net);
    acc.refresh(net, pos);
    let white_bucket = king_bucket(pos.king_square(Color::White));
    let black_bucket = king_bucket(pos.king_square(Color::Black).flip_rank());
    *table.slot(Color::White, white_bucket) = acc.white;
    *table.slot(Color::Black, black_bucket) = acc.black;
}

const _: () = assert!(FEATURE_PLANES == 768);

/// Computes the dirty-piece trail for `mv`, evaluated against `pos` *before*
/// the move is played (so captured/moved piece identities are still
/// resolvable from the board). Called by the search loop just ahead of
/// `Position::make_move`.
#[must_use]
pub fn dirty_pieces_for(pos: &Position, mv: crate::types::Move) -> arrayvec::ArrayVec<DirtyPiece, 4> {
    use crate::types::MoveKind;

    let mut dirty = arrayvec::ArrayVec::new();
    let from = mv.from();
    let to = mv.to();
    let piece = pos.piece_at(from);

    match mv.kind() {
        MoveKind::EnPassant => {
            let captured_sq = Square::from_file_rank(to.file(), from.rank());
            let captured = pos.piece_at(captured_sq);
            dirty.push(DirtyPiece::Removed { piece: captured, sq: captured_sq });
            dirty.push(DirtyPiece::Moved { piece, from, to });
        }
        MoveKind::Castling => {
            let home_rank = from.rank();
            let king_side = to.file() == 6;
            let rook_from = Square::from_file_rank(if king_side { 7 } else { 0 }, home_rank);
            let rook_to = Square::from_file_rank(if king_side { 5 } else { 3 }, home_rank);
            let rook = pos.piece_at(rook_from);
            dirty.push(DirtyPiece::Moved { piece, from, to });
            dirty.push(DirtyPiece::Moved { piece: rook, from: rook_from, to: rook_to });
        }
        _ => {
            let target = pos.piece_at(to);
            if !target.is_none() {
                dirty.push(DirtyPiece::Removed { piece: target, sq: to });
            }
            if let Some(promo_type) = mv.kind().promotion_piece() {
                dirty.push(DirtyPiece::Removed { piece, sq: from });
                dirty.push(DirtyPiece::Added {
                    piece: Piece::new(promo_type, piece.color()),
                    sq: to,
                });
            } else {
                dirty.push(DirtyPiece::Moved { piece, from, to });
            }
        }
    }
    dirty
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_net() -> NnueNetwork {
        let total = super::super::network::FEATURE_PLANES; // touch for doc purposes
        let _ = total;
        NnueNetwork::from_bytes(&vec![0u8; total_blob_len()]).unwrap()
    }

    fn total_blob_len() -> usize {
        use super::super::network::*;
        INPUT_SIZE * FT_SIZE * 2
            + FT_SIZE * 2
            + OUTPUT_BUCKETS * L1_SIZE * FT_SIZE
            + OUTPUT_BUCKETS * L1_SIZE * 4
            + OUTPUT_BUCKETS * L2_SIZE * L1_SIZE * 4
            + OUTPUT_BUCKETS * L2_SIZE * 4
            + OUTPUT_BUCKETS * L2_SIZE * 4
            + OUTPUT_BUCKETS * 4
    }

    #[test]
    fn refresh_from_zeroed_net_yields_feature_bias_only_on_empty_board() {
        crate::attacks::init();
        crate::zobrist::init();
        let net = synthetic_net();
        let pos = crate::position::Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut acc = Accumulator::new(&net);
        acc.refresh(&net, &pos);
        assert_eq!(acc.white, *net.feature_bias);
    }
}
