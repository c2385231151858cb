//! make/unmake (C2 §4.2). Nine-step ordering: snapshot undo state, clear the
//! old en-passant key, resolve the move kind (normal/capture/castling/
//! en-passant/promotion), update castling rights, set a new en-passant
//! square on double pawn pushes, update the halfmove clock, flip the side to
//! move, push the new key onto the repetition history, and recompute
//! checkers. Grounded on the teacher's `UnmakeInfo`/`NullMoveInfo` snapshot
//! pattern in `board/state.rs`, generalized to maintain the pawn/non-pawn
//! hash triad incrementally rather than recomputing from scratch.

use super::{Position, StateInfo, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::types::{Color, Move, MoveKind, Piece, PieceType, Square};
use crate::zobrist;

fn castling_mask_for_square(sq: Square) -> u8 {
    match sq.index() {
        0 => CASTLE_WQ,
        4 => CASTLE_WK | CASTLE_WQ,
        7 => CASTLE_WK,
        56 => CASTLE_BQ,
        60 => CASTLE_BK | CASTLE_BQ,
        63 => CASTLE_BK,
        _ => 0,
    }
}

fn castle_rook_squares(from: Square, to: Square) -> (Square, Square) {
    let home_rank = from.rank();
    if to.file() == 6 {
        (
            Square::from_file_rank(7, home_rank),
            Square::from_file_rank(5, home_rank),
        )
    } else {
        (
            Square::from_file_rank(0, home_rank),
            Square::from_file_rank(3, home_rank),
        )
    }
}

pub fn make_move(pos: &mut Position, mv: Move) {
    let us = pos.side_to_move;
    let them = !us;
    let from = mv.from();
    let to = mv.to();
    let piece = pos.piece_at(from);
    debug_assert!(!piece.is_none() && piece.color() == us);

    let snapshot_side = us;
    let snapshot = StateInfo {
        castling_rights: pos.castling_rights,
        en_passant_square: pos.ep_square,
        halfmove_clock: pos.halfmove_clock,
        hash: pos.hash,
        pawn_hash: pos.pawn_hash,
        non_pawn_hash: pos.non_pawn_hash,
        captured: Piece::NONE,
        checkers: pos.checkers,
        side_to_move: snapshot_side,
        repetition: 0,
    };

    let mut hash = pos.hash;
    let mut pawn_hash = pos.pawn_hash;
    let mut non_pawn_hash = pos.non_pawn_hash;

    if let Some(ep) = pos.ep_square.take() {
        hash ^= zobrist::en_passant_key(ep.file());
    }

    let mut captured = Piece::NONE;

    match mv.kind() {
        MoveKind::EnPassant => {
            let captured_sq = Square::from_file_rank(to.file(), from.rank());
            captured = pos.remove_piece(captured_sq);
            let cap_key = zobrist::piece_key(captured, captured_sq);
            hash ^= cap_key;
            pawn_hash ^= cap_key;

            pos.move_piece(from, to);
            let move_key = zobrist::piece_key(piece, from) ^ zobrist::piece_key(piece, to);
            hash ^= move_key;
            pawn_hash ^= move_key;
        }
        MoveKind::Castling => {
            let (rook_from, rook_to) = castle_rook_squares(from, to);
            let rook = pos.remove_piece(rook_from);
            pos.move_piece(from, to);
            pos.set_piece(rook_to, rook);

            let king_key = zobrist::piece_key(piece, from) ^ zobrist::piece_key(piece, to);
            let rook_key = zobrist::piece_key(rook, rook_from) ^ zobrist::piece_key(rook, rook_to);
            hash ^= king_key ^ rook_key;
            non_pawn_hash[us.index()] ^= rook_key;
        }
        _ => {
            if !pos.piece_at(to).is_none() {
                captured = pos.remove_piece(to);
                let cap_key = zobrist::piece_key(captured, to);
                hash ^= cap_key;
                match captured.piece_type() {
                    PieceType::Pawn => pawn_hash ^= cap_key,
                    PieceType::King => {}
                    _ => non_pawn_hash[them.index()] ^= cap_key,
                }
            }

            if mv.is_promotion() {
                pos.remove_piece(from);
                let promo_type = mv.kind().promotion_piece().expect("promotion move carries a piece");
                let promo_piece = Piece::new(promo_type, us);
                pos.set_piece(to, promo_piece);
                let from_key = zobrist::piece_key(piece, from);
                hash ^= from_key;
                pawn_hash ^= from_key;
                let to_key = zobrist::piece_key(promo_piece, to);
                hash ^= to_key;
                non_pawn_hash[us.index()] ^= to_key;
            } else {
                pos.move_piece(from, to);
                let move_key = zobrist::piece_key(piece, from) ^ zobrist::piece_key(piece, to);
                hash ^= move_key;
                match piece.piece_type() {
                    PieceType::Pawn => pawn_hash ^= move_key,
                    PieceType::King => {}
                    _ => non_pawn_hash[us.index()] ^= move_key,
                }
            }
        }
    }

    if piece.piece_type() == PieceType::Pawn {
        let diff = (to.index() as i16 - from.index() as i16).abs();
        if diff == 16 {
            let ep_sq = Square(((from.index() + to.index()) / 2) as u8);
            pos.ep_square = Some(ep_sq);
            hash ^= zobrist::en_passant_key(ep_sq.file());
        }
    }

    let old_rights = pos.castling_rights;
    let new_rights = old_rights & !castling_mask_for_square(from) & !castling_mask_for_square(to);
    if new_rights != old_rights {
        hash ^= zobrist::castling_key(old_rights);
        hash ^= zobrist::castling_key(new_rights);
        pos.castling_rights = new_rights;
    }

    if piece.piece_type() == PieceType::Pawn || !captured.is_none() {
        pos.halfmove_clock = 0;
    } else {
        pos.halfmove_clock += 1;
    }

    hash ^= zobrist::side_key();
    pos.side_to_move = them;
    if us == Color::Black {
        pos.fullmove_number += 1;
    }

    pos.hash = hash;
    pos.pawn_hash = pawn_hash;
    pos.non_pawn_hash = non_pawn_hash;
    pos.key_history.push(hash);

    let mut stored = snapshot;
    stored.captured = captured;
    pos.history.push(stored);

    pos.recompute_checkers();
}

pub fn undo_move(pos: &mut Position, mv: Move) {
    let snapshot = pos
        .history
        .pop()
        .expect("undo_move called without a matching make_move");
    let us = snapshot.side_to_move;
    let from = mv.from();
    let to = mv.to();

    if us == Color::Black {
        pos.fullmove_number -= 1;
    }
    pos.side_to_move = us;

    match mv.kind() {
        MoveKind::EnPassant => {
            let piece = pos.remove_piece(to);
            pos.set_piece(from, piece);
            let captured_sq = Square::from_file_rank(to.file(), from.rank());
            pos.set_piece(captured_sq, snapshot.captured);
        }
        MoveKind::Castling => {
            let (rook_from, rook_to) = castle_rook_squares(from, to);
            let king = pos.remove_piece(to);
            pos.set_piece(from, king);
            let rook = pos.remove_piece(rook_to);
            pos.set_piece(rook_from, rook);
        }
        _ => {
            if mv.is_promotion() {
                pos.remove_piece(to);
                pos.set_piece(from, Piece::new(PieceType::Pawn, us));
            } else {
                let piece = pos.remove_piece(to);
                pos.set_piece(from, piece);
            }
            if !snapshot.captured.is_none() {
                pos.set_piece(to, snapshot.captured);
            }
        }
    }

    pos.castling_rights = snapshot.castling_rights;
    pos.ep_square = snapshot.en_passant_square;
    pos.halfmove_clock = snapshot.halfmove_clock;
    pos.hash = snapshot.hash;
    pos.pawn_hash = snapshot.pawn_hash;
    pos.non_pawn_hash = snapshot.non_pawn_hash;
    pos.checkers = snapshot.checkers;
    pos.key_history.pop();
}

pub fn make_null(pos: &mut Position) {
    let us = pos.side_to_move;
    let snapshot = StateInfo {
        castling_rights: pos.castling_rights,
        en_passant_square: pos.ep_square,
        halfmove_clock: pos.halfmove_clock,
        hash: pos.hash,
        pawn_hash: pos.pawn_hash,
        non_pawn_hash: pos.non_pawn_hash,
        captured: Piece::NONE,
        checkers: pos.checkers,
        side_to_move: us,
        repetition: 0,
    };

    let mut hash = pos.hash;
    if let Some(ep) = pos.ep_square.take() {
        hash ^= zobrist::en_passant_key(ep.file());
    }
    hash ^= zobrist::side_key();
    pos.hash = hash;
    pos.side_to_move = !us;
    pos.halfmove_clock += 1;
    pos.key_history.push(hash);
    pos.history.push(snapshot);
    pos.recompute_checkers();
}

pub fn undo_null(pos: &mut Position) {
    let snapshot = pos
        .history
        .pop()
        .expect("undo_null called without a matching make_null");
    pos.side_to_move = snapshot.side_to_move;
    pos.castling_rights = snapshot.castling_rights;
    pos.ep_square = snapshot.en_passant_square;
    pos.halfmove_clock = snapshot.halfmove_clock;
    pos.hash = snapshot.hash;
    pos.pawn_hash = snapshot.pawn_hash;
    pos.non_pawn_hash = snapshot.non_pawn_hash;
    pos.checkers = snapshot.checkers;
    pos.key_history.pop();
}

/// Hash after `mv` without mutating `pos`. Exact for the fields that matter
/// to TT prefetch and move ordering (piece placement, side to move, en
/// passant, castling rights).
#[must_use]
pub fn key_after(pos: &Position, mv: Move) -> u64 {
    let us = pos.side_to_move;
    let from = mv.from();
    let to = mv.to();
    let piece = pos.piece_at(from);
    let mut hash = pos.hash;

    if let Some(ep) = pos.ep_square {
        hash ^= zobrist::en_passant_key(ep.file());
    }

    match mv.kind() {
        MoveKind::EnPassant => {
            let captured_sq = Square::from_file_rank(to.file(), from.rank());
            let captured = pos.piece_at(captured_sq);
            hash ^= zobrist::piece_key(captured, captured_sq);
            hash ^= zobrist::piece_key(piece, from) ^ zobrist::piece_key(piece, to);
        }
        MoveKind::Castling => {
            let (rook_from, rook_to) = castle_rook_squares(from, to);
            let rook = pos.piece_at(rook_from);
            hash ^= zobrist::piece_key(piece, from) ^ zobrist::piece_key(piece, to);
            hash ^= zobrist::piece_key(rook, rook_from) ^ zobrist::piece_key(rook, rook_to);
        }
        _ => {
            let target = pos.piece_at(to);
            if !target.is_none() {
                hash ^= zobrist::piece_key(target, to);
            }
            if let Some(promo_type) = mv.kind().promotion_piece() {
                hash ^= zobrist::piece_key(piece, from);
                hash ^= zobrist::piece_key(Piece::new(promo_type, us), to);
            } else {
                hash ^= zobrist::piece_key(piece, from) ^ zobrist::piece_key(piece, to);
            }
        }
    }

    let old_rights = pos.castling_rights;
    let new_rights = old_rights & !castling_mask_for_square(from) & !castling_mask_for_square(to);
    if new_rights != old_rights {
        hash ^= zobrist::castling_key(old_rights);
        hash ^= zobrist::castling_key(new_rights);
    }

    if piece.piece_type() == PieceType::Pawn {
        let diff = (to.index() as i16 - from.index() as i16).abs();
        if diff == 16 {
            let ep_sq = Square(((from.index() + to.index()) / 2) as u8);
            hash ^= zobrist::en_passant_key(ep_sq.file());
        }
    }

    hash ^ zobrist::side_key()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn make_then_undo_restores_startpos_hash() {
        crate::attacks::init();
        crate::zobrist::init();
        let mut pos = Position::startpos();
        let original_hash = pos.hash();
        let mv = Move::new(Square::from_file_rank(4, 1), Square::from_file_rank(4, 3), MoveKind::Quiet);
        pos.make_move(mv);
        assert_ne!(pos.hash(), original_hash);
        pos.undo_move(mv);
        assert_eq!(pos.hash(), original_hash);
        assert_eq!(pos.fen(), Position::startpos().fen());
    }

    #[test]
    fn make_null_then_undo_null_restores_position() {
        crate::attacks::init();
        crate::zobrist::init();
        let mut pos = Position::startpos();
        let original_hash = pos.hash();
        pos.make_null();
        pos.undo_null();
        assert_eq!(pos.hash(), original_hash);
    }
}
