//! Pin/check mask legality (C2 edge case #4.2: legality without trial
//! make/undo). Grounded on the teacher's board move-generation legality
//! checks and `examples/original_source/src/chess/attacks.cpp`'s
//! `SQUARES_BETWEEN`/`LINE` usage for pin detection.

use super::Position;
use crate::attacks;
use crate::bitboard::pop_lsb;
use crate::types::{Color, Move, MoveKind, Piece, PieceType, Square};

#[must_use]
pub fn attackers_to(pos: &Position, sq: Square, occ: u64) -> u64 {
    attackers_to_by(pos, sq, occ, Color::White) | attackers_to_by(pos, sq, occ, Color::Black)
}

#[must_use]
pub fn attackers_to_by(pos: &Position, sq: Square, occ: u64, by: Color) -> u64 {
    let mut attackers = 0u64;
    attackers |= attacks::pawn_attacks(sq, !by) & pos.pieces(by, PieceType::Pawn);
    attackers |= attacks::knight_attacks(sq) & pos.pieces(by, PieceType::Knight);
    attackers |= attacks::king_attacks(sq) & pos.pieces(by, PieceType::King);
    let bishop_like = pos.pieces(by, PieceType::Bishop) | pos.pieces(by, PieceType::Queen);
    attackers |= attacks::bishop_attacks(sq, occ) & bishop_like;
    let rook_like = pos.pieces(by, PieceType::Rook) | pos.pieces(by, PieceType::Queen);
    attackers |= attacks::rook_attacks(sq, occ) & rook_like;
    attackers
}

/// Pieces of `color` that are pinned to their own king by an enemy slider,
/// found by casting rays from the king outward through exactly one of
/// `color`'s pieces to a slider of matching direction.
#[must_use]
pub fn pinned_pieces(pos: &Position, color: Color) -> u64 {
    let king_sq = pos.king_square(color);
    let enemy = !color;
    let mut pinned = 0u64;

    let enemy_bishops = pos.pieces(enemy, PieceType::Bishop) | pos.pieces(enemy, PieceType::Queen);
    let enemy_rooks = pos.pieces(enemy, PieceType::Rook) | pos.pieces(enemy, PieceType::Queen);

    let mut candidates = (attacks::bishop_attacks(king_sq, 0) & enemy_bishops)
        | (attacks::rook_attacks(king_sq, 0) & enemy_rooks);
    while candidates != 0 {
        let slider_sq = pop_lsb(&mut candidates);
        let between = attacks::between(king_sq, slider_sq) & pos.occupied();
        if between.count_ones() == 1 && (between & pos.occupied_by(color)) != 0 {
            pinned |= between;
        }
    }
    pinned
}

#[must_use]
pub fn is_pseudo_legal(pos: &Position, mv: Move) -> bool {
    if mv.is_null() {
        return false;
    }
    let us = pos.side_to_move();
    let piece = pos.piece_at(mv.from());
    if piece.is_none() || piece.color() != us {
        return false;
    }
    let target = pos.piece_at(mv.to());
    if !target.is_none() && target.color() == us && !mv.is_castling() {
        return false;
    }

    match mv.kind() {
        MoveKind::Castling => return is_pseudo_legal_castle(pos, mv),
        MoveKind::EnPassant => {
            return pos.en_passant_square() == Some(mv.to())
                && piece.piece_type() == PieceType::Pawn
                && (attacks::pawn_attacks(mv.from(), us) & mv.to().bitboard()) != 0;
        }
        _ => {}
    }

    if piece.piece_type() == PieceType::Pawn {
        return pawn_move_is_pseudo_legal(pos, mv, piece);
    }

    let attack_bb = attacks::attacks(piece.piece_type(), mv.from(), pos.occupied());
    mv.to().bitboard() & attack_bb != 0
}

fn pawn_move_is_pseudo_legal(pos: &Position, mv: Move, piece: Piece) -> bool {
    let us = piece.color();
    let from_bb = mv.from().bitboard();
    let to_bb = mv.to().bitboard();
    let target = pos.piece_at(mv.to());

    if mv.is_capture() {
        return (crate::attacks::pawn_attacks(mv.from(), us) & to_bb) != 0 && !target.is_none();
    }

    let single_push = if us == Color::White {
        from_bb << 8
    } else {
        from_bb >> 8
    };
    if single_push == to_bb {
        return target.is_none();
    }
    let start_rank_bb = if us == Color::White {
        crate::bitboard::RANK_2
    } else {
        crate::bitboard::RANK_7
    };
    let double_push = if us == Color::White {
        single_push << 8
    } else {
        single_push >> 8
    };
    if from_bb & start_rank_bb != 0 && double_push == to_bb {
        return target.is_none() && pos.piece_at(Square(crate::bitboard::lsb(single_push).0)).is_none();
    }
    false
}

fn is_pseudo_legal_castle(pos: &Position, mv: Move) -> bool {
    let us = pos.side_to_move();
    let (king_side_right, queen_side_right) = match us {
        Color::White => (super::CASTLE_WK, super::CASTLE_WQ),
        Color::Black => (super::CASTLE_BK, super::CASTLE_BQ),
    };
    let home_rank = if us == Color::White { 0u8 } else { 7u8 };
    let king_from = Square::from_file_rank(4, home_rank);
    if mv.from() != king_from || pos.in_check() {
        return false;
    }
    let to_file = mv.to().file();
    let (right, rook_from_file, path_files): (u8, u8, &[u8]) = if to_file == 6 {
        (king_side_right, 7, &[5, 6])
    } else if to_file == 2 {
        (queen_side_right, 0, &[1, 2, 3])
    } else {
        return false;
    };
    if pos.castling_rights() & right == 0 {
        return false;
    }
    let rook_from = Square::from_file_rank(rook_from_file, home_rank);
    if pos.piece_at(rook_from) != Piece::new(PieceType::Rook, us) {
        return false;
    }
    for &f in path_files {
        let sq = Square::from_file_rank(f, home_rank);
        if !pos.piece_at(sq).is_none() && sq != rook_from {
            return false;
        }
    }
    let king_path: &[u8] = if to_file == 6 { &[4, 5, 6] } else { &[2, 3, 4] };
    for &f in king_path {
        let sq = Square::from_file_rank(f, home_rank);
        if attackers_to_by(pos, sq, pos.occupied(), !us) != 0 {
            return false;
        }
    }
    true
}

#[must_use]
pub fn is_legal(pos: &Position, mv: Move) -> bool {
    let us = pos.side_to_move();
    let king_sq = pos.king_square(us);

    if mv.is_castling() {
        return is_pseudo_legal_castle(pos, mv);
    }

    if mv.kind() == MoveKind::EnPassant {
        // En-passant legality needs a real occupancy simulation: the
        // captured pawn can unmask a rank-pin on the king that no static
        // pin mask captures.
        let captured_sq = Square::from_file_rank(mv.to().file(), mv.from().rank());
        let occ_after = (pos.occupied() & !mv.from().bitboard() & !captured_sq.bitboard()) | mv.to().bitboard();
        return attackers_to_by(pos, king_sq, occ_after, !us) == 0;
    }

    let pinned = pinned_pieces(pos, us);
    if mv.from() == king_sq {
        let occ_after = (pos.occupied() & !mv.from().bitboard()) | mv.to().bitboard();
        return attackers_to_by(pos, mv.to(), occ_after, !us) == 0;
    }
    if pinned & mv.from().bitboard() == 0 {
        return pos.checkers().count_ones() <= 1 || in_check_block_mask(pos, king_sq) & mv.to().bitboard() != 0;
    }
    attacks::line(king_sq, mv.from()) & mv.to().bitboard() != 0
}

fn in_check_block_mask(pos: &Position, king_sq: Square) -> u64 {
    match pos.checkers().count_ones() {
        0 => u64::MAX,
        1 => {
            let checker_sq = crate::bitboard::lsb(pos.checkers());
            attacks::between(king_sq, checker_sq) | pos.checkers()
        }
        _ => 0,
    }
}

#[must_use]
pub fn gives_check(pos: &Position, mv: Move) -> bool {
    let us = pos.side_to_move();
    let them_king = pos.king_square(!us);
    let piece = pos.piece_at(mv.from());
    let piece_type = if mv.is_promotion() {
        mv.promotion_piece().unwrap_or(PieceType::Queen)
    } else {
        piece.piece_type()
    };

    let occ_after = (pos.occupied() & !mv.from().bitboard()) | mv.to().bitboard();
    let direct = match piece_type {
        PieceType::Pawn => attacks::pawn_attacks(mv.to(), us) & them_king.bitboard() != 0,
        PieceType::Knight => attacks::knight_attacks(mv.to()) & them_king.bitboard() != 0,
        PieceType::King => false,
        _ => attacks::attacks(piece_type, mv.to(), occ_after) & them_king.bitboard() != 0,
    };
    if direct {
        return true;
    }

    // Discovered check: a friendly slider's line to the enemy king opens up
    // once `mv.from()` is vacated, unless `mv.to()` re-blocks the same line.
    let bishop_like = pos.pieces(us, PieceType::Bishop) | pos.pieces(us, PieceType::Queen);
    let rook_like = pos.pieces(us, PieceType::Rook) | pos.pieces(us, PieceType::Queen);
    (attacks::bishop_attacks(them_king, occ_after) & bishop_like) != 0
        || (attacks::rook_attacks(them_king, occ_after) & rook_like) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_pawn_double_push_is_pseudo_legal() {
        crate::attacks::init();
        crate::zobrist::init();
        let pos = Position::startpos();
        let mv = Move::new(Square::from_file_rank(4, 1), Square::from_file_rank(4, 3), MoveKind::Quiet);
        assert!(pos.is_pseudo_legal(mv));
        assert!(pos.is_legal(mv));
    }

    #[test]
    fn startpos_has_no_pinned_pieces() {
        crate::attacks::init();
        crate::zobrist::init();
        let pos = Position::startpos();
        assert_eq!(pos.pinned(Color::White), 0);
    }
}
