//! Static Exchange Evaluation (C2 §4.2). Standard swap-off algorithm:
//! repeatedly resolve the exchange with the least valuable attacker,
//! updating occupancy to expose X-ray attackers behind sliders, grounded on
//! `examples/original_source/src/chess/` SEE and the teacher's move-picker
//! capture ordering which assumes an SEE oracle exists.

use super::Position;
use crate::attacks;
use crate::bitboard::lsb;
use crate::types::{Move, MoveKind, PieceType, Square};

const SEE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20000];

#[inline]
fn value_of(pt: PieceType) -> i32 {
    SEE_VALUES[pt.index()]
}

fn least_valuable_attacker(pos: &Position, attackers: u64, by_color: crate::types::Color) -> Option<(Square, PieceType)> {
    for &pt in &crate::types::PIECE_TYPES {
        let candidates = attackers & pos.pieces(by_color, pt);
        if candidates != 0 {
            return Some((lsb(candidates), pt));
        }
    }
    None
}

/// True if the net material swing of playing `mv` and following through the
/// exchange sequence is `>= threshold`.
#[must_use]
pub fn see_ge(pos: &Position, mv: Move, threshold: i32) -> bool {
    if mv.is_castling() {
        return 0 >= threshold;
    }

    let from = mv.from();
    let to = mv.to();
    let mut occ = pos.occupied() & !from.bitboard();

    let (mut captured_value, mut attacker_type) = match mv.kind() {
        MoveKind::EnPassant => {
            let cap_sq = Square::from_file_rank(to.file(), from.rank());
            occ &= !cap_sq.bitboard();
            (value_of(PieceType::Pawn), PieceType::Pawn)
        }
        _ => {
            let target = pos.piece_at(to);
            let captured = if target.is_none() { 0 } else { value_of(target.piece_type()) };
            (captured, pos.piece_at(from).piece_type())
        }
    };

    if let Some(promo) = mv.kind().promotion_piece() {
        captured_value += value_of(promo) - value_of(PieceType::Pawn);
        attacker_type = promo;
    }

    occ |= to.bitboard();

    let mut swap = captured_value - threshold;
    if swap < 0 {
        return false;
    }
    swap -= value_of(attacker_type);
    if swap >= 0 {
        return true;
    }

    let mut side = !pos.side_to_move();
    let mut attackers = attackers_considering_xray(pos, to, occ);

    loop {
        let own_attackers = attackers & occupied_mask(pos, side, occ);
        if own_attackers == 0 {
            break;
        }
        let Some((sq, pt)) = least_valuable_attacker(pos, own_attackers, side) else {
            break;
        };
        occ &= !sq.bitboard();
        attackers &= !sq.bitboard();
        attackers |= xray_from(pos, to, occ) & occ;

        swap = -swap - 1 - value_of(pt);
        side = !side;
        if swap >= 0 {
            if pt == PieceType::King && (attackers & occupied_mask(pos, side, occ)) != 0 {
                side = !side;
            }
            break;
        }
    }

    side != pos.side_to_move()
}

fn occupied_mask(pos: &Position, color: crate::types::Color, occ: u64) -> u64 {
    (pos.occupied_by(color)) & occ
}

fn attackers_considering_xray(pos: &Position, sq: Square, occ: u64) -> u64 {
    attacks::knight_attacks(sq) & (pos.pieces(crate::types::Color::White, PieceType::Knight) | pos.pieces(crate::types::Color::Black, PieceType::Knight))
        | attacks::king_attacks(sq) & (pos.pieces(crate::types::Color::White, PieceType::King) | pos.pieces(crate::types::Color::Black, PieceType::King))
        | attacks::pawn_attacks(sq, crate::types::Color::Black) & pos.pieces(crate::types::Color::White, PieceType::Pawn)
        | attacks::pawn_attacks(sq, crate::types::Color::White) & pos.pieces(crate::types::Color::Black, PieceType::Pawn)
        | xray_from(pos, sq, occ)
}

fn xray_from(pos: &Position, sq: Square, occ: u64) -> u64 {
    let bishops = pos.pieces(crate::types::Color::White, PieceType::Bishop)
        | pos.pieces(crate::types::Color::Black, PieceType::Bishop)
        | pos.pieces(crate::types::Color::White, PieceType::Queen)
        | pos.pieces(crate::types::Color::Black, PieceType::Queen);
    let rooks = pos.pieces(crate::types::Color::White, PieceType::Rook)
        | pos.pieces(crate::types::Color::Black, PieceType::Rook)
        | pos.pieces(crate::types::Color::White, PieceType::Queen)
        | pos.pieces(crate::types::Color::Black, PieceType::Queen);
    (attacks::bishop_attacks(sq, occ) & bishops) | (attacks::rook_attacks(sq, occ) & rooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::types::MoveKind;

    #[test]
    fn pawn_takes_undefended_pawn_is_non_negative() {
        crate::attacks::init();
        crate::zobrist::init();
        let pos = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mv = Move::new(Square::from_file_rank(4, 3), Square::from_file_rank(3, 4), MoveKind::Capture);
        assert!(pos.see(mv, 0));
    }
}
