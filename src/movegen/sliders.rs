use super::{push_targets, GenType};
use crate::attacks;
use crate::bitboard::pop_lsb;
use crate::position::Position;
use crate::types::{Move, MoveKind, MoveList, PieceType, Square};

fn attacks_for(piece_type: PieceType, from: Square, occ: u64) -> u64 {
    match piece_type {
        PieceType::Bishop => attacks::bishop_attacks(from, occ),
        PieceType::Rook => attacks::rook_attacks(from, occ),
        PieceType::Queen => attacks::queen_attacks(from, occ),
        _ => 0,
    }
}

pub fn generate(pos: &Position, gen_type: GenType, check_mask: u64, piece_type: PieceType, list: &mut MoveList) {
    let us = pos.side_to_move();
    let pinned = pos.pinned(us);
    let king_sq = pos.king_square(us);
    let occ = pos.occupied();
    let enemy = pos.occupied_by(!us);
    let empty = !occ;
    let them_king = pos.king_square(!us);

    let mut pieces = pos.pieces(us, piece_type);
    while pieces != 0 {
        let from = pop_lsb(&mut pieces);
        let mut targets = attacks_for(piece_type, from, occ) & check_mask;
        if pinned & from.bitboard() != 0 {
            targets &= attacks::line(king_sq, from);
        }

        match gen_type {
            GenType::Noisy => push_targets(list, from, targets & enemy, |f, t| Move::new(f, t, MoveKind::Capture)),
            GenType::Quiets => push_targets(list, from, targets & empty, |f, t| Move::new(f, t, MoveKind::Quiet)),
            GenType::QuietChecks => {
                let checking = attacks_for(piece_type, them_king, occ);
                push_targets(list, from, targets & empty & checking, |f, t| Move::new(f, t, MoveKind::Quiet));
            }
            GenType::Legals => {
                push_targets(list, from, targets & enemy, |f, t| Move::new(f, t, MoveKind::Capture));
                push_targets(list, from, targets & empty, |f, t| Move::new(f, t, MoveKind::Quiet));
            }
        }
    }
}
