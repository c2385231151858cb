use super::{push_targets, GenType};
use crate::attacks;
use crate::bitboard::pop_lsb;
use crate::position::Position;
use crate::types::{Move, MoveKind, MoveList, PieceType};

pub fn generate(pos: &Position, gen_type: GenType, check_mask: u64, list: &mut MoveList) {
    let us = pos.side_to_move();
    let pinned = pos.pinned(us);
    let mut knights = pos.pieces(us, PieceType::Knight) & !pinned;
    let enemy = pos.occupied_by(!us);
    let empty = !pos.occupied();

    while knights != 0 {
        let from = pop_lsb(&mut knights);
        let attacks = attacks::knight_attacks(from) & check_mask;
        match gen_type {
            GenType::Noisy => push_targets(list, from, attacks & enemy, |f, t| Move::new(f, t, MoveKind::Capture)),
            GenType::Quiets => push_targets(list, from, attacks & empty, |f, t| Move::new(f, t, MoveKind::Quiet)),
            GenType::QuietChecks => {
                let them_king = pos.king_square(!us);
                let checking = attacks::knight_attacks(them_king);
                push_targets(list, from, attacks & empty & checking, |f, t| Move::new(f, t, MoveKind::Quiet));
            }
            GenType::Legals => {
                push_targets(list, from, attacks & enemy, |f, t| Move::new(f, t, MoveKind::Capture));
                push_targets(list, from, attacks & empty, |f, t| Move::new(f, t, MoveKind::Quiet));
            }
        }
    }
}
