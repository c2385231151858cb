use super::{push_targets, GenType};
use crate::attacks;
use crate::position::Position;
use crate::types::{Move, MoveKind, MoveList};

pub fn generate(pos: &Position, gen_type: GenType, list: &mut MoveList) {
    let us = pos.side_to_move();
    let from = pos.king_square(us);
    let attacks = attacks::king_attacks(from);
    let enemy = pos.occupied_by(!us);
    let empty = !pos.occupied();

    match gen_type {
        GenType::Noisy => push_targets(list, from, attacks & enemy, |f, t| Move::new(f, t, MoveKind::Capture)),
        GenType::Quiets => push_targets(list, from, attacks & empty, |f, t| Move::new(f, t, MoveKind::Quiet)),
        GenType::QuietChecks => {
            // A king move can only give check by discovery, which the
            // sliders already surface via their own check_mask; nothing to
            // add here.
        }
        GenType::Legals => {
            push_targets(list, from, attacks & enemy, |f, t| Move::new(f, t, MoveKind::Capture));
            push_targets(list, from, attacks & empty, |f, t| Move::new(f, t, MoveKind::Quiet));
        }
    }
}
