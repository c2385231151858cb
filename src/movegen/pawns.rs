use super::GenType;
use crate::attacks;
use crate::bitboard::{pop_lsb, RANK_2, RANK_7};
use crate::position::Position;
use crate::types::{Color, Move, MoveKind, MoveList, MoveListExt, PieceType, Square};

const RANK_3: u64 = RANK_2 << 8;
const RANK_6: u64 = RANK_7 >> 8;

pub fn generate(pos: &Position, gen_type: GenType, check_mask: u64, list: &mut MoveList) {
    let us = pos.side_to_move();
    let pinned = pos.pinned(us);
    let king_sq = pos.king_square(us);
    let occ = pos.occupied();
    let empty = !occ;
    let enemy = pos.occupied_by(!us);
    let them_king = pos.king_square(!us);

    let promo_rank = if us == Color::White { crate::bitboard::RANK_8 } else { crate::bitboard::RANK_1 };
    let start_rank = if us == Color::White { RANK_2 } else { RANK_7 };
    let third_rank = if us == Color::White { RANK_3 } else { RANK_6 };

    let mut pawns = pos.pieces(us, PieceType::Pawn);
    while pawns != 0 {
        let from = pop_lsb(&mut pawns);
        let from_bb = from.bitboard();
        let is_pinned = pinned & from_bb != 0;
        let pin_line = if is_pinned { attacks::line(king_sq, from) } else { u64::MAX };

        let single = shift_forward(from_bb, us) & empty;
        let double = if from_bb & start_rank != 0 {
            shift_forward(single, us) & empty
        } else {
            0
        };
        let mut pushes = (single | double) & check_mask & pin_line;

        let mut captures = attacks::pawn_attacks(from, us) & enemy & check_mask & pin_line;

        match gen_type {
            GenType::Noisy => {
                emit_captures(list, from, captures & promo_rank, us, true);
                captures &= !promo_rank;
                emit_plain(list, from, captures, MoveKind::Capture);
                // Non-queen under-promotions are QUIETS-stage by convention,
                // even though queen promotions count as NOISY.
                emit_queen_push_promotions(list, from, pushes & promo_rank);
                emit_ep(pos, list, from, us, check_mask, pin_line);
            }
            GenType::Quiets => {
                pushes &= !promo_rank;
                emit_plain(list, from, pushes, MoveKind::Quiet);
                emit_underpromotions(list, from, (single | double) & check_mask & pin_line & promo_rank);
            }
            GenType::QuietChecks => {
                let checking_pushes = pushes & !promo_rank & attacks::pawn_attacks(them_king, !us);
                emit_plain(list, from, checking_pushes, MoveKind::Quiet);
            }
            GenType::Legals => {
                emit_captures(list, from, captures & promo_rank, us, false);
                emit_plain(list, from, captures & !promo_rank, MoveKind::Capture);
                emit_plain(list, from, pushes & !promo_rank, MoveKind::Quiet);
                emit_underpromotions(list, from, pushes & promo_rank);
                emit_queen_push_promotions(list, from, pushes & promo_rank);
                emit_ep(pos, list, from, us, check_mask, pin_line);
            }
        }
    }
}

fn shift_forward(bb: u64, color: Color) -> u64 {
    if color == Color::White {
        crate::bitboard::shift_north(bb)
    } else {
        crate::bitboard::shift_south(bb)
    }
}

fn emit_plain(list: &mut MoveList, from: Square, mut targets: u64, kind: MoveKind) {
    while targets != 0 {
        let to = pop_lsb(&mut targets);
        list.push_move(Move::new(from, to, kind));
    }
}

fn emit_queen_push_promotions(list: &mut MoveList, from: Square, mut targets: u64) {
    while targets != 0 {
        let to = pop_lsb(&mut targets);
        list.push_move(Move::new(from, to, MoveKind::PromoQueenQuiet));
    }
}

fn emit_underpromotions(list: &mut MoveList, from: Square, mut targets: u64) {
    while targets != 0 {
        let to = pop_lsb(&mut targets);
        list.push_move(Move::new(from, to, MoveKind::PromoRookQuiet));
        list.push_move(Move::new(from, to, MoveKind::PromoBishopQuiet));
        list.push_move(Move::new(from, to, MoveKind::PromoKnightQuiet));
    }
}

fn emit_captures(list: &mut MoveList, from: Square, mut targets: u64, _us: Color, noisy_only: bool) {
    while targets != 0 {
        let to = pop_lsb(&mut targets);
        list.push_move(Move::new(from, to, MoveKind::PromoQueenCapture));
        if !noisy_only {
            list.push_move(Move::new(from, to, MoveKind::PromoRookCapture));
            list.push_move(Move::new(from, to, MoveKind::PromoBishopCapture));
            list.push_move(Move::new(from, to, MoveKind::PromoKnightCapture));
        }
    }
}

fn emit_ep(pos: &Position, list: &mut MoveList, from: Square, us: Color, check_mask: u64, pin_line: u64) {
    let Some(ep_sq) = pos.en_passant_square() else { return };
    if attacks::pawn_attacks(from, us) & ep_sq.bitboard() == 0 {
        return;
    }
    let captured_sq = Square::from_file_rank(ep_sq.file(), from.rank());
    if check_mask & (ep_sq.bitboard() | captured_sq.bitboard()) == 0 && check_mask != u64::MAX {
        return;
    }
    if pin_line != u64::MAX && pin_line & ep_sq.bitboard() == 0 {
        return;
    }
    list.push_move(Move::new(from, ep_sq, MoveKind::EnPassant));
}
