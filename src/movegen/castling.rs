use crate::position::Position;
use crate::types::{Move, MoveKind, MoveList, MoveListExt, Square};

pub fn generate(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    let home_rank = if us == crate::types::Color::White { 0 } else { 7 };
    let king_from = Square::from_file_rank(4, home_rank);

    let king_side = Move::new(king_from, Square::from_file_rank(6, home_rank), MoveKind::Castling);
    if pos.is_pseudo_legal(king_side) {
        list.push_move(king_side);
    }

    let queen_side = Move::new(king_from, Square::from_file_rank(2, home_rank), MoveKind::Castling);
    if pos.is_pseudo_legal(queen_side) {
        list.push_move(queen_side);
    }
}
