//! Per-ply search stack frame. Grounded on the teacher's `SearchState`
//! carrying per-ply last-move/killer context through recursive calls;
//! generalized into an explicit `[Stack; MAX_PLY]` array the way the
//! original engine's search stack works, so continuation history lookups
//! can reach back one and two plies without extra parameter threading.

use crate::types::{Move, Piece, MAX_PLY};

#[derive(Clone, Copy)]
pub struct Stack {
    pub ply: usize,
    pub static_eval: i32,
    pub move_played: Move,
    pub piece_moved: Piece,
    pub pv: [Move; MAX_PLY],
    pub pv_len: usize,
    pub excluded_move: Move,
    pub double_extensions: u32,
    pub in_check: bool,
}

impl Stack {
    #[must_use]
    pub fn new(ply: usize) -> Self {
        Stack {
            ply,
            static_eval: crate::tt::VALUE_NONE,
            move_played: Move::NULL,
            piece_moved: Piece::NONE,
            pv: [Move::NULL; MAX_PLY],
            pv_len: 0,
            excluded_move: Move::NULL,
            double_extensions: 0,
            in_check: false,
        }
    }

    pub fn update_pv(&mut self, mv: Move, child_pv: &[Move]) {
        self.pv[0] = mv;
        let n = child_pv.len().min(MAX_PLY - 1);
        self.pv[1..=n].copy_from_slice(&child_pv[..n]);
        self.pv_len = n + 1;
    }

    #[must_use]
    pub fn pv_slice(&self) -> &[Move] {
        &self.pv[..self.pv_len]
    }
}

#[must_use]
pub fn new_stack_array() -> Box<[Stack; MAX_PLY]> {
    let mut stacks: Vec<Stack> = Vec::with_capacity(MAX_PLY);
    for ply in 0..MAX_PLY {
        stacks.push(Stack::new(ply));
    }
    stacks.try_into().unwrap_or_else(|_| unreachable!())
}
