//! C8: search. Grounded on the teacher's `board::search` module
//! (`SearchResult`, `SearchStats`, the unified `search()` entry point and
//! its `find_best_move*` wrappers), rebuilt around the spec's negamax/PVS
//! core with the full modern gate sequence: mate-distance pruning, TT
//! cutoffs, internal iterative reduction, razoring, reverse futility
//! pruning, null-move pruning, futility pruning, late-move reductions, and
//! a correction-history-adjusted static eval feeding all of the above.

mod params;
mod stack;

pub use stack::Stack;

use std::sync::atomic::Ordering;

use crate::history::Histories;
use crate::move_picker::{ContRef, MovePicker};
use crate::nnue::accumulator::{dirty_pieces_for, AccumulatorStack};
use crate::position::Position;
use crate::threads::SharedContext;
use crate::timeman::TimeManager;
use crate::tt::{Bound, VALUE_NONE};
use crate::types::{Move, MoveList, ScoredMove, MAX_PLY};

pub const VALUE_MATE: i32 = 32000;
pub const VALUE_INFINITE: i32 = 32001;
const VALUE_MATE_IN_MAX_PLY: i32 = VALUE_MATE - MAX_PLY as i32;
const VALUE_MATED_IN_MAX_PLY: i32 = -VALUE_MATE_IN_MAX_PLY;

#[derive(Debug, Clone, Copy)]
pub struct RootMove {
    pub best_move: Move,
    pub ponder_move: Option<Move>,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub best_move: Move,
    pub ponder_move: Option<Move>,
    pub score: i32,
    pub depth_completed: i32,
    pub seldepth: i32,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

struct Worker<'a> {
    shared: &'a SharedContext,
    time_manager: &'a TimeManager,
    histories: &'a mut Histories,
    acc_stack: AccumulatorStack,
    nodes: u64,
    seldepth: i32,
    stacks: Box<[Stack; MAX_PLY]>,
}

/// Driven by `threads::ThreadPool::search`, one call per worker thread.
/// Runs iterative deepening with aspiration windows until the time manager
/// or the global stop flag says to halt, then reports its final line.
#[must_use]
pub fn run_iterative_deepening(
    pos: &mut Position,
    histories: &mut Histories,
    shared: &SharedContext,
    time_manager: &TimeManager,
    _is_main: bool,
) -> SearchReport {
    let acc_stack = AccumulatorStack::new(&shared.nnue, pos);
    let mut worker = Worker {
        shared,
        time_manager,
        histories,
        acc_stack,
        nodes: 0,
        seldepth: 0,
        stacks: stack::new_stack_array(),
    };

    let mut best = RootMove { best_move: Move::NULL, ponder_move: None };
    let mut score = 0;
    let mut depth_completed = 0;
    let mut pv: Vec<Move> = Vec::new();

    let mut depth = 1;
    loop {
        if depth > 1 && (worker.time_manager.should_stop_depth_loop() || worker.shared.stop.load(Ordering::Acquire)) {
            break;
        }

        let mut window = params::ASPIRATION_WINDOW;
        let (mut alpha, mut beta) = if depth <= 4 {
            (-VALUE_INFINITE, VALUE_INFINITE)
        } else {
            (score - window, score + window)
        };

        let iteration_score = loop {
            let s = worker.negamax(pos, alpha, beta, depth, 0, false);
            if worker.shared.stop.load(Ordering::Acquire) {
                break s;
            }
            if s <= alpha {
                alpha = (alpha - window).max(-VALUE_INFINITE);
            } else if s >= beta {
                beta = (beta + window).min(VALUE_INFINITE);
            } else {
                break s;
            }
            window *= params::ASPIRATION_GROW_FACTOR;
        };

        if worker.shared.stop.load(Ordering::Acquire) && depth > 1 {
            break;
        }

        score = iteration_score;
        depth_completed = depth;
        let iter_pv = worker.stacks[0].pv_slice();
        if !iter_pv.is_empty() {
            best.best_move = iter_pv[0];
            best.ponder_move = iter_pv.get(1).copied();
            pv = iter_pv.to_vec();
        }

        if depth as usize >= MAX_PLY - 1 || score.abs() >= VALUE_MATE_IN_MAX_PLY {
            break;
        }
        depth += 1;
    }

    worker.shared.global_nodes.fetch_add(worker.nodes, Ordering::Relaxed);
    SearchReport {
        best_move: best.best_move,
        ponder_move: best.ponder_move,
        score,
        depth_completed,
        seldepth: worker.seldepth,
        nodes: worker.nodes,
        pv,
    }
}

impl<'a> Worker<'a> {
    fn should_stop(&self) -> bool {
        self.shared.stop.load(Ordering::Acquire) || (self.nodes % 2048 == 0 && self.time_manager.should_stop_hard())
    }

    fn static_eval(&self, pos: &Position) -> i32 {
        let acc = self.acc_stack.current();
        let piece_count = pos.occupied().count_ones();
        let raw = self.shared.nnue.evaluate(acc, pos.side_to_move(), piece_count);
        self.histories
            .correction
            .apply(pos.side_to_move(), raw, pos.pawn_hash(), pos.non_pawn_hash(pos.side_to_move()))
    }

    fn make(&mut self, pos: &mut Position, mv: Move) {
        let dirty = dirty_pieces_for(pos, mv);
        pos.make_move(mv);
        self.acc_stack.push(&self.shared.nnue, pos, &dirty);
        self.nodes += 1;
    }

    fn unmake(&mut self, pos: &mut Position, mv: Move) {
        pos.undo_move(mv);
        self.acc_stack.pop();
    }

    /// `(piece, to)` of the moves played 1/2/4/6 plies before `ply`, for
    /// continuation-history lookups; `None` where that ply doesn't exist
    /// (near the root) or no move was recorded there (just after a null
    /// move).
    fn cont_refs(&self, ply: usize) -> [ContRef; 4] {
        const DISTANCES: [usize; 4] = [1, 2, 4, 6];
        let mut refs = [None; 4];
        for (slot, &i) in refs.iter_mut().zip(DISTANCES.iter()) {
            if ply + 1 >= i {
                let s = &self.stacks[ply + 1 - i];
                if !s.move_played.is_null() {
                    *slot = Some((s.piece_moved, s.move_played.to()));
                }
            }
        }
        refs
    }

    /// Negamax with alpha-beta, PVS re-search, and the full pruning/
    /// extension gate sequence. `ply` is relative to this worker's current
    /// search root (not the game root), matching the spec's ply-relative
    /// mate scoring.
    fn negamax(&mut self, pos: &mut Position, mut alpha: i32, beta: i32, mut depth: i32, ply: usize, cut_node: bool) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.seldepth = self.seldepth.max(ply as i32);

        let is_pv = beta - alpha > 1;
        let in_check = pos.in_check();

        if depth <= 0 {
            return self.quiescence(pos, alpha, beta, ply);
        }

        if ply > 0 {
            if pos.is_draw(ply) || pos.upcoming_repetition() {
                return 0;
            }
            // Mate-distance pruning: no line beyond this ply can beat a
            // mate already found closer to the root.
            let mate_alpha = alpha.max(-VALUE_MATE + ply as i32);
            let mate_beta = beta.min(VALUE_MATE - ply as i32 - 1);
            if mate_alpha >= mate_beta {
                return mate_alpha;
            }
            alpha = mate_alpha;
        }

        let tt_probe = self.shared.tt.probe(pos.hash(), ply);
        if ply > 0 && !is_pv && tt_probe.found && tt_probe.depth as i32 >= depth {
            match tt_probe.bound {
                Bound::Exact => return tt_probe.score,
                Bound::Lower if tt_probe.score >= beta => return tt_probe.score,
                Bound::Upper if tt_probe.score <= alpha => return tt_probe.score,
                _ => {}
            }
        }

        if depth >= params::IIR_MIN_DEPTH && !tt_probe.found {
            depth -= 1;
        }

        let static_eval = if in_check { VALUE_NONE } else { self.static_eval(pos) };
        self.stacks[ply].static_eval = static_eval;
        self.stacks[ply].in_check = in_check;

        if !is_pv && !in_check && static_eval != VALUE_NONE {
            if depth <= params::RAZOR_MAX_DEPTH && static_eval + params::RAZOR_MARGIN < alpha {
                let q = self.quiescence(pos, alpha, alpha + 1, ply);
                if q <= alpha {
                    return q;
                }
            }

            if depth <= params::RFP_MAX_DEPTH && static_eval - params::RFP_MARGIN_PER_PLY * depth >= beta {
                return static_eval;
            }

            if depth >= params::NULL_MOVE_MIN_DEPTH
                && pos.has_non_pawn_material(pos.side_to_move())
                && static_eval >= beta
            {
                let reduction = params::NULL_MOVE_BASE_REDUCTION + depth / params::NULL_MOVE_DEPTH_DIVISOR;
                pos.make_null();
                self.acc_stack.push(&self.shared.nnue, pos, &[]);
                let score = -self.negamax(pos, -beta, -beta + 1, depth - reduction, ply + 1, !cut_node);
                self.acc_stack.pop();
                pos.undo_null();
                if score >= beta {
                    return beta;
                }
            }

            if depth >= params::PROBCUT_MIN_DEPTH && beta.abs() < VALUE_MATE_IN_MAX_PLY {
                if let Some(score) = self.probcut(pos, beta, depth, ply, cut_node, tt_probe.best_move, static_eval) {
                    return score;
                }
            }
        }

        let tt_move = tt_probe.best_move;
        let last_move = self.stacks[ply].move_played;
        let last_piece = self.stacks[ply].piece_moved;
        let counter = self.histories.counter_moves.get(last_move.from(), last_move.to());
        let cont_refs = self.cont_refs(ply);
        let mut picker = MovePicker::new(
            tt_move,
            self.histories.killers[ply][0],
            self.histories.killers[ply][1],
            counter,
            cont_refs,
        );

        let mut best_score = -VALUE_INFINITE;
        let mut best_move = Move::NULL;
        let mut bound = Bound::Upper;
        let mut move_count = 0usize;
        let mut quiets_tried: MoveList = MoveList::new();

        let mut noisy_tried: MoveList = MoveList::new();

        while let Some(mv) = picker.next(pos, self.histories) {
            if self.stacks[ply].excluded_move == mv {
                continue;
            }
            move_count += 1;

            let gives_check = pos.gives_check(mv);
            let is_quiet = !mv.is_capture() && !mv.is_promotion();

            if !is_pv
                && best_score > VALUE_MATED_IN_MAX_PLY
                && is_quiet
                && depth <= params::FUTILITY_MAX_DEPTH
                && !in_check
                && !gives_check
                && static_eval != VALUE_NONE
                && static_eval + params::FUTILITY_MARGIN_PER_PLY * depth <= alpha
            {
                continue;
            }

            let piece_moved = pos.piece_at(mv.from());
            let captured_type = pos.piece_at(mv.to()).piece_type();

            let mut extension = if gives_check && depth < 16 { 1 } else { 0 };

            // Singular extension (gate, moves-loop variant): the TT move is
            // probed with a narrow window excluding itself; failing low
            // there means no other move comes close, so this move is worth
            // searching deeper. A probe that beats beta is a multi-cut: the
            // position is cut regardless of which move is played.
            if ply > 0
                && mv == tt_move
                && self.stacks[ply].excluded_move.is_null()
                && depth >= params::SINGULAR_MIN_DEPTH
                && tt_probe.found
                && tt_probe.bound != Bound::Upper
                && tt_probe.depth as i32 >= depth - params::SINGULAR_TT_DEPTH_MARGIN
                && tt_probe.score.abs() < VALUE_MATE_IN_MAX_PLY
            {
                let singular_beta = tt_probe.score - params::SINGULAR_MARGIN_PER_DEPTH * depth;
                let singular_depth = (depth - 1) / 2;
                self.stacks[ply].excluded_move = mv;
                let s = self.negamax(pos, singular_beta - 1, singular_beta, singular_depth, ply, cut_node);
                self.stacks[ply].excluded_move = Move::NULL;

                if s < singular_beta {
                    extension = if !is_pv && s < singular_beta - params::SINGULAR_NON_PV_MARGIN {
                        if is_quiet { 3 } else { 2 }
                    } else {
                        1
                    };
                } else if singular_beta >= beta {
                    return singular_beta;
                } else if tt_probe.score >= beta {
                    extension = -2;
                } else if cut_node {
                    extension = -1;
                }
            }

            self.make(pos, mv);
            self.stacks[ply + 1].move_played = mv;
            self.stacks[ply + 1].piece_moved = piece_moved;

            let next_depth = depth - 1 + extension;

            let reduction = if is_quiet {
                params::lmr_reduction(depth, move_count).clamp(0, (next_depth - 1).max(0))
            } else {
                0
            };

            let score = if move_count == 1 {
                -self.negamax(pos, -beta, -alpha, next_depth, ply + 1, false)
            } else {
                let reduced_depth = (next_depth - reduction).max(1);
                let mut s = -self.negamax(pos, -alpha - 1, -alpha, reduced_depth, ply + 1, true);
                if s > alpha && reduction > 0 {
                    s = -self.negamax(pos, -alpha - 1, -alpha, next_depth, ply + 1, !cut_node);
                }
                if s > alpha && is_pv {
                    s = -self.negamax(pos, -beta, -alpha, next_depth, ply + 1, false);
                }
                s
            };

            self.unmake(pos, mv);

            if self.shared.stop.load(Ordering::Acquire) {
                return 0;
            }

            if is_quiet {
                if quiets_tried.len() < quiets_tried.capacity() {
                    quiets_tried.push(ScoredMove { mv, score: 0 });
                }
            } else if noisy_tried.len() < noisy_tried.capacity() {
                noisy_tried.push(ScoredMove { mv, score: 0 });
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if score > alpha {
                    alpha = score;
                    bound = Bound::Exact;
                    let child_pv: Vec<Move> = self.stacks[ply + 1].pv_slice().to_vec();
                    self.stacks[ply].update_pv(mv, &child_pv);
                    if score >= beta {
                        bound = Bound::Lower;
                        if is_quiet {
                            self.histories.store_killer(ply, mv);
                            self.histories.counter_moves.set(last_move.from(), last_move.to(), mv);
                            if depth > 3 || quiets_tried.len() > 1 {
                                self.histories.butterfly.update(pos.side_to_move(), mv, depth, true);
                                self.histories.pawn.update(pos.pawn_hash(), piece_moved, mv.to(), depth, true);
                                if !last_move.is_null() {
                                    self.histories.continuation.update(
                                        last_piece,
                                        last_move.to(),
                                        piece_moved,
                                        mv.to(),
                                        depth,
                                        true,
                                    );
                                }
                                for prior in &quiets_tried {
                                    if prior.mv == mv {
                                        continue;
                                    }
                                    let prior_piece = pos.piece_at(prior.mv.from());
                                    self.histories.butterfly.update(pos.side_to_move(), prior.mv, depth, false);
                                    self.histories.pawn.update(pos.pawn_hash(), prior_piece, prior.mv.to(), depth, false);
                                    if !last_move.is_null() {
                                        self.histories.continuation.update(
                                            last_piece,
                                            last_move.to(),
                                            prior_piece,
                                            prior.mv.to(),
                                            depth,
                                            false,
                                        );
                                    }
                                }
                            }
                        } else {
                            self.histories.capture.update(piece_moved, mv.to(), captured_type, depth, true);
                            for prior in &noisy_tried {
                                if prior.mv == mv {
                                    continue;
                                }
                                let prior_piece = pos.piece_at(prior.mv.from());
                                let prior_captured = pos.piece_at(prior.mv.to()).piece_type();
                                self.histories.capture.update(prior_piece, prior.mv.to(), prior_captured, depth, false);
                            }
                        }
                        break;
                    }
                }
            }
        }

        if move_count == 0 {
            return if in_check { -VALUE_MATE + ply as i32 } else { 0 };
        }

        if !in_check && !best_move.is_null() && static_eval != VALUE_NONE {
            let delta = best_score - static_eval;
            self.histories.correction.update(pos.side_to_move(), pos.pawn_hash(), pos.non_pawn_hash(pos.side_to_move()), delta);
        }

        self.shared.tt.store(pos.hash(), ply, depth as i16, best_score, static_eval, bound, best_move, is_pv);
        best_score
    }

    /// Gate 12: tries noisy moves whose SEE clears `beta + margin`; a
    /// reduced-depth verification search confirming the cut stores a LOWER
    /// bound and returns the score to the caller directly.
    fn probcut(
        &mut self,
        pos: &mut Position,
        beta: i32,
        depth: i32,
        ply: usize,
        cut_node: bool,
        tt_move: Move,
        static_eval: i32,
    ) -> Option<i32> {
        let probcut_beta = beta + params::PROBCUT_MARGIN;
        let mut picker = MovePicker::new_quiescence(tt_move);
        while let Some(mv) = picker.next(pos, self.histories) {
            if self.stacks[ply].excluded_move == mv || !pos.see(mv, probcut_beta - static_eval) {
                continue;
            }

            self.make(pos, mv);
            let mut score = -self.quiescence(pos, -probcut_beta, -probcut_beta + 1, ply + 1);
            if score >= probcut_beta {
                score = -self.negamax(
                    pos,
                    -probcut_beta,
                    -probcut_beta + 1,
                    depth - params::PROBCUT_DEPTH_REDUCTION,
                    ply + 1,
                    !cut_node,
                );
            }
            self.unmake(pos, mv);

            if self.shared.stop.load(Ordering::Acquire) {
                return Some(0);
            }

            if score >= probcut_beta {
                self.shared.tt.store(
                    pos.hash(),
                    ply,
                    (depth - params::PROBCUT_DEPTH_REDUCTION + 1) as i16,
                    score,
                    static_eval,
                    Bound::Lower,
                    mv,
                    false,
                );
                return Some(score);
            }
        }
        None
    }

    fn quiescence(&mut self, pos: &mut Position, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        if self.should_stop() {
            return 0;
        }
        let in_check = pos.in_check();
        let tt_probe = self.shared.tt.probe(pos.hash(), ply);
        if tt_probe.found {
            match tt_probe.bound {
                Bound::Exact => return tt_probe.score,
                Bound::Lower if tt_probe.score >= beta => return tt_probe.score,
                Bound::Upper if tt_probe.score <= alpha => return tt_probe.score,
                _ => {}
            }
        }

        let stand_pat = if in_check { -VALUE_MATE + ply as i32 } else { self.static_eval(pos) };
        if !in_check {
            if stand_pat >= beta {
                return stand_pat;
            }
            alpha = alpha.max(stand_pat);
        }

        let mut picker = MovePicker::new_quiescence(tt_probe.best_move);
        let mut best_score = if in_check { -VALUE_MATE + ply as i32 } else { stand_pat };
        let mut moves_seen = 0;

        while let Some(mv) = picker.next(pos, self.histories) {
            if !in_check && !pos.see(mv, 0) {
                continue;
            }
            moves_seen += 1;
            self.make(pos, mv);
            let score = -self.quiescence(pos, -beta, -alpha, ply + 1);
            self.unmake(pos, mv);

            if score > best_score {
                best_score = score;
                if score > alpha {
                    alpha = score;
                    if score >= beta {
                        break;
                    }
                }
            }
        }

        if in_check && moves_seen == 0 {
            return -VALUE_MATE + ply as i32;
        }
        best_score
    }
}
