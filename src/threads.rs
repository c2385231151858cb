//! C9: lazy-SMP worker pool. Workers share the transposition table and the
//! read-only NNUE weights but keep independent history tables, accumulator
//! stacks, and a private `Position` clone; grounded on the teacher's
//! multi-threaded search wiring (`SearchConfig`/`SearchInfoCallback`) but
//! generalized from the teacher's single-search-call structure to the
//! spec's always-on thread pool with atomic stop and best-worker voting.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::history::Histories;
use crate::nnue::NnueNetwork;
use crate::position::Position;
use crate::search::{self, RootMove, SearchReport};
use crate::tablebase::{NullOracle, TablebaseOracle};
use crate::timeman::{TimeControl, TimeManager};
use crate::tt::TranspositionTable;

pub struct SharedContext {
    pub tt: Arc<TranspositionTable>,
    pub nnue: Arc<NnueNetwork>,
    pub tablebase: Arc<dyn TablebaseOracle>,
    pub stop: Arc<AtomicBool>,
    pub global_nodes: Arc<AtomicU64>,
}

impl SharedContext {
    #[must_use]
    pub fn new(tt: Arc<TranspositionTable>, nnue: Arc<NnueNetwork>) -> Self {
        SharedContext {
            tt,
            nnue,
            tablebase: Arc::new(NullOracle),
            stop: Arc::new(AtomicBool::new(false)),
            global_nodes: Arc::new(AtomicU64::new(0)),
        }
    }
}

pub struct SearchOutcome {
    pub best_move: crate::types::Move,
    pub ponder_move: Option<crate::types::Move>,
    pub total_nodes: u64,
    pub depth_completed: i32,
    pub seldepth: i32,
    pub score: i32,
    pub pv: Vec<crate::types::Move>,
}

pub struct ThreadPool {
    num_threads: usize,
    shared: Arc<SharedContext>,
}

impl ThreadPool {
    #[must_use]
    pub fn new(shared: Arc<SharedContext>, num_threads: usize) -> Self {
        ThreadPool { num_threads: num_threads.max(1), shared }
    }

    pub fn set_threads(&mut self, num_threads: usize) {
        self.num_threads = num_threads.max(1);
    }

    pub fn stop(&self) {
        self.shared.stop.store(true, Ordering::Release);
    }

    /// Runs `num_threads` lazy-SMP workers to completion (driven by
    /// `limits`/`config`'s deadlines or an explicit `stop()` call from
    /// another thread handling `stop`/`ponderhit`), then votes on a best
    /// move across workers.
    pub fn search(&self, pos: &Position, config: &EngineConfig, control: TimeControl) -> SearchOutcome {
        self.shared.stop.store(false, Ordering::Release);
        self.shared.global_nodes.store(0, Ordering::Relaxed);
        self.shared.tt.new_search();

        let time_manager = Arc::new(TimeManager::new(control, config));

        let reports: Vec<SearchReport> = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.num_threads);
            for worker_id in 0..self.num_threads {
                let shared = Arc::clone(&self.shared);
                let time_manager = Arc::clone(&time_manager);
                let mut worker_pos = pos.clone();
                let is_main = worker_id == 0;
                handles.push(scope.spawn(move || {
                    let mut histories = Histories::new();
                    search::run_iterative_deepening(
                        &mut worker_pos,
                        &mut histories,
                        &shared,
                        &time_manager,
                        is_main,
                    )
                }));
            }
            handles.into_iter().map(|h| h.join().expect("worker thread panicked")).collect()
        });

        let total_nodes = self.shared.global_nodes.load(Ordering::Relaxed);
        let best_report = best_report(&reports);
        let winner = vote_best(&reports);
        SearchOutcome {
            best_move: winner.best_move,
            ponder_move: winner.ponder_move,
            total_nodes,
            depth_completed: best_report.depth_completed,
            seldepth: best_report.seldepth,
            score: best_report.score,
            pv: best_report.pv.clone(),
        }
    }
}

/// The report reached at the greatest depth (ties broken by score), used for
/// the `info`/depth/seldepth/pv fields regardless of which worker's root
/// move wins the majority vote.
fn best_report(reports: &[SearchReport]) -> &SearchReport {
    reports
        .iter()
        .max_by(|a, b| {
            a.depth_completed
                .cmp(&b.depth_completed)
                .then(a.score.cmp(&b.score))
        })
        .expect("at least one worker always runs")
}

/// Lazy-SMP voting: prefer the result reached at the greatest depth; break
/// ties by how many workers agree on the root move, then by score.
fn vote_best(reports: &[SearchReport]) -> RootMove {
    let mut best: Option<&SearchReport> = None;
    for report in reports {
        best = match best {
            None => Some(report),
            Some(current) => {
                if report.depth_completed > current.depth_completed
                    || (report.depth_completed == current.depth_completed && report.score > current.score)
                {
                    Some(report)
                } else {
                    Some(current)
                }
            }
        };
    }
    let winner = best.expect("at least one worker always runs");

    let mut vote_counts: std::collections::HashMap<crate::types::Move, u32> = std::collections::HashMap::new();
    for report in reports {
        *vote_counts.entry(report.best_move).or_insert(0) += 1;
    }
    let most_voted = vote_counts
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(mv, _)| *mv)
        .unwrap_or(winner.best_move);

    RootMove {
        best_move: if vote_counts.get(&most_voted).copied().unwrap_or(0) > reports.len() as u32 / 2 {
            most_voted
        } else {
            winner.best_move
        },
        ponder_move: winner.ponder_move,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_runs_a_shallow_search_from_startpos() {
        crate::attacks::init();
        crate::zobrist::init();
        let tt = Arc::new(TranspositionTable::new(1));
        let net = Arc::new(crate::nnue::NnueNetwork::from_bytes(&vec![0u8; synthetic_len()]).unwrap());
        let shared = Arc::new(SharedContext::new(tt, net));
        let pool = ThreadPool::new(shared, 1);
        let pos = Position::startpos();
        let config = EngineConfig::default();
        let outcome = pool.search(&pos, &config, TimeControl::Depth(2));
        assert!(!outcome.best_move.is_null());
    }

    fn synthetic_len() -> usize {
        use crate::nnue::network::*;
        INPUT_SIZE * FT_SIZE * 2
            + FT_SIZE * 2
            + OUTPUT_BUCKETS * L1_SIZE * FT_SIZE
            + OUTPUT_BUCKETS * L1_SIZE * 4
            + OUTPUT_BUCKETS * L2_SIZE * L1_SIZE * 4
            + OUTPUT_BUCKETS * L2_SIZE * 4
            + OUTPUT_BUCKETS * L2_SIZE * 4
            + OUTPUT_BUCKETS * 4
    }
}
