//! C10: the top-level `Engine` that owns everything a UCI session needs
//! across its lifetime. Grounded on the teacher's `uci::orchestrator`
//! (construct once, mutate in place per command) but rebuilt around this
//! spec's runtime-loaded NNUE weights and always-on thread pool rather than
//! the teacher's process-global `search_control` statics.
//!
//! Construction order matters here: `attacks::init()` and `zobrist::init()`
//! must run before the first `Position` exists, since move generation and
//! hashing both read from those tables. `Engine::new` does this once, up
//! front, so every later call can assume the tables are live.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::UciError;
use crate::nnue::NnueNetwork;
use crate::position::Position;
use crate::threads::{SharedContext, ThreadPool};
use crate::timeman::TimeControl;
use crate::tt::TranspositionTable;
use crate::types::Move;

/// A single `go`'s outcome, handed back to the frontend to print as
/// `bestmove [ponder ...]`.
pub struct GoResult {
    pub best_move: Move,
    pub ponder_move: Option<Move>,
    pub nodes: u64,
    pub depth_completed: i32,
    pub seldepth: i32,
    pub score: i32,
    pub pv: Vec<Move>,
}

pub struct Engine {
    config: EngineConfig,
    pos: Position,
    tt: Arc<TranspositionTable>,
    nnue: Arc<NnueNetwork>,
    pool: ThreadPool,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        crate::attacks::init();
        crate::zobrist::init();

        let tt = Arc::new(TranspositionTable::new(config.hash_mb));
        let nnue = Arc::new(load_or_placeholder(config.eval_file.as_deref()));
        let shared = Arc::new(SharedContext::new(Arc::clone(&tt), Arc::clone(&nnue)));
        let pool = ThreadPool::new(shared, config.threads);

        Engine { config, pos: Position::startpos(), tt, nnue, pool }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// `position startpos [moves ...]` / `position fen <fen> [moves ...]`.
    pub fn set_position(&mut self, fen: Option<&str>, moves: &[String]) -> Result<(), UciError> {
        self.pos = match fen {
            Some(fen) => Position::from_fen(fen)?,
            None => Position::startpos(),
        };
        for move_str in moves {
            let mv = parse_uci_move(&self.pos, move_str)
                .ok_or_else(|| UciError::InvalidMove {
                    move_str: move_str.clone(),
                    error: crate::error::MoveParseError { reason: "not legal in this position".to_string() },
                })?;
            self.pos.make_move(mv);
        }
        Ok(())
    }

    pub fn ucinewgame(&mut self) {
        self.pool.stop();
        self.tt.clear();
        self.pos = Position::startpos();
    }

    pub fn stop(&self) {
        self.pool.stop();
    }

    /// Runs `go` to completion (blocking the calling thread; the frontend is
    /// expected to have already spawned this off the stdin-reading thread if
    /// it wants `stop` to interrupt it).
    #[must_use]
    pub fn go(&mut self, control: TimeControl) -> GoResult {
        let outcome = self.pool.search(&self.pos, &self.config, control);
        GoResult {
            best_move: outcome.best_move,
            ponder_move: outcome.ponder_move,
            nodes: outcome.total_nodes,
            depth_completed: outcome.depth_completed,
            seldepth: outcome.seldepth,
            score: outcome.score,
            pv: outcome.pv,
        }
    }

    #[must_use]
    pub fn hashfull(&self) -> u32 {
        self.tt.hashfull_per_mille()
    }

    #[must_use]
    pub fn perft(&mut self, depth: u32) -> u64 {
        crate::perft::perft(&mut self.pos, depth)
    }

    #[must_use]
    pub fn divide(&mut self, depth: u32) -> Vec<(Move, u64)> {
        crate::perft::divide(&mut self.pos, depth)
    }

    /// Pretty board dump for the `d` command: ranks 8 down to 1, FEN, and hash.
    #[must_use]
    pub fn pretty_print(&self) -> String {
        let mut out = String::new();
        for rank in (0..8u8).rev() {
            out.push_str("+---+---+---+---+---+---+---+---+\n");
            for file in 0..8u8 {
                let sq = crate::types::Square::from_file_rank(file, rank);
                let piece = self.pos.piece_at(sq);
                let c = if piece.is_none() { ' ' } else { piece.piece_type().char(piece.color()) };
                out.push_str(&format!("| {c} "));
            }
            out.push_str("|\n");
        }
        out.push_str("+---+---+---+---+---+---+---+---+\n");
        out.push_str(&format!("Fen: {}\n", self.pos.fen()));
        out.push_str(&format!("Key: {:016x}\n", self.pos.hash()));
        out
    }

    pub fn set_hash_mb(&mut self, hash_mb: usize) {
        self.config.hash_mb = hash_mb;
        self.tt.resize(hash_mb);
    }

    pub fn set_threads(&mut self, threads: usize) {
        self.config.threads = threads;
        self.pool.set_threads(threads);
    }

    pub fn set_multi_pv(&mut self, multi_pv: usize) {
        self.config.multi_pv = multi_pv.max(1);
    }

    pub fn set_move_overhead_ms(&mut self, ms: u64) {
        self.config.move_overhead_ms = ms;
    }

    pub fn set_syzygy_path(&mut self, path: PathBuf) {
        self.config.syzygy_path = Some(path);
    }

    /// Replaces the live NNUE weights. A bad file leaves the previously
    /// loaded network (or the zeroed placeholder) in place and reports the
    /// error to the caller instead of aborting the session.
    pub fn set_eval_file(&mut self, path: PathBuf) -> Result<(), crate::error::WeightLoadError> {
        let net = Arc::new(NnueNetwork::load(&path)?);
        self.config.eval_file = Some(path);
        self.nnue = net;
        self.rebuild_pool();
        Ok(())
    }

    fn rebuild_pool(&mut self) {
        let shared = Arc::new(SharedContext::new(Arc::clone(&self.tt), Arc::clone(&self.nnue)));
        self.pool = ThreadPool::new(shared, self.config.threads);
    }
}

/// No compiled-in default weight blob ships with this crate (§6): until
/// `EvalFile` is set, the engine runs on an all-zero network so every
/// command still has a response, evaluated as a dead-flat position rather
/// than refusing to search.
fn load_or_placeholder(eval_file: Option<&std::path::Path>) -> NnueNetwork {
    match eval_file {
        Some(path) => match NnueNetwork::load(path) {
            Ok(net) => net,
            Err(err) => {
                log::warn!("failed to load eval file {}: {err}; using placeholder weights", path.display());
                NnueNetwork::zeroed()
            }
        },
        None => NnueNetwork::zeroed(),
    }
}

fn parse_uci_move(pos: &Position, move_str: &str) -> Option<Move> {
    let bytes = move_str.as_bytes();
    if bytes.len() < 4 || bytes.len() > 5 {
        return None;
    }
    let from = crate::types::Square::from_str(&move_str[0..2])?;
    let to = crate::types::Square::from_str(&move_str[2..4])?;
    let promo = if bytes.len() == 5 {
        match bytes[4] {
            b'q' => Some(crate::types::PieceType::Queen),
            b'r' => Some(crate::types::PieceType::Rook),
            b'b' => Some(crate::types::PieceType::Bishop),
            b'n' => Some(crate::types::PieceType::Knight),
            _ => return None,
        }
    } else {
        None
    };

    let legals = crate::movegen::generate(pos, crate::movegen::GenType::Legals);
    legals
        .iter()
        .map(|scored| scored.mv)
        .find(|mv| mv.from() == from && mv.to() == to && mv.kind().promotion_piece() == promo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_perft_depth_1_is_20() {
        let mut engine = Engine::new(EngineConfig::default());
        assert_eq!(engine.perft(1), 20);
    }

    #[test]
    fn set_position_with_moves_advances_side_to_move() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.set_position(None, &["e2e4".to_string()]).unwrap();
        assert_eq!(engine.position().side_to_move(), crate::types::Color::Black);
    }

    #[test]
    fn unknown_move_is_rejected() {
        let mut engine = Engine::new(EngineConfig::default());
        assert!(engine.set_position(None, &["e2e5".to_string()]).is_err());
    }
}
