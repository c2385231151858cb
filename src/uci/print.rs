//! `info`/`bestmove` formatting. Grounded on the teacher's
//! `uci::print::print_time_info`/`print_perft_info`, generalized to the
//! spec's full `info` line (`depth`/`seldepth`/`multipv`/`score`/`nodes`/
//! `nps`/`hashfull`/`time`/`pv`) instead of the teacher's narrower subset.

use std::time::Duration;

use crate::search::{VALUE_MATE, VALUE_INFINITE};
use crate::types::Move;

#[allow(clippy::too_many_arguments)]
pub fn print_info(
    depth: i32,
    seldepth: i32,
    multipv: usize,
    score: i32,
    nodes: u64,
    elapsed: Duration,
    hashfull: u32,
    pv: &[Move],
) {
    let nps = if elapsed.as_millis() > 0 { (nodes as u128 * 1000 / elapsed.as_millis()) as u64 } else { 0 };
    let score_str = format_score(score);
    let pv_str = pv.iter().map(Move::to_uci).collect::<Vec<_>>().join(" ");
    println!(
        "info depth {depth} seldepth {seldepth} multipv {multipv} score {score_str} nodes {nodes} nps {nps} hashfull {hashfull} time {} pv {pv_str}",
        elapsed.as_millis()
    );
}

fn format_score(score: i32) -> String {
    if score >= VALUE_MATE - crate::types::MAX_PLY as i32 {
        let plies = VALUE_MATE - score;
        format!("mate {}", (plies + 1) / 2)
    } else if score <= -(VALUE_MATE - crate::types::MAX_PLY as i32) {
        let plies = VALUE_MATE + score;
        format!("mate -{}", (plies + 1) / 2)
    } else if score.abs() >= VALUE_INFINITE {
        "cp 0".to_string()
    } else {
        format!("cp {score}")
    }
}

pub fn print_bestmove(best: Move, ponder: Option<Move>) {
    match ponder {
        Some(p) if !p.is_null() => println!("bestmove {} ponder {}", best.to_uci(), p.to_uci()),
        _ => println!("bestmove {}", best.to_uci()),
    }
}

pub fn print_perft_info(depth: u32, nodes: u64, elapsed: Duration) {
    let nps = if elapsed.as_millis() > 0 { (nodes as u128 * 1000 / elapsed.as_millis()) as u64 } else { 0 };
    println!("perft {depth}: {nodes} nodes, {} ms, {nps} nps", elapsed.as_millis());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_in_one_formats_as_mate_1() {
        assert_eq!(format_score(VALUE_MATE - 1), "mate 1");
    }

    #[test]
    fn ordinary_score_formats_as_centipawns() {
        assert_eq!(format_score(37), "cp 37");
    }
}
