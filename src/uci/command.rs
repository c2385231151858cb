//! UCI command tokenizing. Grounded on the teacher's `uci::command`
//! (`UciCommand` enum + `GoParams` + `parse_go_params`/`parse_uci_command`),
//! extended with the `bench` and `d` commands this spec adds.

#[derive(Debug, Clone)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(Vec<String>),
    Go(Vec<String>),
    Perft(u32),
    Bench,
    Display,
    SetOption(Vec<String>),
    Stop,
    PonderHit,
    Quit,
    Unknown(String),
}

#[derive(Default, Debug, Clone)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movetime: Option<u64>,
    pub movestogo: Option<u32>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub mate: Option<u32>,
    pub perft: Option<u32>,
    pub ponder: bool,
    pub infinite: bool,
}

#[inline]
fn parse_next<T: std::str::FromStr>(parts: &[&str], i: usize) -> Option<T> {
    parts.get(i + 1).and_then(|v| v.parse::<T>().ok())
}

#[must_use]
pub fn parse_go_params(parts: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < parts.len() {
        let consumed = match parts[i] {
            "wtime" => {
                params.wtime = parse_next(parts, i);
                2
            }
            "btime" => {
                params.btime = parse_next(parts, i);
                2
            }
            "winc" => {
                params.winc = parse_next(parts, i);
                2
            }
            "binc" => {
                params.binc = parse_next(parts, i);
                2
            }
            "movetime" => {
                params.movetime = parse_next(parts, i);
                2
            }
            "movestogo" => {
                params.movestogo = parse_next(parts, i);
                2
            }
            "nodes" => {
                params.nodes = parse_next(parts, i);
                2
            }
            "depth" => {
                params.depth = parse_next(parts, i);
                2
            }
            "mate" => {
                params.mate = parse_next(parts, i);
                2
            }
            "perft" => {
                params.perft = parse_next(parts, i);
                2
            }
            "ponder" => {
                params.ponder = true;
                1
            }
            "infinite" => {
                params.infinite = true;
                1
            }
            _ => 1,
        };
        i += consumed;
    }
    params
}

#[must_use]
pub fn parse_uci_command(line: &str) -> Option<UciCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.is_empty() {
        return None;
    }

    let owned_parts = || parts.iter().map(|p| (*p).to_string()).collect::<Vec<String>>();

    let cmd = match parts[0] {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => UciCommand::Position(owned_parts()),
        "go" => UciCommand::Go(owned_parts()),
        "perft" => {
            let depth = parts.get(1).and_then(|v| v.parse::<u32>().ok()).unwrap_or(1);
            UciCommand::Perft(depth)
        }
        "bench" => UciCommand::Bench,
        "d" => UciCommand::Display,
        "setoption" => UciCommand::SetOption(owned_parts()),
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(trimmed.to_string()),
    };

    Some(cmd)
}

/// Splits a `position ...` command's tail into an optional FEN and the
/// trailing `moves` list.
#[must_use]
pub fn parse_position_args(parts: &[String]) -> Option<(Option<String>, Vec<String>)> {
    if parts.len() < 2 {
        return None;
    }
    let mut idx = 1;
    let fen = match parts[idx].as_str() {
        "startpos" => {
            idx += 1;
            None
        }
        "fen" => {
            idx += 1;
            let end = parts[idx..]
                .iter()
                .position(|p| p == "moves")
                .map_or(parts.len(), |rel| idx + rel);
            if end <= idx {
                return None;
            }
            let fen = parts[idx..end].join(" ");
            idx = end;
            Some(fen)
        }
        _ => return None,
    };
    let moves = if parts.get(idx).map(String::as_str) == Some("moves") {
        parts[idx + 1..].to_vec()
    } else {
        Vec::new()
    };
    Some((fen, moves))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_with_time_controls() {
        let parts: Vec<&str> = "go wtime 1000 btime 2000 winc 5 binc 5".split_whitespace().collect();
        let params = parse_go_params(&parts);
        assert_eq!(params.wtime, Some(1000));
        assert_eq!(params.binc, Some(5));
    }

    #[test]
    fn position_fen_stops_at_moves() {
        let parts: Vec<String> = "position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 moves e2e4"
            .split_whitespace()
            .map(String::from)
            .collect();
        let (fen, moves) = parse_position_args(&parts).unwrap();
        assert_eq!(fen.unwrap(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(moves, vec!["e2e4".to_string()]);
    }
}
