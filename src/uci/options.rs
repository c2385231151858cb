//! Standard UCI options. Grounded on the teacher's `uci::options::UciOptions`
//! (`print`/`apply_setoption`/`parse_setoption` split), trimmed to this
//! spec's option set (`Hash`, `Threads`, `MultiPV`, `MoveOverhead`,
//! `SyzygyPath`, `EvalFile`) and re-targeted at `Engine`'s setters instead of
//! the teacher's `SearchState`/`SearchParams` fields.

use crate::engine::Engine;

fn print_spin(name: &str, default: i64, min: i64, max: i64) {
    println!("option name {name} type spin default {default} min {min} max {max}");
}

fn print_string(name: &str, default: &str) {
    println!("option name {name} type string default {default}");
}

/// Prints every `option name ...` line, then `uciok`, the way the teacher's
/// `UciOptions::print` does before the id/author banner's closing line.
pub fn print_options() {
    println!("id name ventoux");
    println!("id author the ventoux contributors");
    print_spin("Hash", 16, 1, 1_048_576);
    print_spin("Threads", 1, 1, 512);
    print_spin("MultiPV", 1, 1, 256);
    print_spin("MoveOverhead", 10, 0, 5000);
    print_string("SyzygyPath", "<empty>");
    print_string("EvalFile", "<empty>");
    println!("uciok");
}

/// Splits a `setoption name <N> value <V>` command's tail into `(name,
/// value)`, the way the teacher's `parse_setoption` does.
#[must_use]
pub fn parse_setoption(parts: &[String]) -> Option<(String, Option<String>)> {
    let name_idx = parts.iter().position(|p| p == "name")?;
    let value_idx = parts.iter().position(|p| p == "value");
    let name_end = value_idx.unwrap_or(parts.len());
    if name_end <= name_idx + 1 {
        return None;
    }
    let name = parts[name_idx + 1..name_end].join(" ");
    let value = value_idx.map(|vi| parts[vi + 1..].join(" "));
    Some((name, value))
}

/// Applies a parsed `(name, value)` pair to the engine. Unknown option names
/// and malformed values are logged and otherwise ignored, matching the
/// teacher's "setoption never aborts the session" behavior.
pub fn apply_setoption(engine: &mut Engine, name: &str, value: Option<&str>) {
    match name.to_lowercase().as_str() {
        "hash" => {
            if let Some(mb) = value.and_then(|v| v.parse::<usize>().ok()) {
                engine.set_hash_mb(mb);
            }
        }
        "threads" => {
            if let Some(n) = value.and_then(|v| v.parse::<usize>().ok()) {
                engine.set_threads(n);
            }
        }
        "multipv" => {
            if let Some(n) = value.and_then(|v| v.parse::<usize>().ok()) {
                engine.set_multi_pv(n);
            }
        }
        "moveoverhead" => {
            if let Some(ms) = value.and_then(|v| v.parse::<u64>().ok()) {
                engine.set_move_overhead_ms(ms);
            }
        }
        "syzygypath" => {
            if let Some(path) = value {
                engine.set_syzygy_path(std::path::PathBuf::from(path));
            }
        }
        "evalfile" => {
            if let Some(path) = value {
                if let Err(err) = engine.set_eval_file(std::path::PathBuf::from(path)) {
                    log::warn!("setoption EvalFile failed: {err}");
                }
            }
        }
        other => log::debug!("ignoring unknown option '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_value() {
        let parts: Vec<String> = "setoption name Hash value 64".split_whitespace().map(String::from).collect();
        let (name, value) = parse_setoption(&parts).unwrap();
        assert_eq!(name, "Hash");
        assert_eq!(value.as_deref(), Some("64"));
    }

    #[test]
    fn parses_name_with_no_value() {
        let parts: Vec<String> = "setoption name Ponder".split_whitespace().map(String::from).collect();
        let (name, value) = parse_setoption(&parts).unwrap();
        assert_eq!(name, "Ponder");
        assert!(value.is_none());
    }
}
