//! C5: transposition table. Grounded on the teacher's root-level `tt.rs`
//! (`TranspositionTable` over `Vec<[Option<TTEntry>; 4]>`), generalized from
//! a 4-way replacement-by-depth bucket to the spec's bucket-of-3 with
//! age-aware replacement and 128-bit-multiply-high indexing (so table sizes
//! don't need to be a power of two) plus ply-relative mate-score encoding.

use parking_lot::Mutex;

use crate::types::Move;

pub const VALUE_NONE: i32 = i32::MIN;
const MATE_VALUE: i32 = 32000;
const MATE_IN_MAX_PLY: i32 = MATE_VALUE - 246;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    key16: u16,
    depth: i16,
    score: i32,
    eval: i32,
    bound: Bound,
    best_move: Move,
    age: u8,
    pv_node: bool,
}

impl Entry {
    const EMPTY: Entry = Entry {
        key16: 0,
        depth: -1,
        score: VALUE_NONE,
        eval: VALUE_NONE,
        bound: Bound::Exact,
        best_move: Move::NULL,
        age: 0,
        pv_node: false,
    };

    fn is_empty(&self) -> bool {
        self.depth < 0
    }
}

const BUCKET_SIZE: usize = 3;

#[derive(Clone, Copy)]
struct Bucket {
    entries: [Entry; BUCKET_SIZE],
}

impl Bucket {
    const EMPTY: Bucket = Bucket { entries: [Entry::EMPTY; BUCKET_SIZE] };
}

pub struct TranspositionTable {
    buckets: Mutex<Vec<Bucket>>,
    generation: std::sync::atomic::AtomicU8,
}

#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub found: bool,
    pub score: i32,
    pub eval: i32,
    pub depth: i16,
    pub bound: Bound,
    pub best_move: Move,
    pub pv_node: bool,
}

impl TranspositionTable {
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bucket_bytes = std::mem::size_of::<Bucket>();
        let bucket_count = ((size_mb * 1024 * 1024) / bucket_bytes).max(1);
        TranspositionTable {
            buckets: Mutex::new(vec![Bucket::EMPTY; bucket_count]),
            generation: std::sync::atomic::AtomicU8::new(0),
        }
    }

    pub fn resize(&self, size_mb: usize) {
        let bucket_bytes = std::mem::size_of::<Bucket>();
        let bucket_count = ((size_mb * 1024 * 1024) / bucket_bytes).max(1);
        *self.buckets.lock() = vec![Bucket::EMPTY; bucket_count];
    }

    pub fn new_search(&self) {
        self.generation.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn clear(&self) {
        let mut buckets = self.buckets.lock();
        for b in buckets.iter_mut() {
            *b = Bucket::EMPTY;
        }
        self.generation.store(0, std::sync::atomic::Ordering::Relaxed);
    }

    /// 128-bit-multiply-high index, avoiding the power-of-two size
    /// restriction a plain mask-based index would need.
    fn bucket_index(&self, hash: u64, bucket_count: usize) -> usize {
        (((hash as u128) * (bucket_count as u128)) >> 64) as usize
    }

    #[must_use]
    pub fn probe(&self, hash: u64, ply: usize) -> Probe {
        let buckets = self.buckets.lock();
        let idx = self.bucket_index(hash, buckets.len());
        let key16 = (hash & 0xffff) as u16;
        for entry in &buckets[idx].entries {
            if !entry.is_empty() && entry.key16 == key16 {
                return Probe {
                    found: true,
                    score: score_from_tt(entry.score, ply),
                    eval: entry.eval,
                    depth: entry.depth,
                    bound: entry.bound,
                    best_move: entry.best_move,
                    pv_node: entry.pv_node,
                };
            }
        }
        Probe {
            found: false,
            score: VALUE_NONE,
            eval: VALUE_NONE,
            depth: -1,
            bound: Bound::Exact,
            best_move: Move::NULL,
            pv_node: false,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &self,
        hash: u64,
        ply: usize,
        depth: i16,
        score: i32,
        eval: i32,
        bound: Bound,
        best_move: Move,
        pv_node: bool,
    ) {
        let mut buckets = self.buckets.lock();
        let bucket_count = buckets.len();
        let idx = self.bucket_index(hash, bucket_count);
        let key16 = (hash & 0xffff) as u16;
        let generation = self.generation.load(std::sync::atomic::Ordering::Relaxed);
        let bucket = &mut buckets[idx].entries;

        let mut replace_slot = 0usize;
        let mut replace_priority = i32::MAX;
        for (i, entry) in bucket.iter().enumerate() {
            if entry.is_empty() {
                replace_slot = i;
                break;
            }
            if entry.key16 == key16 {
                replace_slot = i;
                break;
            }
            // Lower priority replaces first: depth weighted against how
            // many generations stale the entry is.
            let age_penalty = generation.wrapping_sub(entry.age) as i32 * 4;
            let priority = entry.depth as i32 - age_penalty;
            if priority < replace_priority {
                replace_priority = priority;
                replace_slot = i;
            }
        }

        let existing = bucket[replace_slot];
        let keep_best_move = best_move.is_null() && existing.key16 == key16 && !existing.best_move.is_null();
        bucket[replace_slot] = Entry {
            key16,
            depth,
            score: score_to_tt(score, ply),
            eval,
            bound,
            best_move: if keep_best_move { existing.best_move } else { best_move },
            age: generation,
            pv_node,
        };
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let buckets = self.buckets.lock();
        let sample = buckets.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let mut filled = 0usize;
        for bucket in buckets.iter().take(sample) {
            for entry in &bucket.entries {
                if !entry.is_empty() {
                    filled += 1;
                }
            }
        }
        ((filled * 1000) / (sample * BUCKET_SIZE)) as u32
    }
}

/// Mate scores are stored root-relative (distance from the current search
/// root) but probed ply-relative, so a mate found deep in one branch isn't
/// misreported as a shorter or longer mate when reused from a different ply.
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score == VALUE_NONE {
        return score;
    }
    if score >= MATE_IN_MAX_PLY {
        score + ply as i32
    } else if score <= -MATE_IN_MAX_PLY {
        score - ply as i32
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score == VALUE_NONE {
        return score;
    }
    if score >= MATE_IN_MAX_PLY {
        score - ply as i32
    } else if score <= -MATE_IN_MAX_PLY {
        score + ply as i32
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MoveKind, Square};

    #[test]
    fn store_then_probe_round_trips_exact_entry() {
        let tt = TranspositionTable::new(1);
        let mv = Move::new(Square::A1, Square::H8, MoveKind::Quiet);
        tt.store(0xdead_beef, 0, 10, 55, 40, Bound::Exact, mv, true);
        let probe = tt.probe(0xdead_beef, 0);
        assert!(probe.found);
        assert_eq!(probe.score, 55);
        assert_eq!(probe.best_move, mv);
    }

    #[test]
    fn hashfull_starts_at_zero() {
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.hashfull_per_mille(), 0);
    }
}
