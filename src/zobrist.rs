//! Zobrist hashing (C1) and the cuckoo repetition table (C2).
//!
//! Keys are generated once from a fixed-seed PRNG so every run of the engine
//! (and every test) sees the same hash values; nothing here depends on
//! process-specific randomness.

use std::sync::OnceLock;

use crate::types::{Color, Piece, PieceType, Square};

struct Keys {
    /// `psq[piece.index()][square.index()]`
    psq: [[u64; 64]; 12],
    castling: [u64; 16],
    en_passant: [u64; 8],
    side: u64,
}

struct SplitMix64(u64);

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

fn build_keys() -> Keys {
    let mut rng = SplitMix64(0x5131_3F82_FC15_A8E1);
    let mut psq = [[0u64; 64]; 12];
    for piece_row in &mut psq {
        for slot in piece_row.iter_mut() {
            *slot = rng.next();
        }
    }
    let mut castling = [0u64; 16];
    for slot in castling.iter_mut() {
        *slot = rng.next();
    }
    let mut en_passant = [0u64; 8];
    for slot in en_passant.iter_mut() {
        *slot = rng.next();
    }
    let side = rng.next();
    Keys { psq, castling, en_passant, side }
}

static KEYS: OnceLock<Keys> = OnceLock::new();

pub fn init() {
    KEYS.get_or_init(build_keys);
}

fn keys() -> &'static Keys {
    KEYS.get().expect("zobrist::init() must run before hashing")
}

#[must_use]
pub fn piece_key(piece: Piece, sq: Square) -> u64 {
    keys().psq[piece.index()][sq.index()]
}

#[must_use]
pub fn castling_key(rights: u8) -> u64 {
    keys().castling[(rights & 0xf) as usize]
}

#[must_use]
pub fn en_passant_key(file: u8) -> u64 {
    keys().en_passant[(file & 7) as usize]
}

#[must_use]
pub fn side_key() -> u64 {
    keys().side
}

/// `pawn_key`/`non_pawn_key` let the NNUE refresh table and correction
/// histories track pawn structure and non-pawn material independently of
/// the full position hash; both are plain sums of the same `psq` table
/// restricted to a piece-type subset, so no separate key table is needed.
#[must_use]
pub fn is_pawn(piece: Piece) -> bool {
    !piece.is_none() && piece.piece_type() == PieceType::Pawn
}

const CUCKOO_SIZE: usize = 8192;

/// Reversible non-pawn, non-castling, non-capture moves used for the
/// upcoming-repetition oracle, keyed by `hash_1`/`hash_2`.
struct CuckooTable {
    keys: [u64; CUCKOO_SIZE],
    moves: [Option<(Square, Square, Piece)>; CUCKOO_SIZE],
}

fn h1(key: u64) -> usize {
    (key & (CUCKOO_SIZE as u64 - 1)) as usize
}

fn h2(key: u64) -> usize {
    ((key >> 16) & (CUCKOO_SIZE as u64 - 1)) as usize
}

fn build_cuckoo() -> CuckooTable {
    let mut table = CuckooTable {
        keys: [0u64; CUCKOO_SIZE],
        moves: [None; CUCKOO_SIZE],
    };
    let mut count = 0usize;
    for color_idx in 0..2 {
        let color = if color_idx == 0 { Color::White } else { Color::Black };
        for &pt in &[
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
        ] {
            let piece = Piece::new(pt, color);
            for s1 in 0u8..64 {
                for s2 in (s1 + 1)..64 {
                    let from = Square(s1);
                    let to = Square(s2);
                    let attacks = match pt {
                        PieceType::Knight => crate::attacks::knight_attacks(from),
                        PieceType::King => crate::attacks::king_attacks(from),
                        PieceType::Bishop => crate::attacks::bishop_attacks(from, 0),
                        PieceType::Rook => crate::attacks::rook_attacks(from, 0),
                        PieceType::Queen => crate::attacks::queen_attacks(from, 0),
                        PieceType::Pawn => 0,
                    };
                    if attacks & to.bitboard() == 0 {
                        continue;
                    }
                    let mut key = piece_key(piece, from) ^ piece_key(piece, to) ^ side_key();
                    let mut mv = Some((from, to, piece));
                    let mut i = h1(key);
                    loop {
                        std::mem::swap(&mut table.keys[i], &mut key);
                        std::mem::swap(&mut table.moves[i], &mut mv);
                        if key == 0 {
                            count += 1;
                            break;
                        }
                        i = if i == h1(key) { h2(key) } else { h1(key) };
                    }
                }
            }
        }
    }
    // Self-check, per the design notes: this count is a property of the
    // construction (how many reversible slider/leaper move pairs exist on
    // an empty board), not a constant to be hard-coded or asserted exactly
    // equal to any single number across engine variants. We only log it.
    log::debug!("cuckoo table populated with {count} reversible moves");
    table
}

static CUCKOO: OnceLock<CuckooTable> = OnceLock::new();

fn cuckoo() -> &'static CuckooTable {
    CUCKOO.get_or_init(build_cuckoo)
}

/// True if some legal reversible move reaches a position with hash `key`,
/// i.e. `key` could plausibly recur via a single reversible move from the
/// current position. Callers additionally verify the move is pseudo-legal
/// and non-capturing in the current position before trusting the result.
#[must_use]
pub fn cuckoo_lookup(key: u64) -> Option<(Square, Square, Piece)> {
    let table = cuckoo();
    let i1 = h1(key);
    if table.keys[i1] == key {
        return table.moves[i1];
    }
    let i2 = h2(key);
    if table.keys[i2] == key {
        return table.moves[i2];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psq_keys_are_distinct() {
        init();
        let a = piece_key(Piece::new(PieceType::Pawn, Color::White), Square::A1);
        let b = piece_key(Piece::new(PieceType::Pawn, Color::White), Square(1));
        let c = piece_key(Piece::new(PieceType::Knight, Color::White), Square::A1);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn castling_keys_cover_all_16_combinations() {
        init();
        let mut seen = std::collections::HashSet::new();
        for rights in 0u8..16 {
            seen.insert(castling_key(rights));
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn cuckoo_table_finds_a_known_reversible_knight_hop() {
        init();
        crate::attacks::init();
        let piece = Piece::new(PieceType::Knight, Color::White);
        let key = piece_key(piece, Square::A1) ^ piece_key(piece, Square(17)) ^ side_key();
        assert!(cuckoo_lookup(key).is_some());
    }
}
