//! NNUE weight layout and forward pass. The blob is read, not embedded
//! (`EvalFile` points at it at runtime); a length mismatch against the
//! computed layout size is a `WeightLoadError`, never a panic, since a
//! missing/incompatible net is an expected operator mistake, not an
//! internal invariant violation.

use std::path::Path;

use crate::error::WeightLoadError;
use crate::types::{Color, Piece, PieceType, Square};

pub const FEATURE_PLANES: usize = 768; // 12 pieces * 64 squares
pub const KING_BUCKETS: usize = 10;
pub const INPUT_SIZE: usize = KING_BUCKETS * FEATURE_PLANES; // 7680
pub const FT_SIZE: usize = 1536;
pub const L1_SIZE: usize = 16;
pub const L2_SIZE: usize = 32;
pub const OUTPUT_BUCKETS: usize = 8;

pub const FT_QUANT: i32 = 255;
pub const L1_QUANT: i32 = 64;
pub const FT_SHIFT: u32 = 8;
pub const EVAL_SCALE: i32 = 400;

/// King-bucket map: which of the 10 buckets a king on `sq` falls into,
/// mirrored for the two perspectives via `Square::flip_file`/`flip_rank`
/// the way `accumulator.rs` uses them.
const KING_BUCKET_MAP: [usize; 64] = [
    0, 0, 1, 1, 1, 1, 0, 0,
    2, 2, 3, 3, 3, 3, 2, 2,
    4, 4, 4, 4, 4, 4, 4, 4,
    5, 5, 5, 5, 5, 5, 5, 5,
    6, 6, 6, 6, 6, 6, 6, 6,
    7, 7, 7, 7, 7, 7, 7, 7,
    8, 8, 8, 8, 8, 8, 8, 8,
    9, 9, 9, 9, 9, 9, 9, 9,
];

#[must_use]
pub fn king_bucket(king_sq: Square) -> usize {
    KING_BUCKET_MAP[king_sq.index()]
}

/// Feature index for `piece` on `sq`, seen from `perspective`'s point of
/// view with `king_sq` (also `perspective`-relative) selecting the bucket.
#[must_use]
pub fn feature_index(piece: Piece, sq: Square, perspective: Color, king_sq: Square) -> usize {
    let (sq, king_sq) = if perspective == Color::Black {
        (sq.flip_rank(), king_sq.flip_rank())
    } else {
        (sq, king_sq)
    };
    let piece_color_relative = if piece.color() == perspective { 0 } else { 1 };
    let plane = piece.piece_type().index() + 6 * piece_color_relative;
    let bucket = king_bucket(king_sq);
    bucket * FEATURE_PLANES + plane * 64 + sq.index()
}

struct Layout {
    feature_weights: usize,
    feature_bias: usize,
    l1_weights: usize,
    l1_bias: usize,
    l2_weights: usize,
    l2_bias: usize,
    l3_weights: usize,
    l3_bias: usize,
}

const LAYOUT: Layout = Layout {
    feature_weights: INPUT_SIZE * FT_SIZE * 2, // i16
    feature_bias: FT_SIZE * 2,                 // i16
    l1_weights: OUTPUT_BUCKETS * L1_SIZE * FT_SIZE, // i8
    l1_bias: OUTPUT_BUCKETS * L1_SIZE * 4,     // i32
    l2_weights: OUTPUT_BUCKETS * L2_SIZE * L1_SIZE * 4, // f32
    l2_bias: OUTPUT_BUCKETS * L2_SIZE * 4,     // f32
    l3_weights: OUTPUT_BUCKETS * L2_SIZE * 4,  // f32
    l3_bias: OUTPUT_BUCKETS * 4,               // f32
};

fn total_bytes() -> usize {
    LAYOUT.feature_weights
        + LAYOUT.feature_bias
        + LAYOUT.l1_weights
        + LAYOUT.l1_bias
        + LAYOUT.l2_weights
        + LAYOUT.l2_bias
        + LAYOUT.l3_weights
        + LAYOUT.l3_bias
}

pub struct NnueNetwork {
    pub(crate) feature_weights: Box<[[i16; FT_SIZE]; INPUT_SIZE]>,
    pub(crate) feature_bias: Box<[i16; FT_SIZE]>,
    l1_weights: Box<[[i8; FT_SIZE]; OUTPUT_BUCKETS * L1_SIZE]>,
    l1_bias: Box<[i32; OUTPUT_BUCKETS * L1_SIZE]>,
    l2_weights: Box<[[f32; L1_SIZE]; OUTPUT_BUCKETS * L2_SIZE]>,
    l2_bias: Box<[f32; OUTPUT_BUCKETS * L2_SIZE]>,
    l3_weights: Box<[[f32; L2_SIZE]; OUTPUT_BUCKETS]>,
    l3_bias: Box<[f32; OUTPUT_BUCKETS]>,
}

fn read_i16_slice(bytes: &[u8], offset: &mut usize, count: usize) -> Vec<i16> {
    let out = bytes[*offset..*offset + count * 2]
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect();
    *offset += count * 2;
    out
}

fn read_i8_slice(bytes: &[u8], offset: &mut usize, count: usize) -> Vec<i8> {
    let out = bytes[*offset..*offset + count].iter().map(|&b| b as i8).collect();
    *offset += count;
    out
}

fn read_i32_slice(bytes: &[u8], offset: &mut usize, count: usize) -> Vec<i32> {
    let out = bytes[*offset..*offset + count * 4]
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    *offset += count * 4;
    out
}

fn read_f32_slice(bytes: &[u8], offset: &mut usize, count: usize) -> Vec<f32> {
    let out = bytes[*offset..*offset + count * 4]
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    *offset += count * 4;
    out
}

impl NnueNetwork {
    /// All-zero weights, used until an `EvalFile` is configured so the
    /// engine can answer `go`/`perft` before a real net is loaded (the
    /// evaluation is meaningless, but every shape and quantization step
    /// still runs).
    #[must_use]
    pub fn zeroed() -> Self {
        Self::from_bytes(&vec![0u8; total_bytes()]).unwrap_or_else(|_| unreachable!())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WeightLoadError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| WeightLoadError {
            reason: format!("could not read {}: {e}", path.as_ref().display()),
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WeightLoadError> {
        let expected = total_bytes();
        if bytes.len() != expected {
            return Err(WeightLoadError {
                reason: format!("expected {expected} bytes, got {}", bytes.len()),
            });
        }

        let mut offset = 0usize;
        let fw_flat = read_i16_slice(bytes, &mut offset, INPUT_SIZE * FT_SIZE);
        let fb_flat = read_i16_slice(bytes, &mut offset, FT_SIZE);
        let l1w_flat = read_i8_slice(bytes, &mut offset, OUTPUT_BUCKETS * L1_SIZE * FT_SIZE);
        let l1b_flat = read_i32_slice(bytes, &mut offset, OUTPUT_BUCKETS * L1_SIZE);
        let l2w_flat = read_f32_slice(bytes, &mut offset, OUTPUT_BUCKETS * L2_SIZE * L1_SIZE);
        let l2b_flat = read_f32_slice(bytes, &mut offset, OUTPUT_BUCKETS * L2_SIZE);
        let l3w_flat = read_f32_slice(bytes, &mut offset, OUTPUT_BUCKETS * L2_SIZE);
        let l3b_flat = read_f32_slice(bytes, &mut offset, OUTPUT_BUCKETS);
        debug_assert_eq!(offset, expected);

        let mut feature_weights: Box<[[i16; FT_SIZE]; INPUT_SIZE]> =
            vec![[0i16; FT_SIZE]; INPUT_SIZE].try_into().unwrap_or_else(|_| unreachable!());
        for (row, chunk) in feature_weights.iter_mut().zip(fw_flat.chunks_exact(FT_SIZE)) {
            row.copy_from_slice(chunk);
        }

        let mut feature_bias: Box<[i16; FT_SIZE]> = vec![0i16; FT_SIZE].try_into().unwrap_or_else(|_| unreachable!());
        feature_bias.copy_from_slice(&fb_flat);

        let mut l1_weights: Box<[[i8; FT_SIZE]; OUTPUT_BUCKETS * L1_SIZE]> =
            vec![[0i8; FT_SIZE]; OUTPUT_BUCKETS * L1_SIZE].try_into().unwrap_or_else(|_| unreachable!());
        for (row, chunk) in l1_weights.iter_mut().zip(l1w_flat.chunks_exact(FT_SIZE)) {
            row.copy_from_slice(chunk);
        }

        let mut l1_bias: Box<[i32; OUTPUT_BUCKETS * L1_SIZE]> =
            vec![0i32; OUTPUT_BUCKETS * L1_SIZE].try_into().unwrap_or_else(|_| unreachable!());
        l1_bias.copy_from_slice(&l1b_flat);

        let mut l2_weights: Box<[[f32; L1_SIZE]; OUTPUT_BUCKETS * L2_SIZE]> =
            vec![[0f32; L1_SIZE]; OUTPUT_BUCKETS * L2_SIZE].try_into().unwrap_or_else(|_| unreachable!());
        for (row, chunk) in l2_weights.iter_mut().zip(l2w_flat.chunks_exact(L1_SIZE)) {
            row.copy_from_slice(chunk);
        }

        let mut l2_bias: Box<[f32; OUTPUT_BUCKETS * L2_SIZE]> =
            vec![0f32; OUTPUT_BUCKETS * L2_SIZE].try_into().unwrap_or_else(|_| unreachable!());
        l2_bias.copy_from_slice(&l2b_flat);

        let mut l3_weights: Box<[[f32; L2_SIZE]; OUTPUT_BUCKETS]> =
            vec![[0f32; L2_SIZE]; OUTPUT_BUCKETS].try_into().unwrap_or_else(|_| unreachable!());
        for (row, chunk) in l3_weights.iter_mut().zip(l3w_flat.chunks_exact(L2_SIZE)) {
            row.copy_from_slice(chunk);
        }

        let mut l3_bias: Box<[f32; OUTPUT_BUCKETS]> = vec![0f32; OUTPUT_BUCKETS].try_into().unwrap_or_else(|_| unreachable!());
        l3_bias.copy_from_slice(&l3b_flat);

        Ok(NnueNetwork {
            feature_weights,
            feature_bias,
            l1_weights,
            l1_bias,
            l2_weights,
            l2_bias,
            l3_weights,
            l3_bias,
        })
    }

    /// `piece_count` selects the output bucket (more pieces on the board ->
    /// lower bucket index, mirroring the teacher's phase-scaled eval but
    /// replacing its hand-written phase weights with a learned bucket).
    #[must_use]
    pub fn evaluate(&self, acc: &super::Accumulator, side_to_move: Color, piece_count: u32) -> i32 {
        let bucket = output_bucket(piece_count);
        let l1_input = super::simd::pairwise_mult_concat(&acc.white, &acc.black, side_to_move, FT_QUANT as i16);

        let mut l1_out = [0i32; L1_SIZE];
        for (i, out) in l1_out.iter_mut().enumerate() {
            let row = &self.l1_weights[bucket * L1_SIZE + i];
            *out = super::simd::dot_i8(&l1_input, row) + self.l1_bias[bucket * L1_SIZE + i];
        }

        let mut l2_input = [0f32; L1_SIZE];
        for (i, v) in l1_out.iter().enumerate() {
            l2_input[i] = relu((*v >> FT_SHIFT) as f32 / L1_QUANT as f32);
        }

        let mut l2_out = [0f32; L2_SIZE];
        for (i, out) in l2_out.iter_mut().enumerate() {
            let row = &self.l2_weights[bucket * L2_SIZE + i];
            let mut sum = self.l2_bias[bucket * L2_SIZE + i];
            for (w, x) in row.iter().zip(l2_input.iter()) {
                sum += w * x;
            }
            *out = relu(sum);
        }

        let row = &self.l3_weights[bucket];
        let mut output = self.l3_bias[bucket];
        for (w, x) in row.iter().zip(l2_out.iter()) {
            output += w * x;
        }

        (output * EVAL_SCALE as f32) as i32
    }
}

fn relu(x: f32) -> f32 {
    x.max(0.0)
}

fn output_bucket(piece_count: u32) -> usize {
    let bucket = ((32 - piece_count.min(32)) as usize * OUTPUT_BUCKETS) / 33;
    bucket.min(OUTPUT_BUCKETS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_blob() -> Vec<u8> {
        vec![0u8; total_bytes()]
    }

    #[test]
    fn zeroed_blob_loads_without_error() {
        let blob = synthetic_blob();
        let net = NnueNetwork::from_bytes(&blob);
        assert!(net.is_ok());
    }

    #[test]
    fn wrong_length_blob_is_rejected() {
        let mut blob = synthetic_blob();
        blob.pop();
        assert!(NnueNetwork::from_bytes(&blob).is_err());
    }

    #[test]
    fn feature_index_stays_in_bounds() {
        for piece_idx in 0..12u8 {
            let piece = Piece::new(PieceType::from_index((piece_idx % 6) as usize), Color::White);
            for sq in 0..64u8 {
                let idx = feature_index(piece, Square(sq), Color::White, Square::A1);
                assert!(idx < INPUT_SIZE);
            }
        }
    }
}
