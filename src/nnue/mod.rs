//! C4: NNUE evaluation. Grounded on the teacher's `board/nnue/mod.rs` +
//! `network.rs` (768->256->1 accumulator/forward-pass shape), rescaled to
//! this spec's committed sizing (`FT_SIZE`/`L1_SIZE`/`L2_SIZE`/
//! `OUTPUT_BUCKETS`/`KING_BUCKETS`, see `network::layout`) and extended
//! with king-bucketed accumulator refresh the teacher's flat single-bucket
//! accumulator didn't need.

pub mod accumulator;
pub mod network;
mod simd;

pub use accumulator::Accumulator;
pub use network::NnueNetwork;
