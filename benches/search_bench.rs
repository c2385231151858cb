//! Search and move-generation throughput, grounded on the teacher's
//! `benches/engine_benchmarks.rs` criterion harness.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ventoux::config::EngineConfig;
use ventoux::engine::Engine;
use ventoux::perft::perft;
use ventoux::position::Position;
use ventoux::timeman::TimeControl;

fn init() {
    ventoux::attacks::init();
    ventoux::zobrist::init();
}

fn bench_perft(c: &mut Criterion) {
    init();
    c.bench_function("perft_startpos_depth_4", |b| {
        b.iter(|| {
            let mut pos = Position::startpos();
            black_box(perft(&mut pos, 4))
        });
    });
}

fn bench_search_depth_6(c: &mut Criterion) {
    init();
    c.bench_function("search_startpos_depth_6", |b| {
        b.iter(|| {
            let mut engine = Engine::new(EngineConfig::default());
            black_box(engine.go(TimeControl::Depth(6)))
        });
    });
}

criterion_group!(benches, bench_perft, bench_search_depth_6);
criterion_main!(benches);
