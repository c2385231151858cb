//! Entry point: install logging, then hand off to the UCI loop.

fn main() {
    ventoux::config::EngineConfig::default().init_logging();
    ventoux::uci::run();
}
