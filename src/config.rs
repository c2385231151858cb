//! Engine configuration (C11, ambient). Grounded on the teacher's
//! `uci::options::UciOptions`, generalized to also carry the NNUE/Syzygy
//! paths and a log level since those are runtime-configurable in this spec.

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub hash_mb: usize,
    pub threads: usize,
    pub move_overhead_ms: u64,
    pub multi_pv: usize,
    pub eval_file: Option<PathBuf>,
    pub syzygy_path: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            hash_mb: 16,
            threads: 1,
            move_overhead_ms: 10,
            multi_pv: 1,
            eval_file: None,
            syzygy_path: None,
            log_level: LogLevel::Info,
        }
    }
}

impl EngineConfig {
    /// Installs a logger at the configured level, the way the teacher's
    /// `main.rs` wires `env_logger` before entering the UCI loop. Safe to
    /// call more than once; later calls are no-ops.
    pub fn init_logging(&self) {
        #[cfg(feature = "logging")]
        {
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(self.log_level.as_filter()),
            )
            .is_test(false)
            .try_init();
        }
    }
}
