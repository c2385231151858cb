//! Time manager. Grounded on the teacher's `engine::time::{TimeConfig,
//! TimeControl}`, trimmed to UCI-only time controls (the XBoard
//! `from_xboard_st`/`from_xboard_time` constructors aren't needed here) and
//! extended with the soft/hard deadline split the search loop polls.

use std::time::{Duration, Instant};

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy)]
pub enum TimeControl {
    Infinite,
    Depth(u32),
    Nodes(u64),
    MoveTime { time_ms: u64 },
    Incremental { time_left_ms: u64, inc_ms: u64, movestogo: Option<u32> },
}

impl TimeControl {
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, TimeControl::Infinite)
    }

    /// Returns `(soft_deadline, hard_deadline)` relative to `start`. The
    /// soft deadline is what iterative deepening checks between
    /// iterations; the hard deadline is what the search checks every few
    /// thousand nodes and must never exceed.
    #[must_use]
    pub fn compute_limits(&self, start: Instant, config: &EngineConfig) -> (Option<Instant>, Option<Instant>) {
        let overhead = Duration::from_millis(config.move_overhead_ms);
        match *self {
            TimeControl::Infinite | TimeControl::Depth(_) | TimeControl::Nodes(_) => (None, None),
            TimeControl::MoveTime { time_ms } => {
                let budget = Duration::from_millis(time_ms).saturating_sub(overhead);
                (Some(start + budget), Some(start + budget))
            }
            TimeControl::Incremental { time_left_ms, inc_ms, movestogo } => {
                let moves = movestogo.unwrap_or(30).max(1) as u64;
                let base = time_left_ms / moves + inc_ms.saturating_sub(config.move_overhead_ms / 2);
                let soft = base;
                let hard = (base * 3).min(time_left_ms.saturating_sub(config.move_overhead_ms));
                (
                    Some(start + Duration::from_millis(soft)),
                    Some(start + Duration::from_millis(hard.max(1))),
                )
            }
        }
    }
}

pub struct TimeManager {
    start: Instant,
    soft_deadline: Option<Instant>,
    hard_deadline: Option<Instant>,
    control: TimeControl,
}

impl TimeManager {
    #[must_use]
    pub fn new(control: TimeControl, config: &EngineConfig) -> Self {
        let start = Instant::now();
        let (soft_deadline, hard_deadline) = control.compute_limits(start, config);
        TimeManager { start, soft_deadline, hard_deadline, control }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[must_use]
    pub fn should_stop_depth_loop(&self) -> bool {
        self.soft_deadline.is_some_and(|d| Instant::now() >= d)
    }

    #[must_use]
    pub fn should_stop_hard(&self) -> bool {
        self.hard_deadline.is_some_and(|d| Instant::now() >= d)
    }

    #[must_use]
    pub fn control(&self) -> TimeControl {
        self.control
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_control_never_reports_stop() {
        let config = EngineConfig::default();
        let tm = TimeManager::new(TimeControl::Infinite, &config);
        assert!(!tm.should_stop_depth_loop());
        assert!(!tm.should_stop_hard());
    }

    #[test]
    fn movetime_hard_equals_soft() {
        let config = EngineConfig::default();
        let tm = TimeManager::new(TimeControl::MoveTime { time_ms: 1000 }, &config);
        assert_eq!(tm.soft_deadline, tm.hard_deadline);
    }
}
