//! Time source for task timestamps.

use chrono::{DateTime, SubsecRound, Utc};

/// Supplies the current time to write paths.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to milliseconds, the precision tasks are stored with.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}
