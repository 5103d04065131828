//! Process identifiers and simulated time.
//!
//! Pids are a newtype so they never mix with tick counts or instruction indices;
//! ticks stay a plain alias because the run loop does arithmetic on them.

use std::fmt;

use serde::Serialize;

/// Simulated time, in ticks. Tick 0 is before the first instruction executes.
pub type Tick = u64;

/// Process identifier: 0-indexed, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Pid(pub usize);

impl Pid {
    /// Returns the table index for this pid.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
