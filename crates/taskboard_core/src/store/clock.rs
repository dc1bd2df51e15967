use crate::model::Timestamp;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock source for record timestamps.
pub trait Clock {
    /// Current time in Unix epoch milliseconds.
    fn now_ms(&self) -> Timestamp;
}

/// Reads `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as Timestamp)
            .unwrap_or(0)
    }
}

/// Hands out strictly increasing timestamps even when the clock stalls or
/// steps backwards.
#[derive(Debug, Default)]
pub(crate) struct TimestampSequence {
    last: Option<Timestamp>,
}

impl TimestampSequence {
    pub(crate) fn next(&mut self, clock: &dyn Clock) -> Timestamp {
        let now = clock.now_ms();
        let next = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(next);
        next
    }
}
