//! Deterministic clocks.

use milvus_client_ports::Clock;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(SystemTime);

impl FixedClock {
    /// Clock frozen at `time`.
    pub const fn new(time: SystemTime) -> Self {
        Self(time)
    }

    /// Clock frozen `millis` after the Unix epoch.
    pub fn at_millis(millis: u64) -> Self {
        Self(UNIX_EPOCH + Duration::from_millis(millis))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

/// Clock that advances by a fixed step after every reading.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<SystemTime>,
    step: Duration,
}

impl SteppingClock {
    /// First reading is `start`; each later one is `step` further.
    pub const fn new(start: SystemTime, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> SystemTime {
        let mut next = self.next.lock().expect("clock lock");
        let now = *next;
        *next = now + self.step;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_clock_advances_per_reading() {
        let clock = SteppingClock::new(UNIX_EPOCH, Duration::from_secs(1));
        assert_eq!(clock.now(), UNIX_EPOCH);
        assert_eq!(clock.now(), UNIX_EPOCH + Duration::from_secs(1));
        assert_eq!(FixedClock::at_millis(5).now(), UNIX_EPOCH + Duration::from_millis(5));
    }
}
