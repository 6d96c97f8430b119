//! Consistency levels and guarantee-timestamp derivation.

use crate::hybrid_time::HybridTimestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Guarantee timestamp asking for the latest state.
pub const GUARANTEE_STRONG_TS: u64 = 0;

/// Guarantee timestamp allowing any visible snapshot.
pub const GUARANTEE_EVENTUALLY_TS: u64 = 1;

/// Requested staleness bound for a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    /// Read the latest committed state.
    Strong,
    /// Read your own writes within a session.
    Session,
    /// Bounded staleness: anything older than the graceful time is visible.
    #[default]
    Bounded,
    /// Any snapshot is acceptable.
    Eventually,
    /// Caller-provided guarantee timestamp.
    Customized,
}

impl ConsistencyLevel {
    /// Name used in configuration files and the environment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Session => "Session",
            Self::Bounded => "Bounded",
            Self::Eventually => "Eventually",
            Self::Customized => "Customized",
        }
    }

    /// Parse a level name, ignoring ASCII case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        [
            Self::Strong,
            Self::Session,
            Self::Bounded,
            Self::Eventually,
            Self::Customized,
        ]
        .into_iter()
        .find(|level| level.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Derive the guarantee timestamp sent with a read.
///
/// - no level: `explicit` unchanged
/// - `Strong`: 0
/// - `Bounded`: hybrid timestamp of `now - graceful`
/// - `Eventually`: 1
/// - `Session` / `Customized`: `explicit` unchanged
#[must_use]
pub fn guarantee_timestamp(
    level: Option<ConsistencyLevel>,
    explicit: u64,
    graceful: Duration,
    now: SystemTime,
) -> u64 {
    match level {
        Some(ConsistencyLevel::Strong) => GUARANTEE_STRONG_TS,
        Some(ConsistencyLevel::Bounded) => {
            let bound = now.checked_sub(graceful).unwrap_or(SystemTime::UNIX_EPOCH);
            HybridTimestamp::from_system_time(bound).raw()
        },
        Some(ConsistencyLevel::Eventually) => GUARANTEE_EVENTUALLY_TS,
        Some(ConsistencyLevel::Session | ConsistencyLevel::Customized) | None => explicit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::UNIX_EPOCH;

    fn at_millis(millis: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(millis)
    }

    #[test]
    fn bounded_subtracts_graceful_time_before_shifting() {
        let ts = guarantee_timestamp(
            Some(ConsistencyLevel::Bounded),
            99,
            Duration::from_millis(5_000),
            at_millis(1_000_000),
        );
        assert_eq!(ts, 995_000 << 18);
    }

    #[test]
    fn graceful_time_larger_than_clock_clamps_to_epoch() {
        let ts = guarantee_timestamp(
            Some(ConsistencyLevel::Bounded),
            0,
            Duration::from_secs(10),
            at_millis(1_000),
        );
        assert_eq!(ts, 0);
    }

    #[test]
    fn session_and_customized_use_explicit_value() {
        for level in [ConsistencyLevel::Session, ConsistencyLevel::Customized] {
            let ts = guarantee_timestamp(Some(level), 42, Duration::ZERO, at_millis(5));
            assert_eq!(ts, 42);
        }
    }

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(
            ConsistencyLevel::parse("eventually"),
            Some(ConsistencyLevel::Eventually)
        );
        assert_eq!(
            ConsistencyLevel::parse(" STRONG "),
            Some(ConsistencyLevel::Strong)
        );
        assert_eq!(ConsistencyLevel::parse("linearizable"), None);
        assert_eq!(ConsistencyLevel::default(), ConsistencyLevel::Bounded);
    }

    proptest! {
        #[test]
        fn strong_is_always_zero(explicit in any::<u64>(), now in 0_u64..(1 << 42), graceful in 0_u64..100_000) {
            let ts = guarantee_timestamp(
                Some(ConsistencyLevel::Strong),
                explicit,
                Duration::from_millis(graceful),
                at_millis(now),
            );
            prop_assert_eq!(ts, GUARANTEE_STRONG_TS);
        }

        #[test]
        fn eventually_is_always_one(explicit in any::<u64>(), now in 0_u64..(1 << 42)) {
            let ts = guarantee_timestamp(
                Some(ConsistencyLevel::Eventually),
                explicit,
                Duration::ZERO,
                at_millis(now),
            );
            prop_assert_eq!(ts, GUARANTEE_EVENTUALLY_TS);
        }

        #[test]
        fn missing_level_passes_explicit_through(explicit in any::<u64>(), now in 0_u64..(1 << 42)) {
            let ts = guarantee_timestamp(None, explicit, Duration::from_secs(5), at_millis(now));
            prop_assert_eq!(ts, explicit);
        }

        #[test]
        fn bounded_is_monotonic_in_wall_clock(
            now in 0_u64..(1 << 42),
            step in 1_u64..1_000_000,
            graceful in 0_u64..100_000,
        ) {
            let graceful = Duration::from_millis(graceful);
            let first = guarantee_timestamp(Some(ConsistencyLevel::Bounded), 0, graceful, at_millis(now));
            let second = guarantee_timestamp(
                Some(ConsistencyLevel::Bounded),
                0,
                graceful,
                at_millis(now + step),
            );
            prop_assert!(second >= first);
        }
    }
}
