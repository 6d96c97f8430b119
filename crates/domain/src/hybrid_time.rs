//! Hybrid timestamps: physical milliseconds shifted above an 18-bit logical counter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Number of low bits reserved for the logical counter.
pub const LOGICAL_BITS: u32 = 18;

const LOGICAL_MASK: u64 = (1 << LOGICAL_BITS) - 1;

/// A point in the service's hybrid time domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HybridTimestamp(u64);

impl HybridTimestamp {
    /// Wrap a raw wire value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Compose from physical milliseconds since the Unix epoch and a logical counter.
    ///
    /// The counter is truncated to [`LOGICAL_BITS`] bits.
    #[must_use]
    pub const fn compose(physical_millis: u64, logical: u64) -> Self {
        Self((physical_millis << LOGICAL_BITS) | (logical & LOGICAL_MASK))
    }

    /// Hybrid timestamp for a wall-clock instant with a zero logical counter.
    ///
    /// Instants before the Unix epoch clamp to zero.
    #[must_use]
    pub fn from_system_time(time: SystemTime) -> Self {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        Self::compose(millis, 0)
    }

    /// Raw wire value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Physical component in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn physical_millis(self) -> u64 {
        self.0 >> LOGICAL_BITS
    }

    /// Logical counter component.
    #[must_use]
    pub const fn logical(self) -> u64 {
        self.0 & LOGICAL_MASK
    }

    /// Wall-clock instant of the physical component.
    #[must_use]
    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.physical_millis())
    }
}

impl fmt::Display for HybridTimestamp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
