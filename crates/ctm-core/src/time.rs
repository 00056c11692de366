//! Report time model.
//!
//! # Design
//!
//! Report rows are keyed by a millisecond Unix epoch timestamp.  Every report
//! (and every ensemble member) holds exactly one `Timestamp`; queries select
//! reports with a closed [`TimeInterval`] where both bounds are inclusive.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Timestamp ────────────────────────────────────────────────────────────────

/// Milliseconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Build a timestamp from whole seconds since the epoch.
    #[inline]
    pub fn from_secs(secs: i64) -> Timestamp {
        Timestamp(secs * 1_000)
    }

    /// Return the timestamp `ms` milliseconds after `self`.
    #[inline]
    pub fn offset_ms(self, ms: i64) -> Timestamp {
        Timestamp(self.0 + ms)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── TimeInterval ──────────────────────────────────────────────────────────────

/// A closed interval `[start, end]` of report timestamps.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeInterval {
    pub start: Timestamp,
    pub end:   Timestamp,
}

impl TimeInterval {
    /// Create an interval, rejecting `start > end`.
    pub fn new(start: Timestamp, end: Timestamp) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// The degenerate interval containing only `t`.
    #[inline]
    pub fn at(t: Timestamp) -> Self {
        Self { start: t, end: t }
    }

    /// Every representable timestamp.
    pub fn all() -> Self {
        Self { start: Timestamp(i64::MIN), end: Timestamp(i64::MAX) }
    }

    #[inline]
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t <= self.end
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
