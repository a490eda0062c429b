//! Time sources and deadlines for polling.
//!
//! Searches and liveness waits read time only through [`Clock`], so tests can
//! swap in a [`FakeClock`] and step time deterministically.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current instant
    fn now(&self) -> Instant;
}

/// The real monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests
#[derive(Debug)]
pub struct FakeClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

impl FakeClock {
    /// Create a clock frozen at its creation instant
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    /// Move time forward
    pub fn advance(&self, duration: Duration) {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.advance_ms(ms);
    }

    /// Move time forward by `ms` milliseconds
    pub fn advance_ms(&self, ms: u64) {
        let current = self.offset_ms.load(Ordering::SeqCst);
        self.offset_ms
            .store(current.saturating_add(ms), Ordering::SeqCst);
    }

    /// Milliseconds elapsed since creation
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.offset_ms.load(Ordering::SeqCst)
    }

    /// The instant the clock started at
    #[must_use]
    pub const fn origin(&self) -> Instant {
        self.origin
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// How long an operation may keep polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Relative to when the operation starts
    After(Duration),
    /// Absolute instant
    At(Instant),
    /// No deadline
    Never,
}

impl Default for Timeout {
    fn default() -> Self {
        Self::After(Duration::ZERO)
    }
}

impl Timeout {
    /// Zero timeout: a single pass
    pub const IMMEDIATE: Self = Self::After(Duration::ZERO);

    /// Relative timeout in milliseconds
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self::After(Duration::from_millis(ms))
    }

    /// Fix the timeout to an absolute deadline, starting at `now`
    #[must_use]
    pub fn deadline_from(self, now: Instant) -> Deadline {
        match self {
            Self::After(duration) => now.checked_add(duration).map_or(Deadline::Never, Deadline::At),
            Self::At(instant) => Deadline::At(instant),
            Self::Never => Deadline::Never,
        }
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Self::After(duration)
    }
}

impl From<Instant> for Timeout {
    fn from(instant: Instant) -> Self {
        Self::At(instant)
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(duration: Option<Duration>) -> Self {
        duration.map_or(Self::Never, Self::After)
    }
}

/// An absolute end point for polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Stop once this instant has passed
    At(Instant),
    /// Never expires
    Never,
}

impl Deadline {
    /// Whether the deadline lies strictly after `now`
    #[must_use]
    pub fn is_after(&self, now: Instant) -> bool {
        match self {
            Self::At(instant) => *instant > now,
            Self::Never => true,
        }
    }

    /// Time left before the deadline, if it is finite
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match self {
            Self::At(instant) => Some(instant.saturating_duration_since(now)),
            Self::Never => None,
        }
    }
}
