//! Time abstraction for testability
//!
//! Components that reason about expiry take a [`Clock`] so production code
//! uses real time and tests drive time by hand, without sleeping.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic and wall-clock time
pub trait Clock: Send + Sync + 'static {
    /// Current instant (monotonic time)
    fn now(&self) -> Instant;

    /// Current system time (wall clock)
    fn system_time(&self) -> SystemTime;

    /// Whole seconds since the UNIX epoch
    fn unix_seconds(&self) -> u64 {
        self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
    }
}

/// Real system clock for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn system_time(&self) -> SystemTime {
        (**self).system_time()
    }
}

/// Hand-driven clock for tests.
///
/// Clones share the same elapsed time, so a clock handed to a component can
/// still be advanced from the test body.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    wall_start: SystemTime,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a mock clock whose wall time starts at the UNIX epoch
    pub fn new() -> Self {
        Self::with_wall_clock(UNIX_EPOCH)
    }

    /// Create a mock clock whose wall time starts at `wall_start`
    pub fn with_wall_clock(wall_start: SystemTime) -> Self {
        Self { start: Instant::now(), wall_start, elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Move time forward by `duration`
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    pub fn set_elapsed(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed = duration;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        self.wall_start + self.elapsed()
    }
}
