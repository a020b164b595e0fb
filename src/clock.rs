//! Time source and sleep used by the monitor loop.
//!
//! The loop never calls `Instant::now()` or `thread::sleep` directly, so
//! tests can drive it with a [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Slice length used when sleeping so a stop request is noticed quickly.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Source of monotonic time and the blocking wait between cycles.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Block for `duration`. Implementations may return early when the
    /// loop is asked to stop or to refresh.
    fn sleep(&self, duration: Duration);
}

/// Wall clock with an optional stop flag checked while sleeping.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    stop: Option<Arc<AtomicBool>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake up early once `stop` is set.
    pub fn with_stop(stop: Arc<AtomicBool>) -> Self {
        Self { stop: Some(stop) }
    }

    fn stopped(&self) -> bool {
        self.stop.as_ref().is_some_and(|s| s.load(Ordering::Relaxed))
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            if self.stopped() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

/// Clock that only moves when told to. `sleep` advances it instantly.
///
/// Clones share the same time, so a test can keep a handle while the
/// monitor owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
    slept: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
            slept: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Total time spent in `sleep` so far.
    pub fn total_slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.set(self.slept.get() + duration);
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let start = clock.now();

        handle.advance(Duration::from_secs(90));
        clock.sleep(Duration::from_secs(5));

        assert_eq!(clock.now() - start, Duration::from_secs(95));
        assert_eq!(handle.total_slept(), Duration::from_secs(5));
    }

    #[test]
    fn test_system_clock_sleep_returns_when_stopped() {
        let stop = Arc::new(AtomicBool::new(true));
        let clock = SystemClock::with_stop(stop);

        let started = Instant::now();
        clock.sleep(Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_system_clock_sleeps_requested_time() {
        let clock = SystemClock::new();
        let started = clock.now();
        clock.sleep(Duration::from_millis(20));
        assert!(clock.now() - started >= Duration::from_millis(20));
    }
}
