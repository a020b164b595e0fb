//! The polling loop.
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//!   RUNNING: sample ─▶ compute_metrics ─▶ render ─▶ sleep ──┘
//!      │        │
//!      │        └─ SourceUnavailable: stale frame, sleep(backoff)
//!      ▼
//!   TERMINATED: stop requested, or no sink left to draw on
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::backoff::Backoff;
use crate::clock::Clock;
use crate::data::{Metrics, ProductionSnapshot};
use crate::monitor::RateMonitor;
use crate::ui::{DisplayFrame, FrameOptions, FrameSink, RenderError};

/// Loop driver states. There is no success state; the loop only ends when
/// asked to or when it cannot draw anymore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Runs sample, compute, render and sleep cycles until stopped.
pub struct Driver<C: Clock> {
    monitor: RateMonitor<C>,
    sink: Box<dyn FrameSink>,
    fallback: Option<Box<dyn FrameSink>>,
    options: FrameOptions,
    poll_interval: Duration,
    backoff: Backoff,
    stop: Arc<AtomicBool>,
    /// Snapshot and metrics of the last successful cycle, reused for stale frames.
    last_good: Option<(ProductionSnapshot, Metrics)>,
    state: LoopState,
}

impl<C: Clock> Driver<C> {
    pub fn new(
        monitor: RateMonitor<C>,
        sink: Box<dyn FrameSink>,
        options: FrameOptions,
        poll_interval: Duration,
        max_backoff: Duration,
    ) -> Self {
        Self {
            monitor,
            sink,
            fallback: None,
            options,
            poll_interval,
            backoff: Backoff::new(poll_interval, max_backoff),
            stop: Arc::new(AtomicBool::new(false)),
            last_good: None,
            state: LoopState::Running,
        }
    }

    /// Sink to switch to if the primary one fails.
    pub fn with_fallback(mut self, fallback: Box<dyn FrameSink>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Shared flag that ends the loop once set.
    pub fn with_stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn monitor(&self) -> &RateMonitor<C> {
        &self.monitor
    }

    /// Run cycles until the loop terminates.
    pub fn run(&mut self) -> Result<(), RenderError> {
        info!(
            source = self.monitor.source_description(),
            interval = ?self.poll_interval,
            "Monitor loop started"
        );
        let result = loop {
            match self.step() {
                Ok(LoopState::Running) => continue,
                Ok(LoopState::Terminated) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        info!(failures = self.backoff.failures(), "Monitor loop stopped");
        result
    }

    /// Run one cycle including its sleep.
    pub fn step(&mut self) -> Result<LoopState, RenderError> {
        if self.stop_requested() {
            self.state = LoopState::Terminated;
            return Ok(self.state);
        }

        let wait = match self.run_cycle() {
            Ok(wait) => wait,
            Err(e) => {
                self.state = LoopState::Terminated;
                return Err(e);
            }
        };

        if !self.stop_requested() {
            self.monitor.clock().sleep(wait);
        }
        if self.stop_requested() {
            self.state = LoopState::Terminated;
        }
        Ok(self.state)
    }

    /// Sample, compute and draw; returns how long to wait before the next cycle.
    fn run_cycle(&mut self) -> Result<Duration, RenderError> {
        // The first cycle shows the snapshot taken at initialization.
        if self.last_good.is_none() {
            let snapshot = self.monitor.state().last_snapshot.clone();
            self.render(snapshot)?;
            return Ok(self.poll_interval);
        }

        match self.monitor.sample() {
            Ok(snapshot) => {
                if self.backoff.failures() > 0 {
                    info!(failures = self.backoff.failures(), "Source recovered");
                }
                self.backoff.mark_success();
                self.render(snapshot)?;
                Ok(self.poll_interval)
            }
            Err(e) => {
                let delay = self.backoff.mark_failure();
                warn!(
                    error = %e,
                    failures = self.backoff.failures(),
                    retry_in = ?delay,
                    "Fetch failed, showing last known data"
                );
                let frame = self.stale_frame(&e.to_string(), delay);
                self.draw(&frame)?;
                Ok(delay)
            }
        }
    }

    /// Draw a live frame for `snapshot` and remember it as the last good cycle.
    fn render(&mut self, snapshot: ProductionSnapshot) -> Result<(), RenderError> {
        let metrics = self.monitor.compute_metrics(&snapshot);
        let frame = DisplayFrame::build(
            &snapshot,
            &metrics,
            &self.options,
            self.monitor.source_description(),
        );
        self.last_good = Some((snapshot, metrics));
        self.draw(&frame)
    }

    /// Last good figures, marked stale. Only the uptime moves on.
    fn stale_frame(&self, reason: &str, retry_in: Duration) -> DisplayFrame {
        let snapshot = &self.monitor.state().last_snapshot;
        let fresh;
        let (snapshot, metrics) = match &self.last_good {
            Some((snapshot, metrics)) => (snapshot, metrics),
            None => {
                fresh = self.monitor.compute_metrics(snapshot);
                (snapshot, &fresh)
            }
        };
        let mut frame = DisplayFrame::build(
            snapshot,
            metrics,
            &self.options,
            self.monitor.source_description(),
        );
        frame.elapsed = self
            .monitor
            .clock()
            .now()
            .saturating_duration_since(self.monitor.state().start_time);
        frame.stale(reason, self.backoff.failures(), retry_in)
    }

    /// Draw on the current sink, switching to the fallback once if it fails.
    fn draw(&mut self, frame: &DisplayFrame) -> Result<(), RenderError> {
        let Err(e) = self.sink.draw(frame) else {
            return Ok(());
        };

        match self.fallback.take() {
            Some(fallback) => {
                warn!(error = %e, "Display failed, switching to plain text output");
                self.sink = fallback;
                self.sink.draw(frame)
            }
            None => {
                error!(error = %e, "Display failed and no fallback is left");
                Err(e)
            }
        }
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::data::{Eta, RateTrend};
    use crate::monitor::tests::ScriptedSource;
    use crate::ui::FrameStatus;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    const INTERVAL: Duration = Duration::from_secs(5);

    /// Keeps every drawn frame; optionally sets the stop flag after `stop_after` frames.
    #[derive(Clone, Default)]
    struct RecordingSink {
        frames: Rc<RefCell<Vec<DisplayFrame>>>,
        stop: Option<(Arc<AtomicBool>, usize)>,
    }

    impl FrameSink for RecordingSink {
        fn draw(&mut self, frame: &DisplayFrame) -> Result<(), RenderError> {
            self.frames.borrow_mut().push(frame.clone());
            if let Some((stop, after)) = &self.stop {
                if self.frames.borrow().len() >= *after {
                    stop.store(true, Ordering::Relaxed);
                }
            }
            Ok(())
        }
    }

    struct FailingSink;

    impl FrameSink for FailingSink {
        fn draw(&mut self, _frame: &DisplayFrame) -> Result<(), RenderError> {
            Err(io::Error::new(io::ErrorKind::Other, "terminal gone").into())
        }
    }

    fn driver(
        source: ScriptedSource,
        clock: &ManualClock,
        sink: Box<dyn FrameSink>,
        interval: Duration,
    ) -> Driver<ManualClock> {
        let monitor = RateMonitor::initialize(Box::new(source), clock.clone(), "OK").unwrap();
        Driver::new(monitor, sink, FrameOptions::default(), interval, Duration::from_secs(60))
    }

    #[test]
    fn test_first_cycle_renders_initial_snapshot() {
        let clock = ManualClock::new();
        let sink = RecordingSink::default();
        let frames = sink.frames.clone();
        let source = ScriptedSource::new().then_counts(&[("Chocolate", 5, 10)]);
        let mut driver = driver(source, &clock, Box::new(sink), INTERVAL);

        assert_eq!(driver.step().unwrap(), LoopState::Running);

        let frames = frames.borrow();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].total.counts_label(), "5/10 (50%)");
        assert_eq!(frames[0].eta, Eta::Unknown);
        assert_eq!(clock.total_slept(), INTERVAL);
    }

    #[test]
    fn test_regression_shows_negative_rate() {
        let clock = ManualClock::new();
        let sink = RecordingSink::default();
        let frames = sink.frames.clone();
        let source = ScriptedSource::new()
            .then_counts(&[("Chocolate", 10, 13)])
            .then_counts(&[("Chocolate", 8, 13)]);
        let mut driver = driver(source, &clock, Box::new(sink), Duration::from_secs(60));

        driver.step().unwrap();
        driver.step().unwrap();

        let frames = frames.borrow();
        let last = frames.last().unwrap();
        assert!((last.rate_per_minute + 2.0).abs() < 1e-9);
        assert_eq!(last.trend, RateTrend::Losing);
        assert_eq!(last.eta, Eta::Unknown);
        assert_eq!(last.remaining, 5);
        assert_eq!(driver.monitor().baseline_produced(), 10);
    }

    #[test]
    fn test_fetch_failure_keeps_running_with_stale_frame() {
        let clock = ManualClock::new();
        let sink = RecordingSink::default();
        let frames = sink.frames.clone();
        let source = ScriptedSource::new()
            .then_counts(&[("Chocolate", 5, 10), ("Lemon", 3, 3)])
            .then_counts(&[("Chocolate", 7, 10), ("Lemon", 3, 3)])
            .then_fail("connection reset")
            .then_fail("connection reset")
            .then_counts(&[("Chocolate", 9, 10), ("Lemon", 3, 3)]);
        let mut driver = driver(source, &clock, Box::new(sink), INTERVAL);

        for _ in 0..3 {
            assert_eq!(driver.step().unwrap(), LoopState::Running);
        }

        {
            let frames = frames.borrow();
            let live = &frames[1];
            let stale = &frames[2];
            assert_eq!(live.status, FrameStatus::Live);
            assert!(stale.is_stale());
            assert_eq!(stale.total, live.total);
            assert_eq!(stale.rate_per_minute, live.rate_per_minute);
            assert_eq!(
                stale.status,
                FrameStatus::Stale {
                    reason: "Connection failed: connection reset".to_string(),
                    failures: 1,
                    retry_in: INTERVAL,
                }
            );
        }

        // A second failure in a row doubles the wait.
        driver.step().unwrap();
        assert!(matches!(
            frames.borrow()[3].status,
            FrameStatus::Stale { failures: 2, retry_in, .. } if retry_in == INTERVAL * 2
        ));
        assert_eq!(clock.total_slept(), INTERVAL * 5);

        driver.step().unwrap();
        let frames = frames.borrow();
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[4].status, FrameStatus::Live);
        assert_eq!(frames[4].total.counts_label(), "12/13 (92%)");
        assert_eq!(driver.backoff.failures(), 0);
        assert_eq!(driver.state(), LoopState::Running);
    }

    #[test]
    fn test_failure_on_first_sample_uses_initial_figures() {
        let clock = ManualClock::new();
        let sink = RecordingSink::default();
        let frames = sink.frames.clone();
        let source = ScriptedSource::new()
            .then_counts(&[("Chocolate", 4, 8)])
            .then_fail("timeout");
        let mut driver = driver(source, &clock, Box::new(sink), INTERVAL);

        driver.step().unwrap();
        driver.step().unwrap();

        let frames = frames.borrow();
        assert!(frames[1].is_stale());
        assert_eq!(frames[1].total.counts_label(), "4/8 (50%)");
        assert_eq!(frames[1].elapsed, INTERVAL);
    }

    #[test]
    fn test_stop_flag_terminates_run() {
        let clock = ManualClock::new();
        let stop = Arc::new(AtomicBool::new(false));
        let sink = RecordingSink {
            frames: Rc::default(),
            stop: Some((stop.clone(), 3)),
        };
        let frames = sink.frames.clone();
        let source = ScriptedSource::new()
            .then_counts(&[("Chocolate", 1, 4)])
            .then_counts(&[("Chocolate", 2, 4)])
            .then_counts(&[("Chocolate", 3, 4)]);
        let mut driver = driver(source, &clock, Box::new(sink), INTERVAL).with_stop(stop);

        driver.run().unwrap();

        assert_eq!(driver.state(), LoopState::Terminated);
        assert_eq!(frames.borrow().len(), 3);
        // No sleep after the stop request.
        assert_eq!(clock.total_slept(), INTERVAL * 2);
    }

    #[test]
    fn test_stop_before_first_cycle_draws_nothing() {
        let clock = ManualClock::new();
        let sink = RecordingSink::default();
        let frames = sink.frames.clone();
        let source = ScriptedSource::new().then_counts(&[("Chocolate", 1, 4)]);
        let stop = Arc::new(AtomicBool::new(true));
        let mut driver = driver(source, &clock, Box::new(sink), INTERVAL).with_stop(stop);

        assert_eq!(driver.step().unwrap(), LoopState::Terminated);
        assert!(frames.borrow().is_empty());
    }

    #[test]
    fn test_render_failure_switches_to_fallback() {
        let clock = ManualClock::new();
        let fallback = RecordingSink::default();
        let frames = fallback.frames.clone();
        let source = ScriptedSource::new()
            .then_counts(&[("Chocolate", 1, 4)])
            .then_counts(&[("Chocolate", 2, 4)]);
        let mut driver = driver(source, &clock, Box::new(FailingSink), INTERVAL)
            .with_fallback(Box::new(fallback));

        assert_eq!(driver.step().unwrap(), LoopState::Running);
        assert_eq!(driver.step().unwrap(), LoopState::Running);

        let frames = frames.borrow();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].total.counts_label(), "2/4 (50%)");
    }

    #[test]
    fn test_render_failure_without_fallback_terminates() {
        let clock = ManualClock::new();
        let source = ScriptedSource::new().then_counts(&[("Chocolate", 1, 4)]);
        let mut driver = driver(source, &clock, Box::new(FailingSink), INTERVAL);

        let result = driver.run();

        assert!(matches!(result, Err(RenderError::Io(_))));
        assert_eq!(driver.state(), LoopState::Terminated);
        assert_eq!(clock.total_slept(), Duration::ZERO);
    }
}
