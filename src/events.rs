//! Keyboard handling for the full-screen mode.
//!
//! Raw mode swallows Ctrl+C, so the wait between cycles polls the keyboard
//! instead of sleeping blindly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, warn};

use crate::clock::Clock;

/// Poll granularity while waiting for the next cycle.
const POLL_SLICE: Duration = Duration::from_millis(100);

/// What a key press asks the monitor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    /// End the current wait and sample now.
    Refresh,
    Ignore,
}

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(key: KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Refresh,
        _ => KeyAction::Ignore,
    }
}

/// Wall clock whose sleep listens to the keyboard.
///
/// Quit sets the shared stop flag; refresh cuts the wait short.
#[derive(Debug, Clone)]
pub struct KeyboardClock {
    stop: Arc<AtomicBool>,
}

impl KeyboardClock {
    pub fn new(stop: Arc<AtomicBool>) -> Self {
        Self { stop }
    }
}

impl Clock for KeyboardClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            let slice = (deadline - now).min(POLL_SLICE);

            match poll_event(slice) {
                Ok(Some(Event::Key(key))) => match handle_key_event(key) {
                    KeyAction::Quit => {
                        debug!("Quit requested from keyboard");
                        self.stop.store(true, Ordering::Relaxed);
                        return;
                    }
                    KeyAction::Refresh => {
                        debug!("Refresh requested from keyboard");
                        return;
                    }
                    KeyAction::Ignore => {}
                },
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Keyboard polling failed");
                    thread::sleep(slice);
                }
            }
        }
    }
}
