//! Where frames end up: the full-screen terminal or a plain text stream.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use crossterm::{
    cursor::MoveTo,
    execute, queue,
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use thiserror::Error;

use super::frame::DisplayFrame;
use super::render::render;
use super::text::render_text;
use super::theme::Theme;

/// Set while a [`TerminalSink`] holds raw mode and the alternate screen.
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: Once = Once::new();

/// Drawing a frame failed.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),
}

/// Receives one structured frame per cycle and repaints it.
pub trait FrameSink {
    fn draw(&mut self, frame: &DisplayFrame) -> Result<(), RenderError>;
}

/// Full-screen ratatui display on the alternate screen.
///
/// Raw mode and the alternate screen are restored on drop and on panic.
pub struct TerminalSink {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
}

impl TerminalSink {
    pub fn new(theme: Theme) -> Result<Self, RenderError> {
        install_panic_hook();

        enable_raw_mode()?;
        TERMINAL_ACTIVE.store(true, Ordering::SeqCst);
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            restore_terminal();
            return Err(e.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore_terminal();
                return Err(e.into());
            }
        };

        Ok(Self { terminal, theme })
    }
}

impl FrameSink for TerminalSink {
    fn draw(&mut self, frame: &DisplayFrame) -> Result<(), RenderError> {
        let theme = &self.theme;
        self.terminal.draw(|f| render(f, frame, theme))?;
        Ok(())
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        restore_terminal();
        let _ = self.terminal.show_cursor();
    }
}

/// Chain a hook that restores the terminal before the default panic output.
/// Installed once per process; it does nothing when no sink is active.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic| {
            restore_terminal();
            original_hook(panic);
        }));
    });
}

/// Clear the active flag, returning whether it was set.
fn take_active() -> bool {
    TERMINAL_ACTIVE.swap(false, Ordering::SeqCst)
}

fn restore_terminal() {
    if take_active() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Clears the screen and writes the frame as text, optionally colored.
pub struct TextSink<W: Write> {
    out: W,
    colored: bool,
}

impl TextSink<Stdout> {
    pub fn stdout(colored: bool) -> Self {
        Self::new(io::stdout(), colored)
    }
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self { out, colored }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TextSink<W> {
    fn draw(&mut self, frame: &DisplayFrame) -> Result<(), RenderError> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.write_all(render_text(frame, self.colored).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
