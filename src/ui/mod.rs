//! Display layer.
//!
//! The monitor hands a [`DisplayFrame`] to a [`FrameSink`] each cycle.
//! [`TerminalSink`] draws it full-screen with ratatui; [`TextSink`] writes
//! it as (optionally colored) text and doubles as the fallback when the
//! terminal cannot be driven.

pub mod frame;
pub mod render;
pub mod sink;
pub mod text;
pub mod theme;

pub use frame::{BarRow, DisplayFrame, FrameOptions, FrameStatus, TOTAL_LABEL};
pub use sink::{FrameSink, RenderError, TerminalSink, TextSink};
pub use text::render_text;
pub use theme::Theme;
