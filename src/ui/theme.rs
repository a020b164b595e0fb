//! Theme configuration for the full-screen display.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{ProgressLevel, RateTrend};

/// Color and style theme for the full-screen display.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Fill color for bars below the mid threshold.
    pub low: Color,
    /// Fill color for bars between the mid and complete thresholds.
    pub mid: Color,
    /// Fill color for bars at or above the complete threshold.
    pub complete: Color,
    /// Color of the unfilled part of a bar.
    pub track: Color,
    /// Rate color while production advances.
    pub gaining: Color,
    /// Rate color while production reverts.
    pub losing: Color,
    /// Color of the ETA value.
    pub eta: Color,
    /// Style for the heading.
    pub title: Style,
    /// Style for the stale-data marker.
    pub stale: Style,
    /// Color for borders and separators.
    pub border: Color,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            low: Color::Red,
            mid: Color::Yellow,
            complete: Color::Green,
            track: Color::DarkGray,
            gaining: Color::Green,
            losing: Color::Red,
            eta: Color::Yellow,
            title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            stale: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            border: Color::Gray,
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            low: Color::Red,
            mid: Color::Rgb(176, 120, 0),
            complete: Color::Green,
            track: Color::Gray,
            gaining: Color::Green,
            losing: Color::Red,
            eta: Color::Rgb(176, 120, 0),
            title: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            stale: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            border: Color::DarkGray,
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for the filled part of a bar.
    pub fn level_style(&self, level: ProgressLevel) -> Style {
        let color = match level {
            ProgressLevel::Low => self.low,
            ProgressLevel::Mid => self.mid,
            ProgressLevel::Complete => self.complete,
        };
        Style::default().fg(color)
    }

    /// Style for the rate value. Zero is neutral; negative is a warning.
    pub fn rate_style(&self, trend: RateTrend) -> Style {
        match trend {
            RateTrend::Gaining => Style::default().fg(self.gaining),
            RateTrend::Idle => Style::default(),
            RateTrend::Losing => Style::default().fg(self.losing).add_modifier(Modifier::BOLD),
        }
    }
}
