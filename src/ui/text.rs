//! Plain-text rendering of a [`DisplayFrame`].
//!
//! Used by `--plain` mode and as the fallback when the full-screen display
//! fails. Colors are ANSI sequences from crossterm and can be turned off.

use crossterm::style::{style, Color, Stylize};

use super::frame::{BarRow, DisplayFrame};
use super::render::{EMPTY_BLOCK, FILLED_BLOCK};
use crate::data::{ProgressLevel, RateTrend};

/// Render the frame as text lines separated by `\n`.
pub fn render_text(display: &DisplayFrame, colored: bool) -> String {
    let paint = Painter { colored };
    let label_width = display.label_width();
    let rule = "─".repeat(label_width + display.total.width + 20);
    let mut out = String::new();

    out.push_str(&paint.bold(&display.title, Some(Color::Cyan)));
    if display.is_stale() {
        out.push_str("  ");
        out.push_str(&paint.bold("[STALE]", Some(Color::Yellow)));
    }
    out.push_str("\n\n");

    for row in &display.categories {
        out.push_str(&bar_line(row, label_width, &paint));
        out.push('\n');
    }

    out.push_str(&format!(" {}\n", rule));
    out.push_str(&bar_line(&display.total, label_width, &paint));
    out.push('\n');

    if let Some(breakdown) = display.status_breakdown() {
        out.push_str(&format!("  Status: {}\n", breakdown));
    }

    let rate = match display.trend {
        RateTrend::Gaining => paint.fg(&display.rate_label(), Color::Green),
        RateTrend::Idle => display.rate_label(),
        RateTrend::Losing => paint.bold(&display.rate_label(), Some(Color::Red)),
    };
    out.push_str(&format!("  Rate:   {}\n", rate));

    let eta = match display.eta.minutes() {
        Some(_) => paint.fg(&display.eta_label(), Color::Yellow),
        None => display.eta_label(),
    };
    out.push_str(&format!("  ETA:    {}  ({})\n", eta, display.remaining_label()));

    out.push_str(&format!(" {}\n", rule));
    if display.is_stale() {
        out.push_str(&paint.fg(&format!(" {}", display.footer()), Color::Yellow));
    } else {
        out.push_str(&format!(" {}", display.footer()));
    }
    out.push('\n');

    out
}

fn bar_line(row: &BarRow, label_width: usize, paint: &Painter) -> String {
    let color = match row.level {
        ProgressLevel::Low => Color::Red,
        ProgressLevel::Mid => Color::Yellow,
        ProgressLevel::Complete => Color::Green,
    };
    format!(
        "  {:<width$} [{}{}] {}",
        row.label,
        paint.fg(&FILLED_BLOCK.repeat(row.filled), color),
        EMPTY_BLOCK.repeat(row.empty()),
        row.counts_label(),
        width = label_width
    )
}

struct Painter {
    colored: bool,
}

impl Painter {
    fn fg(&self, text: &str, color: Color) -> String {
        if !self.colored || text.is_empty() {
            return text.to_string();
        }
        style(text).with(color).to_string()
    }

    fn bold(&self, text: &str, color: Option<Color>) -> String {
        if !self.colored {
            return text.to_string();
        }
        match color {
            Some(color) => style(text).with(color).bold().to_string(),
            None => style(text).bold().to_string(),
        }
    }
}
