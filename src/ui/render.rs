//! Full-screen rendering of a [`DisplayFrame`] with ratatui.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Title (and STALE badge)                      │
//! ├──────────────────────────────────────────────┤
//! │  Chocolate [█████████░░░░] 7/10 (70%)        │
//! │  ...                                         │
//! │  Total     [██████████░░░] 10/13 (77%)       │
//! │  Rate / ETA                                  │
//! ├──────────────────────────────────────────────┤
//! │ Footer: source, uptime, stale marker         │
//! └──────────────────────────────────────────────┘
//! ```

use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::frame::{BarRow, DisplayFrame};
use super::theme::Theme;

pub const FILLED_BLOCK: &str = "█";
pub const EMPTY_BLOCK: &str = "░";

/// Draw the frame over the whole terminal area.
pub fn render(frame: &mut Frame, display: &DisplayFrame, theme: &Theme) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(3),    // Bars and figures
        Constraint::Length(1), // Footer
    ])
    .split(frame.area());

    let mut header = vec![Span::styled(format!(" {} ", display.title), theme.title)];
    if display.is_stale() {
        header.push(Span::styled(" STALE ", theme.stale));
    }
    frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(frame_lines(display, theme)).block(block), chunks[1]);

    let footer_style = if display.is_stale() {
        theme.stale
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    frame.render_widget(
        Paragraph::new(format!(" {}", display.footer())).style(footer_style),
        chunks[2],
    );
}

/// Body lines: one bar per category, a separator, the total bar, then the
/// status breakdown, rate and ETA.
pub fn frame_lines(display: &DisplayFrame, theme: &Theme) -> Vec<Line<'static>> {
    let label_width = display.label_width();
    let mut lines: Vec<Line<'static>> = display
        .categories
        .iter()
        .map(|row| bar_line(row, label_width, theme))
        .collect();

    let rule_width = label_width + display.total.width + 20;
    lines.push(Line::from(Span::styled(
        format!(" {}", "─".repeat(rule_width)),
        Style::default().fg(theme.border),
    )));
    lines.push(bar_line(&display.total, label_width, theme));

    if let Some(breakdown) = display.status_breakdown() {
        lines.push(Line::from(vec![
            Span::raw("  Status: "),
            Span::styled(breakdown, Style::default().add_modifier(Modifier::DIM)),
        ]));
    }

    lines.push(Line::from(vec![
        Span::raw("  Rate:   "),
        Span::styled(display.rate_label(), theme.rate_style(display.trend)),
    ]));

    let eta_style = match display.eta.minutes() {
        Some(_) => Style::default().fg(theme.eta),
        None => Style::default().add_modifier(Modifier::DIM),
    };
    lines.push(Line::from(vec![
        Span::raw("  ETA:    "),
        Span::styled(display.eta_label(), eta_style),
        Span::styled(
            format!("  ({})", display.remaining_label()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]));

    lines
}

fn bar_line(row: &BarRow, label_width: usize, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {:<width$} [", row.label, width = label_width)),
        Span::styled(FILLED_BLOCK.repeat(row.filled), theme.level_style(row.level)),
        Span::styled(EMPTY_BLOCK.repeat(row.empty()), Style::default().fg(theme.track)),
        Span::raw(format!("] {}", row.counts_label())),
    ])
}
