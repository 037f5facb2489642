//! HelpOverlay — centered popup with the keyboard and mouse reference.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

pub fn draw_help(frame: &mut Frame, area: Rect, theme: &Theme) {
    let popup = centered_rect(64, 26, area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            theme.style_muted().add_modifier(Modifier::BOLD),
        ))
    };

    let lines = vec![
        Line::from(Span::styled(" keyboard shortcuts", theme.style_title())),
        Line::from(""),
        section(" queue"),
        help_row("↑ / ↓  or  k / j", "move selection", theme),
        help_row("← / →  or  h / l", "previous / next page", theme),
        help_row("r", "reload queue from server", theme),
        help_row("wheel", "scroll selection", theme),
        help_row("click", "select item", theme),
        Line::from(""),
        section(" search"),
        help_row("/", "open search input", theme),
        help_row("from:\"x y\"", "restrict to playlist or album", theme),
        help_row("by:artist", "restrict to artist", theme),
        help_row("n / p", "next / previous result page", theme),
        help_row("enter", "enqueue selected result", theme),
        help_row("a", "enqueue every result on this page", theme),
        help_row("esc", "back to queue", theme),
        Line::from(""),
        section(" general"),
        help_row("?", "toggle this help overlay", theme),
        help_row("q / Ctrl+C", "quit", theme),
        Line::from(""),
        Line::from(Span::styled(" press ? or esc to close", theme.style_muted())),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.separator))
                    .style(Style::default().bg(theme.input_bg)),
            )
            .wrap(Wrap { trim: false }),
        popup,
    );
}

fn help_row<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(format!("{:<18}", key), theme.style_title()),
        Span::styled(desc, theme.style_secondary()),
    ])
}

/// Rect of fixed `height` and `percent_x` width centered in `r`.
pub fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}
