//! Status bar — bottom line with server health, mode, and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Queue,
    Search,
    Results,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Queue => "QUEUE",
            Self::Search => "SEARCH",
            Self::Results => "RESULTS",
        }
    }

    fn keys(self) -> &'static str {
        match self {
            Self::Queue => " ↑↓/jk select  ←→/hl page  r reload  / search  ? help  q quit",
            Self::Search => " type query  Enter search  Esc close",
            Self::Results => {
                " ↑↓/jk select  ←→/hl page  n/p more  Enter enqueue  a enqueue page  Esc back  ? help"
            }
        }
    }
}

/// Draw the keybindings footer (one row). `server_up` is `None` until the
/// startup probe reports.
pub fn draw_keys_bar(
    frame: &mut Frame,
    area: Rect,
    mode: Mode,
    server_up: Option<bool>,
    theme: &Theme,
) {
    let bulb = match server_up {
        Some(true) => Span::styled("●", Style::default().fg(theme.success)),
        Some(false) => Span::styled("○", Style::default().fg(theme.error)),
        None => Span::styled("○", theme.style_muted()),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        bulb,
        Span::raw(" "),
        Span::styled(mode.keys(), theme.style_muted()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect, theme: &Theme) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(theme.separator),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_keys_bar_shows_mode() {
        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|f| draw_keys_bar(f, f.area(), Mode::Results, Some(true), &theme))
            .unwrap();
        let row: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(row.starts_with(" RESULTS ●"));
    }
}
