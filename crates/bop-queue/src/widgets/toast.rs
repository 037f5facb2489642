//! Toast notifications — transient status messages in the bottom-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            max_visible: 3,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, duration: Duration) {
        let msg = message.into();
        self.toasts.retain(|t| t.message != msg);
        self.toasts.push_back(Toast {
            message: msg,
            severity,
            expires: Instant::now() + duration,
        });
        while self.toasts.len() > self.max_visible * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info, Duration::from_secs(3));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success, Duration::from_secs(3));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning, Duration::from_secs(4));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error, Duration::from_secs(5));
    }

    /// Drop expired toasts.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
    }

    /// Newest last.
    #[cfg(test)]
    pub fn messages(&self) -> impl Iterator<Item = (&str, Severity)> {
        self.toasts.iter().map(|t| (t.message.as_str(), t.severity))
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let visible: Vec<&Toast> = self.toasts.iter().rev().take(self.max_visible).collect();
        for (i, toast) in visible.iter().enumerate() {
            let (icon, color) = match toast.severity {
                Severity::Info => ("i", theme.secondary),
                Severity::Success => ("✓", theme.success),
                Severity::Warning => ("!", theme.warning),
                Severity::Error => ("✗", theme.error),
            };
            let text = format!(" {} {} ", icon, toast.message);
            let width = (unicode_width::UnicodeWidthStr::width(text.as_str()) as u16)
                .min(area.width);
            let y = area.y + area.height.saturating_sub(2 + i as u16);
            if width == 0 {
                continue;
            }
            let rect = Rect {
                x: area.x + area.width.saturating_sub(width + 1),
                y,
                width,
                height: 1,
            };
            frame.render_widget(Clear, rect);
            let line = Line::from(Span::styled(
                text,
                Style::default()
                    .fg(color)
                    .bg(theme.selection_bg)
                    .add_modifier(Modifier::BOLD),
            ));
            frame.render_widget(Paragraph::new(line), rect);
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_cap() {
        let mut t = ToastManager::new();
        t.info("a");
        t.info("a");
        assert_eq!(t.messages().count(), 1);
        for i in 0..20 {
            t.info(format!("m{}", i));
        }
        assert_eq!(t.messages().count(), 6);
        assert_eq!(t.messages().last().map(|(m, _)| m), Some("m19"));
    }

    #[test]
    fn test_expiry() {
        let mut t = ToastManager::new();
        t.push("gone", Severity::Info, Duration::ZERO);
        t.error("stays");
        t.tick();
        let left: Vec<_> = t.messages().collect();
        assert_eq!(left, vec![("stays", Severity::Error)]);
    }
}
