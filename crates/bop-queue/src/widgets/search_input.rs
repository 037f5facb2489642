//! SearchInput — tui-input line for the query grammar.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::Theme;

pub enum InputAction {
    /// Enter pressed; carries the raw text.
    Submitted(String),
    Cancelled,
    Edited,
}

pub struct SearchInput {
    input: Input,
    active: bool,
    placeholder: String,
}

impl SearchInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Esc closes the input but keeps the text for the next `/`.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Esc => {
                self.deactivate();
                InputAction::Cancelled
            }
            KeyCode::Enter => {
                self.deactivate();
                InputAction::Submitted(self.input.value().to_string())
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                InputAction::Edited
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(4) as usize);
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(format!("/ {}", self.placeholder), theme.style_muted())
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", visible), theme.style_input())
        };

        let paragraph = Paragraph::new(Line::from(vec![display])).style(theme.style_input());
        frame.render_widget(paragraph, area);

        if self.active {
            let cursor_x = area.x + 2 + self.input.visual_cursor().saturating_sub(scroll) as u16;
            let max_x = area.x + area.width.saturating_sub(1);
            frame.set_cursor_position((cursor_x.min(max_x), area.y));
        }
    }
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new("from:\"playlist\" by:artist song")
    }
}
