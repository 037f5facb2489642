//! Color palettes and styles.
//!
//! A `Theme` is resolved once at startup from the config and handed to every
//! draw function by reference.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub playing: Color,
    pub liked: Color,
    pub muted: Color,
    pub error: Color,
    pub warning: Color,
    pub success: Color,
    pub selection_bg: Color,
    pub separator: Color,
    pub input_bg: Color,
    pub input_fg: Color,
}

impl Theme {
    pub fn kanagawa_dragon() -> Self {
        Self {
            name: "kanagawa-dragon",
            primary: Color::Rgb(197, 201, 197),
            secondary: Color::Rgb(166, 166, 156),
            accent: Color::Rgb(196, 116, 110),
            playing: Color::Rgb(135, 169, 135),
            liked: Color::Rgb(196, 116, 110),
            muted: Color::Rgb(115, 124, 115),
            error: Color::Rgb(196, 116, 110),
            warning: Color::Rgb(196, 178, 138),
            success: Color::Rgb(135, 169, 135),
            selection_bg: Color::Rgb(40, 39, 39),
            separator: Color::Rgb(57, 55, 55),
            input_bg: Color::Rgb(24, 22, 22),
            input_fg: Color::Rgb(196, 178, 138),
        }
    }

    /// For terminals without truecolor.
    pub fn mono() -> Self {
        Self {
            name: "mono",
            primary: Color::White,
            secondary: Color::Gray,
            accent: Color::White,
            playing: Color::White,
            liked: Color::White,
            muted: Color::DarkGray,
            error: Color::White,
            warning: Color::Gray,
            success: Color::Gray,
            selection_bg: Color::Reset,
            separator: Color::DarkGray,
            input_bg: Color::Reset,
            input_fg: Color::White,
        }
    }

    /// Unknown names fall back to the default palette.
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "kanagawa-dragon" | "kanagawa" | "" => Self::kanagawa_dragon(),
            "mono" => Self::mono(),
            other => {
                tracing::warn!("unknown theme {:?}, using kanagawa-dragon", other);
                Self::kanagawa_dragon()
            }
        }
    }

    pub fn style_default(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn style_secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn style_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn style_title(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn style_playing(&self) -> Style {
        Style::default()
            .fg(self.playing)
            .add_modifier(Modifier::BOLD)
    }

    pub fn style_selected(&self) -> Style {
        Style::default().bg(self.selection_bg).fg(self.accent)
    }

    pub fn style_error(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn style_input(&self) -> Style {
        Style::default().fg(self.input_fg).bg(self.input_bg)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::kanagawa_dragon()
    }
}
