//! Smooth Unicode progress bar with elapsed / remaining labels.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::clock::{format_mmss, PlaybackClock};
use crate::theme::Theme;

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render `clock` as `mm:ss ██████▍     mm:ss` (elapsed left, remaining right).
pub fn draw_progress(frame: &mut Frame, area: Rect, clock: &PlaybackClock, theme: &Theme) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    let left_label = format_mmss(clock.current());
    let right_label = format_mmss(clock.remaining());
    let label_w = (left_label.len() + right_label.len() + 2) as u16;
    let bar_w = area.width.saturating_sub(label_w).max(4) as usize;

    let spans = vec![
        Span::styled(format!("{} ", left_label), theme.style_secondary()),
        Span::styled(bar(clock.progress(), bar_w), theme.style_playing()),
        Span::styled(format!(" {}", right_label), theme.style_muted()),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// `width` cells, filled in eighths.
fn bar(progress: f64, width: usize) -> String {
    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..full_blocks {
        bar.push('█');
    }
    if full_blocks < width {
        bar.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            bar.push(' ');
        }
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_width_constant() {
        for p in [0.0, 0.33, 0.5, 0.99, 1.0] {
            assert_eq!(bar(p, 10).chars().count(), 10, "progress {}", p);
        }
    }

    #[test]
    fn test_bar_fill() {
        assert_eq!(bar(1.0, 4), "████");
        assert_eq!(bar(0.5, 4), "██  ");
        assert_eq!(bar(0.0, 3), "   ");
    }
}
