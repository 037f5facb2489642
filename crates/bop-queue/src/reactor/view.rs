//! Rendering of the reactor state. Every frame is drawn from scratch.

use std::borrow::Cow;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};

use super::{Reactor, View, ITEM_SPACING};
use crate::assets::cover_columns;
use crate::theme::Theme;
use crate::widgets::help_overlay::draw_help;
use crate::widgets::paged_list::pagination_dots;
use crate::widgets::progress_bar::draw_progress;
use crate::widgets::status_bar::{draw_keys_bar, draw_separator};

/// Title, artist, progress, separator.
const NOW_PLAYING_HEIGHT: u16 = 4;
/// Pagination dots, search input, keys bar.
const FOOTER_HEIGHT: u16 = 3;

/// Rows left for list items on a terminal `height` rows tall.
pub(super) fn list_height(height: u16) -> u16 {
    height.saturating_sub(NOW_PLAYING_HEIGHT + FOOTER_HEIGHT)
}

impl Reactor {
    pub fn draw(&mut self, frame: &mut Frame, theme: &Theme) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(NOW_PLAYING_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);
        let (header, list, dots, input, keys) = (rows[0], rows[1], rows[2], rows[3], rows[4]);

        match self.view {
            View::Queue => {
                let body = header.union(list);
                if let Some(err) = &self.state.error {
                    draw_centered(
                        frame,
                        body,
                        vec![
                            Line::from(Span::styled(err.clone(), theme.style_error())),
                            Line::from(""),
                            Line::from(Span::styled("press r to retry", theme.style_muted())),
                        ],
                    );
                    self.item_bounds.clear();
                } else if self.state.loading {
                    draw_centered_text(frame, body, "Loading...", theme.style_secondary());
                    self.item_bounds.clear();
                } else if self.state.queue.is_empty() {
                    draw_centered_text(frame, body, "Queue empty", theme.style_secondary());
                    self.item_bounds.clear();
                } else {
                    self.draw_now_playing(frame, header, theme);
                    self.item_bounds = self.draw_queue(frame, list, theme);
                    let queue = &self.state.queue;
                    let page = pagination_dots(queue.page(), queue.total_pages());
                    draw_centered_text(frame, dots, page, theme.style_muted());
                }
            }
            View::Results => {
                self.draw_now_playing(frame, header, theme);
                self.item_bounds = self.draw_results(frame, list, theme);
                let results = &self.search.results;
                let page = format!(
                    "{}   page {} · {} results",
                    pagination_dots(results.page(), results.total_pages()),
                    self.search.page() + 1,
                    results.len()
                );
                draw_centered_text(frame, dots, page, theme.style_muted());
            }
        }

        if self.input.is_active() || self.view == View::Results {
            self.input.draw(frame, input, theme);
        }
        draw_keys_bar(frame, keys, self.mode(), self.server_up, theme);
        self.toasts.draw(frame, area, theme);

        if self.help_visible {
            draw_help(frame, area, theme);
        }
    }

    fn draw_now_playing(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1); 4])
            .split(area);

        match (self.state.queue.items().first(), self.state.clock) {
            (Some(item), Some(clock)) if item.is_playing => {
                let mut title = vec![
                    Span::styled(" ▶ ", theme.style_playing()),
                    Span::styled(item.name.clone(), theme.style_title()),
                ];
                if item.liked {
                    title.push(Span::styled(" ♥", Style::default().fg(theme.liked)));
                }
                if clock.is_finished() {
                    title.push(Span::styled("  waiting for server", theme.style_muted()));
                }
                frame.render_widget(Paragraph::new(Line::from(title)), rows[0]);
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(
                        format!("   {}", item.artist),
                        theme.style_secondary(),
                    ))),
                    rows[1],
                );
                let bar = Rect {
                    x: rows[2].x + 1,
                    width: rows[2].width.saturating_sub(2),
                    ..rows[2]
                };
                draw_progress(frame, bar, &clock, theme);
            }
            _ => {
                frame.render_widget(
                    Paragraph::new(Span::styled(" nothing playing", theme.style_muted())),
                    rows[0],
                );
            }
        }
        draw_separator(frame, rows[3], theme);
    }

    /// Draw the cursor's page of the queue. Returns the bounds of each row.
    fn draw_queue(&self, frame: &mut Frame, area: Rect, theme: &Theme) -> Vec<(usize, Rect)> {
        let row_height = self.state.row_height;
        let columns = cover_columns(self.state.width, self.settings.width_divisor) as u16;
        let cover_width = (columns + 2).min(area.width);
        let selected = self.state.queue.selected();
        let bottom = area.y + area.height;

        let mut bounds = Vec::new();
        let mut y = area.y;
        for (index, item) in self.state.queue.page_items() {
            if y + row_height > bottom {
                break;
            }
            let row = Rect::new(area.x, y, area.width, row_height);
            let is_selected = index == selected;
            if is_selected {
                frame.render_widget(Block::default().style(theme.style_selected()), row);
            }

            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(cover_width), Constraint::Min(0)])
                .split(row);

            let cover: Vec<Line> = if item.cover.is_empty() {
                vec![Line::from(Span::styled("  ♪", theme.style_muted()))]
            } else {
                item.cover
                    .lines()
                    .take(row_height as usize)
                    .map(|l| Line::from(format!(" {}", l)))
                    .collect()
            };
            frame.render_widget(Paragraph::new(cover).style(theme.style_muted()), cols[0]);

            let gutter = if is_selected { "▌ " } else { "  " };
            let name_style = if item.is_playing {
                theme.style_playing()
            } else {
                theme.style_title()
            };
            let mut name = vec![
                Span::styled(gutter, Style::default().fg(theme.accent)),
                Span::styled(item.name.clone(), name_style),
            ];
            if item.is_playing {
                name.push(Span::styled("  now playing", theme.style_muted()));
            }
            let mut meta = vec![
                Span::raw("  "),
                Span::styled(item.duration.clone(), theme.style_muted()),
            ];
            if item.liked {
                meta.push(Span::styled(" ♥", Style::default().fg(theme.liked)));
            }
            let text = vec![
                Line::from(name),
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(item.artist.clone(), theme.style_secondary()),
                ]),
                Line::from(meta),
            ];
            frame.render_widget(Paragraph::new(text), cols[1]);

            bounds.push((index, row));
            y += row_height + ITEM_SPACING;
        }
        bounds
    }

    fn draw_results(&self, frame: &mut Frame, area: Rect, theme: &Theme) -> Vec<(usize, Rect)> {
        let results = &self.search.results;
        if results.is_empty() {
            let text = if self.search.in_flight() {
                "Searching..."
            } else {
                "No results"
            };
            draw_centered_text(frame, area, text, theme.style_secondary());
            return Vec::new();
        }

        let selected = results.selected();
        let mut bounds = Vec::new();
        for (offset, (index, item)) in results.page_items().into_iter().enumerate() {
            let y = area.y + offset as u16;
            if y >= area.y + area.height {
                break;
            }
            let row = Rect::new(area.x, y, area.width, 1);
            let (gutter, style) = if index == selected {
                ("▌ ", theme.style_selected())
            } else {
                ("  ", theme.style_default())
            };
            let line = Line::from(vec![
                Span::styled(gutter, Style::default().fg(theme.accent)),
                Span::styled(item.name.clone(), style),
                Span::styled(format!("  {}", item.artist), theme.style_secondary()),
                Span::styled(format!("  {}", item.duration), theme.style_muted()),
            ]);
            frame.render_widget(Paragraph::new(line), row);
            bounds.push((index, row));
        }
        bounds
    }
}

fn draw_centered_text<'a>(
    frame: &mut Frame,
    area: Rect,
    text: impl Into<Cow<'a, str>>,
    style: Style,
) {
    draw_centered(frame, area, vec![Line::from(Span::styled(text, style))]);
}

/// Lines centered both ways inside `area`.
fn draw_centered(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let height = (lines.len() as u16).min(area.height);
    let y = area.y + area.height.saturating_sub(height) / 2;
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        Rect::new(area.x, y, area.width, height),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetSettings;
    use crate::message::Message;
    use bop_proto::gateway::GatewayError;
    use bop_proto::protocol::QueueItem;
    use ratatui::crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn reactor(width: u16, height: u16) -> (Reactor, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let mut r = Reactor::new(
            tx,
            AssetSettings {
                width_divisor: 3,
                concurrency: 2,
            },
        );
        r.update(Message::Resize(width, height));
        (r, rx)
    }

    fn render(r: &mut Reactor, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let theme = Theme::default();
        terminal.draw(|f| r.draw(f, &theme)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn item(id: &str, name: &str) -> QueueItem {
        QueueItem {
            id: id.into(),
            name: name.into(),
            artist: "someone".into(),
            duration: "3:00".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_loading_view() {
        let (mut r, _rx) = reactor(60, 20);
        let screen = render(&mut r, 60, 20);
        assert!(screen.contains("Loading..."));
    }

    #[test]
    fn test_error_view_takes_precedence() {
        let (mut r, _rx) = reactor(60, 20);
        r.update(Message::QueueLoaded(Err(GatewayError::ServerDown)));
        let screen = render(&mut r, 60, 20);
        assert!(screen.contains("server is down!"));
        assert!(!screen.contains("Loading..."));
    }

    #[test]
    fn test_empty_queue_view() {
        let (mut r, _rx) = reactor(60, 20);
        r.update(Message::QueueLoaded(Ok(vec![])));
        let screen = render(&mut r, 60, 20);
        assert!(screen.contains("Queue empty"));
    }

    #[test]
    fn test_queue_view_lists_items_and_header() {
        let (mut r, _rx) = reactor(80, 30);
        let first = QueueItem {
            is_playing: true,
            current_second: 175,
            total_seconds: 180,
            ..item("a", "Red Right Hand")
        };
        r.update(Message::QueueLoaded(Ok(vec![first, item("b", "Into My Arms")])));
        let screen = render(&mut r, 80, 30);
        assert!(screen.contains("Red Right Hand"));
        assert!(screen.contains("Into My Arms"));
        assert!(screen.contains("02:55"));
        assert!(screen.contains("00:05"));
        assert_eq!(r.item_bounds.len(), 2);
    }

    #[test]
    fn test_misplaced_playing_item_not_tagged() {
        let (mut r, _rx) = reactor(80, 30);
        let late = QueueItem {
            is_playing: true,
            current_second: 10,
            total_seconds: 180,
            ..item("b", "Into My Arms")
        };
        r.update(Message::QueueLoaded(Ok(vec![item("a", "Red Right Hand"), late])));
        let screen = render(&mut r, 80, 30);
        assert!(screen.contains("nothing playing"));
        assert!(!screen.contains("now playing"));
    }

    #[test]
    fn test_click_after_render_selects_row() {
        let (mut r, _rx) = reactor(80, 30);
        r.update(Message::QueueLoaded(Ok(vec![item("a", "one"), item("b", "two")])));
        render(&mut r, 80, 30);
        let (_, second) = r.item_bounds[1];
        r.update(Message::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: second.x + 3,
            row: second.y,
            modifiers: KeyModifiers::NONE,
        }));
        assert_eq!(r.state.queue.selected(), 1);
    }

    #[test]
    fn test_pages_follow_height() {
        let (mut r, _rx) = reactor(80, 19);
        let items = (0..5).map(|i| item(&i.to_string(), "x")).collect();
        r.update(Message::QueueLoaded(Ok(items)));
        // 12 list rows, 5-row items plus one spacer
        assert_eq!(r.state.queue.page_items().len(), 2);
        render(&mut r, 80, 19);
        assert_eq!(r.item_bounds.len(), 2);
        let screen = render(&mut r, 80, 19);
        assert!(screen.contains("● ○ ○"));
    }
}
