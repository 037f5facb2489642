//! Reconciliation reactor.
//!
//! Single owner of the queue snapshot. Every input, from key presses to
//! worker results, arrives as a `Message`; `update` handles one at a time and
//! returns the `Effect`s the runtime should perform. Nothing in here spawns,
//! sleeps or awaits.

mod search;
mod view;

use std::collections::HashSet;
use std::time::Duration;

use bop_proto::gateway::GatewayError;
use bop_proto::protocol::{self, QueueItem};
use bop_proto::query;
use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::assets::{AssetBatch, AssetSettings};
use crate::clock::PlaybackClock;
use crate::message::{Effect, Message};
use crate::widgets::paged_list::PagedList;
use crate::widgets::search_input::{InputAction, SearchInput};
use crate::widgets::status_bar::Mode;
use crate::widgets::toast::ToastManager;

use search::{SearchOutcome, SearchState};

/// Subtracted from the tallest cover when sizing rows. Empirical: covers
/// carry one line more than the row needs to stay aligned.
pub const ROW_HEIGHT_ADJUST: u16 = 1;
pub const MIN_ROW_HEIGHT: u16 = 2;
/// Row height before any batch has completed.
pub const DEFAULT_ROW_HEIGHT: u16 = 5;
/// Blank rows between queue items.
pub const ITEM_SPACING: u16 = 1;
/// Floor for the self-refresh timer. Departs on purpose from a plain zero
/// clamp: a track already at its end waits this long before reloading
/// instead of reloading in a tight loop.
pub const MIN_REFRESH_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Queue,
    Results,
}

pub struct ReactorState {
    pub queue: PagedList<QueueItem>,
    pub error: Option<String>,
    pub loading: bool,
    pub width: u16,
    pub height: u16,
    /// Identifies the latest armed refresh timer.
    pub refresh_token: u64,
    /// Identifies the snapshot asset completions must belong to.
    pub generation: u64,
    pub row_height: u16,
    /// Present while the first item is playing.
    pub clock: Option<PlaybackClock>,
    /// Ids of the current batch still waiting for their asset.
    pending: HashSet<String>,
}

impl ReactorState {
    fn new() -> Self {
        Self {
            queue: PagedList::new(1),
            error: None,
            loading: true,
            width: 0,
            height: 0,
            refresh_token: 0,
            generation: 0,
            row_height: DEFAULT_ROW_HEIGHT,
            clock: None,
            pending: HashSet::new(),
        }
    }
}

pub struct Reactor {
    pub state: ReactorState,
    reload_tx: mpsc::Sender<()>,
    settings: AssetSettings,
    search: SearchState,
    input: SearchInput,
    toasts: ToastManager,
    view: View,
    help_visible: bool,
    /// Screen rect of each item drawn last frame, by list index.
    item_bounds: Vec<(usize, Rect)>,
    server_up: Option<bool>,
    should_quit: bool,
}

impl Reactor {
    pub fn new(reload_tx: mpsc::Sender<()>, settings: AssetSettings) -> Self {
        Self {
            state: ReactorState::new(),
            reload_tx,
            settings,
            search: SearchState::new(),
            input: SearchInput::default(),
            toasts: ToastManager::new(),
            view: View::Queue,
            help_visible: false,
            item_bounds: Vec::new(),
            server_up: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn mode(&self) -> Mode {
        if self.input.is_active() {
            Mode::Search
        } else if self.view == View::Results {
            Mode::Results
        } else {
            Mode::Queue
        }
    }

    pub fn update(&mut self, msg: Message) -> Vec<Effect> {
        match msg {
            Message::Key(key) => self.on_key(key),
            Message::Mouse(mouse) => self.on_mouse(mouse),
            Message::Resize(w, h) => self.on_resize(w, h),
            Message::Tick => self.on_tick(),
            Message::RefreshDue { token } => self.on_refresh_due(token),
            Message::QueueLoaded(result) => self.on_queue_loaded(result),
            Message::AssetLoaded {
                generation,
                id,
                asset,
            } => self.on_asset_loaded(generation, id, asset),
            Message::BatchComplete { generation } => self.on_batch_complete(generation),
            Message::SearchLoaded { request, result } => self.on_search_loaded(request, result),
            Message::Enqueued(result) => self.on_enqueued(result),
            Message::Health(result) => self.on_health(result),
        }
    }

    /// Ask the dispatcher for a fresh snapshot and return immediately.
    pub fn trigger_reload(&mut self) {
        self.state.loading = true;
        self.state.error = None;
        self.state.generation += 1;
        self.state.refresh_token += 1;
        self.state.pending.clear();
        match self.reload_tx.try_send(()) {
            Ok(()) => debug!("reload requested (generation {})", self.state.generation),
            Err(TrySendError::Full(())) => debug!("reload already pending, coalesced"),
            Err(TrySendError::Closed(())) => warn!("reload dispatcher is gone"),
        }
    }

    // ── Fetch results ─────────────────────────────────────────────────────────

    fn on_queue_loaded(&mut self, result: Result<Vec<QueueItem>, GatewayError>) -> Vec<Effect> {
        let mut items = match result {
            Ok(items) => items,
            Err(e) => {
                warn!("queue fetch failed: {}", e);
                self.state.loading = false;
                self.state.error = Some(e.to_string());
                return vec![];
            }
        };

        if !protocol::is_well_ordered(&items) {
            warn!("queue snapshot has a playing item out of place; clearing it");
            for item in items.iter_mut().skip(1) {
                item.is_playing = false;
            }
        }
        self.state.generation += 1;
        self.state.loading = false;
        self.state.error = None;
        info!(
            "queue snapshot: {} items (generation {})",
            items.len(),
            self.state.generation
        );

        self.state.clock = match items.first() {
            Some(first) if first.is_playing => {
                let mut clock = self.state.clock.unwrap_or_else(|| {
                    PlaybackClock::new(first.current_second, first.total_seconds)
                });
                clock.resync(first.current_second, first.total_seconds);
                Some(clock)
            }
            _ => None,
        };
        self.state.pending = items.iter().map(|item| item.id.clone()).collect();
        self.state.queue.set_items(items);

        let generation = self.state.generation;
        if self.state.queue.is_empty() {
            return vec![Effect::Emit(Message::BatchComplete { generation })];
        }
        vec![Effect::LoadAssets(AssetBatch {
            generation,
            items: self.state.queue.items().to_vec(),
            width_hint: self.state.width,
        })]
    }

    fn on_asset_loaded(&mut self, generation: u64, id: String, asset: String) -> Vec<Effect> {
        if generation != self.state.generation {
            debug!(
                "dropping asset for {} from generation {} (current {})",
                id, generation, self.state.generation
            );
            return vec![];
        }
        for item in self.state.queue.items_mut().iter_mut().filter(|i| i.id == id) {
            item.cover = asset.clone();
        }
        if self.state.pending.remove(&id) && self.state.pending.is_empty() {
            return vec![Effect::Emit(Message::BatchComplete { generation })];
        }
        vec![]
    }

    fn on_batch_complete(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.state.generation {
            debug!("dropping batch-complete for generation {}", generation);
            return vec![];
        }
        self.state.row_height = row_height_for(self.state.queue.items());
        self.relayout();

        let Some(clock) = self.state.clock else {
            return vec![];
        };
        self.state.refresh_token += 1;
        let after = Duration::from_secs(clock.remaining() as u64).max(MIN_REFRESH_DELAY);
        debug!(
            "refresh #{} armed for {:?}",
            self.state.refresh_token, after
        );
        vec![Effect::ArmRefresh {
            token: self.state.refresh_token,
            after,
        }]
    }

    fn on_refresh_due(&mut self, token: u64) -> Vec<Effect> {
        if token != self.state.refresh_token {
            debug!("ignoring stale refresh #{}", token);
            return vec![];
        }
        self.trigger_reload();
        vec![]
    }

    fn on_search_loaded(
        &mut self,
        request: u64,
        result: Result<Vec<QueueItem>, GatewayError>,
    ) -> Vec<Effect> {
        match self.search.accept(request, result) {
            SearchOutcome::Stale => {}
            SearchOutcome::Loaded(0) => self.toasts.info("no results"),
            SearchOutcome::Loaded(_) => {}
            SearchOutcome::Exhausted => self.toasts.info("no more results"),
            SearchOutcome::Failed(e) => {
                warn!("search failed: {}", e);
                self.toasts.error(e);
            }
        }
        vec![]
    }

    fn on_enqueued(&mut self, result: Result<usize, GatewayError>) -> Vec<Effect> {
        match result {
            Ok(count) => {
                let noun = if count == 1 { "track" } else { "tracks" };
                self.toasts.success(format!("queued {} {}", count, noun));
                self.trigger_reload();
            }
            Err(e) => {
                warn!("enqueue failed: {}", e);
                self.toasts.error(e.to_string());
            }
        }
        vec![]
    }

    fn on_health(&mut self, result: Result<(), GatewayError>) -> Vec<Effect> {
        match result {
            Ok(()) => self.server_up = Some(true),
            Err(e) => {
                self.server_up = Some(false);
                self.toasts.warning(e.to_string());
            }
        }
        vec![]
    }

    // ── Terminal input ────────────────────────────────────────────────────────

    fn on_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return self.quit();
        }

        if self.input.is_active() {
            return match self.input.handle_key(key) {
                InputAction::Submitted(text) => self.submit_search(&text),
                InputAction::Cancelled | InputAction::Edited => vec![],
            };
        }

        if self.help_visible {
            if matches!(
                key.code,
                KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc
            ) {
                self.help_visible = false;
            }
            return vec![];
        }

        match key.code {
            KeyCode::Char('q') => return self.quit(),
            KeyCode::Char('?') => self.help_visible = true,
            KeyCode::Char('r') => self.trigger_reload(),
            KeyCode::Char('/') => self.input.activate(),
            KeyCode::Up | KeyCode::Char('k') => self.active_list().cursor_up(),
            KeyCode::Down | KeyCode::Char('j') => self.active_list().cursor_down(),
            KeyCode::Left | KeyCode::Char('h') => self.active_list().prev_page(),
            KeyCode::Right | KeyCode::Char('l') => self.active_list().next_page(),
            _ if self.view == View::Results => return self.on_results_key(key.code),
            _ => {}
        }
        vec![]
    }

    fn on_results_key(&mut self, code: KeyCode) -> Vec<Effect> {
        match code {
            KeyCode::Esc => self.view = View::Queue,
            KeyCode::Enter => {
                if let Some(item) = self.search.results.selected_item() {
                    return vec![Effect::Enqueue(vec![item.id.clone()])];
                }
            }
            KeyCode::Char('a') => {
                let ids = self.search.page_ids();
                if !ids.is_empty() {
                    return vec![Effect::Enqueue(ids)];
                }
            }
            KeyCode::Char('n') => return self.search.turn_page(1).into_iter().collect(),
            KeyCode::Char('p') => return self.search.turn_page(-1).into_iter().collect(),
            _ => {}
        }
        vec![]
    }

    fn submit_search(&mut self, text: &str) -> Vec<Effect> {
        if text.is_empty() {
            debug!("empty query, clearing results");
            self.search.clear();
            self.view = View::Results;
            return vec![];
        }
        match query::parse(text) {
            Ok(filter) => {
                self.view = View::Results;
                vec![self.search.begin(filter)]
            }
            Err(e) => {
                debug!("query {:?} rejected: {}", text, e);
                self.toasts.error(e.to_string());
                vec![]
            }
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) -> Vec<Effect> {
        if self.help_visible {
            return vec![];
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => self.active_list().scroll_up(),
            MouseEventKind::ScrollDown => self.active_list().scroll_down(),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.hit_test(mouse.column, mouse.row) {
                    self.active_list().select(index);
                }
            }
            _ => {}
        }
        vec![]
    }

    fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        let pos = Position::new(column, row);
        self.item_bounds
            .iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(index, _)| *index)
    }

    fn on_resize(&mut self, width: u16, height: u16) -> Vec<Effect> {
        self.state.width = width;
        self.state.height = height;
        self.relayout();
        vec![]
    }

    fn on_tick(&mut self) -> Vec<Effect> {
        self.toasts.tick();
        if let Some(clock) = self.state.clock.as_mut() {
            clock.advance();
        }
        vec![]
    }

    // ── helpers ───────────────────────────────────────────────────────────────

    fn quit(&mut self) -> Vec<Effect> {
        self.should_quit = true;
        vec![Effect::Quit]
    }

    fn active_list(&mut self) -> &mut PagedList<QueueItem> {
        match self.view {
            View::Queue => &mut self.state.queue,
            View::Results => &mut self.search.results,
        }
    }

    /// Page sizes follow the terminal height and the current row height.
    fn relayout(&mut self) {
        let list_height = view::list_height(self.state.height);
        let row = self.state.row_height + ITEM_SPACING;
        self.state
            .queue
            .set_per_page(((list_height + ITEM_SPACING) / row) as usize);
        self.search.results.set_per_page(list_height as usize);
    }
}

/// Shared row height: tallest non-empty cover minus `ROW_HEIGHT_ADJUST`.
pub fn row_height_for(items: &[QueueItem]) -> u16 {
    items
        .iter()
        .filter(|item| !item.cover.is_empty())
        .map(|item| item.cover.lines().count() as u16)
        .max()
        .map(|tallest| tallest.saturating_sub(ROW_HEIGHT_ADJUST).max(MIN_ROW_HEIGHT))
        .unwrap_or(DEFAULT_ROW_HEIGHT)
}
