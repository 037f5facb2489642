//! Message and Effect enums: everything flowing into and out of the reactor.

use std::time::Duration;

use bop_proto::gateway::GatewayError;
use bop_proto::protocol::QueueItem;
use bop_proto::query::QueryFilter;
use ratatui::crossterm::event::{Event, KeyEvent, MouseEvent};

use crate::assets::AssetBatch;

/// All inputs to the reactor. Terminal events, timers and worker results
/// arrive through the same inbox and are handled one at a time.
#[derive(Debug)]
pub enum Message {
    // ── Terminal ─────────────────────────────────────────────────────────────
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),

    // ── Timers ───────────────────────────────────────────────────────────────
    /// One second of playback elapsed.
    Tick,
    /// Self-refresh timer fired. Ignored unless `token` is the latest armed.
    RefreshDue { token: u64 },

    // ── Workers ──────────────────────────────────────────────────────────────
    QueueLoaded(Result<Vec<QueueItem>, GatewayError>),
    AssetLoaded {
        generation: u64,
        id: String,
        asset: String,
    },
    /// Every item of batch `generation` has reported back.
    BatchComplete { generation: u64 },
    SearchLoaded {
        request: u64,
        result: Result<Vec<QueueItem>, GatewayError>,
    },
    Enqueued(Result<usize, GatewayError>),
    Health(Result<(), GatewayError>),
}

impl Message {
    /// Terminal events the reactor cares about. Focus and paste are dropped.
    pub fn from_event(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) => Some(Self::Key(key)),
            Event::Mouse(mouse) => Some(Self::Mouse(mouse)),
            Event::Resize(w, h) => Some(Self::Resize(w, h)),
            _ => None,
        }
    }
}

/// Work the reactor asks the runtime to do. The reactor never spawns or
/// awaits anything itself.
#[derive(Debug)]
pub enum Effect {
    /// Render covers for a fresh snapshot.
    LoadAssets(AssetBatch),
    /// Post `RefreshDue { token }` after `after`.
    ArmRefresh { token: u64, after: Duration },
    /// Handle a message right away, before any other effect and the next
    /// redraw.
    Emit(Message),
    Search { request: u64, filter: QueryFilter },
    Enqueue(Vec<String>),
    Quit,
}
