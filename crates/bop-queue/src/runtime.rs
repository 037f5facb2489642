//! Terminal driver: owns the inbox, the timers and the worker tasks, and
//! feeds everything through `Reactor::update` one message at a time.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use bop_proto::gateway::GatewayClient;
use bop_proto::query::QueryFilter;
use ratatui::crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::assets::{self, AssetBatch, AssetSettings};
use crate::message::{Effect, Message};
use crate::reactor::Reactor;
use crate::theme::Theme;

/// Upper bound on messages handled between two redraws.
const MAX_DRAIN: usize = 256;
const EVENT_POLL: Duration = Duration::from_millis(250);
/// One playback second. Refresh timers count the same seconds.
const CLOCK_TICK: Duration = Duration::from_secs(1);

pub struct RuntimeOptions {
    pub settings: AssetSettings,
    pub mouse: bool,
}

pub async fn run(
    client: GatewayClient,
    theme: Theme,
    options: RuntimeOptions,
) -> anyhow::Result<()> {
    debug!("run(): enabling raw mode");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if options.mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::channel::<Message>(1024);
    // Capacity 1: triggers that arrive while one is pending coalesce.
    let (reload_tx, reload_rx) = mpsc::channel::<()>(1);
    let mut reactor = Reactor::new(reload_tx, options.settings);

    // ── Background task: keyboard/mouse events ────────────────────────────────
    let event_tx = tx.clone();
    tokio::task::spawn_blocking(move || {
        // Polling lets the thread notice the inbox closing on shutdown.
        while !event_tx.is_closed() {
            match event::poll(EVENT_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    warn!("terminal event poll failed: {}", e);
                    break;
                }
            }
            match event::read() {
                Ok(ev) => {
                    let Some(msg) = Message::from_event(ev) else {
                        continue;
                    };
                    if event_tx.blocking_send(msg).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("terminal event read failed: {}", e);
                    break;
                }
            }
        }
    });

    // ── Background task: reload dispatcher ────────────────────────────────────
    tokio::spawn(dispatch_reloads(client.clone(), reload_rx, tx.clone()));

    // ── Startup probe ─────────────────────────────────────────────────────────
    let health_client = client.clone();
    let health_tx = tx.clone();
    tokio::spawn(async move {
        let result = health_client.health().await;
        let _ = health_tx.send(Message::Health(result)).await;
    });

    let size = terminal.size()?;
    reactor.update(Message::Resize(size.width, size.height));
    reactor.trigger_reload();

    let mut tick = tokio::time::interval_at(Instant::now() + CLOCK_TICK, CLOCK_TICK);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctx = EffectContext {
        client,
        tx,
        settings: options.settings,
    };

    // ── Main loop ─────────────────────────────────────────────────────────────
    loop {
        terminal.draw(|f| reactor.draw(f, &theme))?;

        if reactor.should_quit() {
            break;
        }

        tokio::select! {
            Some(msg) = rx.recv() => {
                process(&mut reactor, &ctx, msg);
                let mut drained = 0usize;
                while drained < MAX_DRAIN {
                    let Ok(next) = rx.try_recv() else {
                        break;
                    };
                    drained += 1;
                    process(&mut reactor, &ctx, next);
                }
            }

            _ = tick.tick() => {
                process(&mut reactor, &ctx, Message::Tick);
            }
        }

        if reactor.should_quit() {
            break;
        }
    }

    // ── Teardown ──────────────────────────────────────────────────────────────
    info!("shutting down");
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

/// Best-effort terminal restore for the panic hook.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

/// Forward each reload signal into one queue fetch. Fetches run one after
/// another; signals raised meanwhile wait in the channel.
async fn dispatch_reloads(
    client: GatewayClient,
    mut reload_rx: mpsc::Receiver<()>,
    tx: mpsc::Sender<Message>,
) {
    while reload_rx.recv().await.is_some() {
        let result = client.fetch_queue().await;
        if let Err(e) = &result {
            debug!("[reload] fetch failed: {}", e);
        }
        if tx.send(Message::QueueLoaded(result)).await.is_err() {
            break;
        }
    }
    debug!("[reload] dispatcher stopped");
}

struct EffectContext {
    client: GatewayClient,
    tx: mpsc::Sender<Message>,
    settings: AssetSettings,
}

/// Background work left once emitted messages have been handled.
#[derive(Debug)]
enum Job {
    LoadAssets(AssetBatch),
    ArmRefresh { token: u64, after: Duration },
    Search { request: u64, filter: QueryFilter },
    Enqueue(Vec<String>),
}

fn process(reactor: &mut Reactor, ctx: &EffectContext, msg: Message) {
    for job in settle(reactor, msg) {
        spawn_job(ctx, job);
    }
}

/// Run `msg` and every message it emits through the reactor, oldest first,
/// and collect the work to start.
fn settle(reactor: &mut Reactor, msg: Message) -> Vec<Job> {
    let mut backlog = VecDeque::from([msg]);
    let mut jobs = Vec::new();
    while let Some(msg) = backlog.pop_front() {
        for effect in reactor.update(msg) {
            match effect {
                Effect::Emit(next) => backlog.push_back(next),
                Effect::LoadAssets(batch) => jobs.push(Job::LoadAssets(batch)),
                Effect::ArmRefresh { token, after } => jobs.push(Job::ArmRefresh { token, after }),
                Effect::Search { request, filter } => jobs.push(Job::Search { request, filter }),
                Effect::Enqueue(ids) => jobs.push(Job::Enqueue(ids)),
                Effect::Quit => debug!("quit requested"),
            }
        }
    }
    jobs
}

fn spawn_job(ctx: &EffectContext, job: Job) {
    match job {
        Job::LoadAssets(batch) => {
            tokio::spawn(assets::load_batch(
                ctx.client.clone(),
                batch,
                ctx.settings,
                ctx.tx.clone(),
            ));
        }
        Job::ArmRefresh { token, after } => {
            let tx = ctx.tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                let _ = tx.send(Message::RefreshDue { token }).await;
            });
        }
        Job::Search { request, filter } => {
            let client = ctx.client.clone();
            let tx = ctx.tx.clone();
            tokio::spawn(async move {
                let result = client.search(&filter).await;
                let _ = tx.send(Message::SearchLoaded { request, result }).await;
            });
        }
        Job::Enqueue(ids) => {
            let client = ctx.client.clone();
            let tx = ctx.tx.clone();
            tokio::spawn(async move {
                let result = client.enqueue(&ids).await.map(|()| ids.len());
                let _ = tx.send(Message::Enqueued(result)).await;
            });
        }
    }
}
