mod assets;
mod clock;
mod message;
mod reactor;
mod runtime;
mod theme;
mod widgets;

use bop_proto::config::Config;
use bop_proto::gateway::GatewayClient;

use crate::assets::AssetSettings;
use crate::runtime::RuntimeOptions;
use crate::theme::Theme;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = bop_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("bop-queue.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG wins; otherwise debug for our code and quiet HTTP internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("bop-queue log: {}", log_path.display());
    tracing::info!("bop-queue starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config unreadable ({}), using defaults", e);
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    });

    let base_url = config.base_url()?;
    tracing::info!("queue server at {}", base_url);
    let client = GatewayClient::new(base_url, config.timeout())?;
    let theme = Theme::by_name(&config.ui.theme);
    tracing::debug!("theme: {}", theme.name);

    let options = RuntimeOptions {
        settings: AssetSettings {
            width_divisor: config.assets.width_divisor,
            concurrency: config.assets.concurrency,
        },
        mouse: config.ui.mouse,
    };

    // Leave the terminal usable if anything panics mid-frame.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        runtime::restore_terminal();
        default_hook(info);
    }));

    runtime::run(client, theme, options).await
}
