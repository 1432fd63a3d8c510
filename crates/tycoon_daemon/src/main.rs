mod persistence;
mod routes;
mod state;
mod sync;
mod tick_loop;

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;
use tycoon_control::AutopilotController;
use tycoon_core::GameState;
use tycoon_world::{
    build_initial_state, load_content, load_game, FileSystemService, JsonFileStore, LocalDiskFs,
    MockPresence, PresenceService, SaveStore,
};

use crate::state::{AppState, NoticeLevel, SimState, StreamItem};

#[derive(Parser)]
#[command(name = "tycoon_daemon", about = "Runs a career and serves it over HTTP")]
struct Cli {
    #[arg(long, default_value = "./content")]
    content_dir: String,
    /// Seed for a new career; ignored when a save is resumed.
    #[arg(long)]
    seed: Option<u64>,
    /// 0 runs as fast as possible.
    #[arg(long, default_value_t = 1.0)]
    ticks_per_sec: f64,
    #[arg(long)]
    save_dir: Option<String>,
    #[arg(long, default_value = "player_one")]
    player: String,
    #[arg(long, default_value_t = 30)]
    save_every_secs: u64,
    #[arg(long, default_value_t = 3001)]
    port: u16,
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Let the autopilot play.
    #[arg(long)]
    autopilot: bool,
    /// Mirror the in-game file tree under this directory.
    #[arg(long)]
    fs_root: Option<String>,
    /// Feed mock chat into the stream.
    #[arg(long)]
    presence: bool,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
    #[arg(long, default_value_t = 60)]
    metrics_every: u64,
    /// Start with the clock stopped.
    #[arg(long)]
    paused: bool,
}

fn load_or_create(
    cli: &Cli,
    store: Option<&dyn SaveStore>,
    content: &tycoon_core::GameContent,
) -> Result<(GameState, ChaCha8Rng)> {
    if let Some(store) = store {
        if let Some(state) = load_game(store, content).context("loading save")? {
            tracing::info!(
                player = %state.meta.player_id,
                tick = state.meta.tick,
                "resuming career"
            );
            let rng = ChaCha8Rng::seed_from_u64(state.meta.seed ^ state.meta.tick.rotate_left(32));
            return Ok((state, rng));
        }
    }
    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let state = build_initial_state(content, seed, &cli.player, &mut rng);
    tracing::info!(player = %cli.player, seed, "new career");
    Ok((state, rng))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cors_origin = HeaderValue::from_str(&cli.cors_origin)
        .with_context(|| format!("invalid --cors-origin {}", cli.cors_origin))?;
    let content = load_content(&cli.content_dir)?;

    let store: Option<Arc<dyn SaveStore>> = match &cli.save_dir {
        Some(dir) => {
            let store = JsonFileStore::new(dir, &cli.player);
            store.init().context("preparing save directory")?;
            Some(Arc::new(store))
        }
        None => None,
    };
    let (game_state, rng) = load_or_create(&cli, store.as_deref(), &content)?;

    let (event_tx, _) = tokio::sync::broadcast::channel(256);

    let file_sync = match &cli.fs_root {
        Some(root) => {
            let fs: Arc<dyn FileSystemService> =
                Arc::new(LocalDiskFs::new(root).context("opening --fs-root")?);
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
            tokio::spawn(sync::run_file_sync(
                fs,
                rx,
                event_tx.clone(),
                sync::SYNC_RETRY_INTERVAL,
            ));
            Some(tx)
        }
        None => None,
    };

    let app_state = AppState {
        sim: Arc::new(Mutex::new(SimState {
            game_state,
            content,
            rng,
            autopilot: cli.autopilot.then(AutopilotController::default),
            metrics_every: cli.metrics_every,
            metrics_history: VecDeque::new(),
        })),
        event_tx: event_tx.clone(),
        ticks_per_sec: cli.ticks_per_sec,
        paused: Arc::new(AtomicBool::new(cli.paused)),
        store,
        file_sync,
        save_now: Arc::new(tokio::sync::Notify::new()),
    };

    let mut presence = MockPresence::new(Duration::from_secs(20), rand::random());
    if cli.presence {
        let chat_tx = event_tx.clone();
        presence.start(Box::new(move |message| {
            let _ = chat_tx.send(StreamItem::Chat { message });
        }));
    }

    tokio::spawn(tick_loop::run_tick_loop(app_state.clone(), cli.max_ticks));
    tokio::spawn(persistence::run_save_loop(
        app_state.clone(),
        Duration::from_secs(cli.save_every_secs),
    ));

    let router = routes::make_router(app_state.clone(), cors_origin);
    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");
    app_state.notify(NoticeLevel::Info, "daemon started");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("waiting for ctrl-c: {err}");
            }
        })
        .await
        .context("serving http")?;

    presence.stop();
    if app_state.store.is_some() {
        let tick = persistence::save_snapshot(&app_state)
            .await
            .context("final save")?;
        tracing::info!(tick = tick.tick, "saved on shutdown");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_with_defaults() {
        let cli = Cli::parse_from(["tycoon_daemon", "--autopilot", "--seed", "9"]);
        assert!(cli.autopilot);
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.player, "player_one");
        assert!(cli.save_dir.is_none());
        assert!(!cli.paused);
    }

    #[test]
    fn new_career_when_no_save() {
        let content = tycoon_core::test_fixtures::base_content();
        let cli = Cli::parse_from(["tycoon_daemon", "--seed", "3", "--player", "p2"]);
        let (state, _) = load_or_create(&cli, None, &content).unwrap();
        assert_eq!(state.meta.seed, 3);
        assert_eq!(state.meta.player_id.0, "p2");
        assert_eq!(state.meta.tick, 0);
    }
}
