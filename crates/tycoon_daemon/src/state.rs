use parking_lot::Mutex;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Notify};
use tycoon_control::AutopilotController;
use tycoon_core::files::FileChange;
use tycoon_core::{EventEnvelope, GameContent, GameState, MetricsSnapshot};
use tycoon_world::{ChatMessage, SaveStore};

/// Metrics rows kept for `/api/v1/metrics`.
pub const METRICS_HISTORY_CAP: usize = 1_000;

pub struct SimState {
    pub game_state: GameState,
    pub content: GameContent,
    pub rng: ChaCha8Rng,
    /// Plays for the player when set.
    pub autopilot: Option<AutopilotController>,
    pub metrics_every: u64,
    pub metrics_history: VecDeque<MetricsSnapshot>,
}

impl SimState {
    pub fn push_metrics(&mut self, snapshot: MetricsSnapshot) {
        if self.metrics_history.len() >= METRICS_HISTORY_CAP {
            self.metrics_history.pop_front();
        }
        self.metrics_history.push_back(snapshot);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One message on the `/api/v1/stream` feed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamItem {
    Events { events: Vec<EventEnvelope> },
    Notice { level: NoticeLevel, message: String },
    Chat { message: ChatMessage },
}

pub type SharedSim = Arc<Mutex<SimState>>;
pub type EventTx = broadcast::Sender<StreamItem>;
/// Batches of file-tree changes, replayed in order by the sync worker.
pub type FileSyncTx = mpsc::UnboundedSender<Vec<FileChange>>;

#[derive(Clone)]
pub struct AppState {
    pub sim: SharedSim,
    pub event_tx: EventTx,
    pub ticks_per_sec: f64,
    pub paused: Arc<AtomicBool>,
    pub store: Option<Arc<dyn SaveStore>>,
    pub file_sync: Option<FileSyncTx>,
    /// Wakes the save loop for an immediate save.
    pub save_now: Arc<Notify>,
}

impl AppState {
    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        // No subscribers is fine.
        let _ = self.event_tx.send(StreamItem::Notice {
            level,
            message: message.into(),
        });
    }
}

/// Wall-clock milliseconds since the Unix epoch; the simulation compares
/// signal and shadow-market expiries against it.
pub fn wall_clock_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// App state over the fixture catalog, paused, with no background tasks.
#[cfg(test)]
pub fn test_app(store: Option<Arc<dyn SaveStore>>) -> AppState {
    use rand::SeedableRng;
    use tycoon_core::test_fixtures::{base_content, base_state};

    let content = base_content();
    let game_state = base_state(&content);
    let (event_tx, _) = broadcast::channel(64);
    AppState {
        sim: Arc::new(Mutex::new(SimState {
            game_state,
            content,
            rng: ChaCha8Rng::seed_from_u64(42),
            autopilot: None,
            metrics_every: 60,
            metrics_history: VecDeque::new(),
        })),
        event_tx,
        ticks_per_sec: 1.0,
        paused: Arc::new(AtomicBool::new(true)),
        store,
        file_sync: None,
        save_now: Arc::new(Notify::new()),
    }
}
