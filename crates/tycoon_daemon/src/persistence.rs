use std::time::Duration;
use tycoon_core::Command;
use tycoon_world::SaveError;

use crate::state::{AppState, NoticeLevel};

/// Where a written snapshot stood: the tick plus the event counter, which
/// moves on every committed action as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavePoint {
    pub tick: u64,
    pub next_event_id: u64,
}

/// Commands worth an immediate save rather than waiting for the next period.
pub fn saves_immediately(command: &Command) -> bool {
    matches!(
        command,
        Command::Buy { .. }
            | Command::Sell { .. }
            | Command::CleanItem { .. }
            | Command::Craft { .. }
            | Command::UnlockPerk { .. }
            | Command::ResolveHack { .. }
            | Command::JoinCorp { .. }
            | Command::LeaveCorp
            | Command::CollectCorpQuest { .. }
            | Command::ReleaseProject
            | Command::PayBill { .. }
            | Command::TakeLoan { .. }
            | Command::RepayLoan { .. }
            | Command::ConvertCurrency { .. }
            | Command::SetRole { .. }
    )
}

/// Snapshot the state under the lock, then write it off the runtime.
pub async fn save_snapshot(app: &AppState) -> Result<SavePoint, SaveError> {
    let Some(store) = app.store.clone() else {
        return Err(SaveError::Io(std::io::Error::other("no save store configured")));
    };
    let snapshot = app.sim.lock().game_state.clone();
    let point = SavePoint {
        tick: snapshot.meta.tick,
        next_event_id: snapshot.counters.next_event_id,
    };
    tokio::task::spawn_blocking(move || store.save(&snapshot))
        .await
        .map_err(|err| SaveError::Io(std::io::Error::other(err)))??;
    tracing::debug!(tick = point.tick, "state saved");
    Ok(point)
}

fn current_point(app: &AppState) -> SavePoint {
    let sim = app.sim.lock();
    SavePoint {
        tick: sim.game_state.meta.tick,
        next_event_id: sim.game_state.counters.next_event_id,
    }
}

/// Saves every `every` (zero disables the timer) and whenever `save_now`
/// is notified. Unchanged state is not rewritten. Failures are logged and
/// surfaced as warnings; retryable ones are tried again on the next wake.
pub async fn run_save_loop(app: AppState, every: Duration) {
    if app.store.is_none() {
        return;
    }
    let mut interval = (!every.is_zero()).then(|| {
        let mut iv = tokio::time::interval(every);
        iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        iv
    });
    if let Some(iv) = interval.as_mut() {
        iv.tick().await;
    }
    let mut last_saved: Option<SavePoint> = None;

    loop {
        tokio::select! {
            () = app.save_now.notified() => {}
            _ = async {
                match interval.as_mut() {
                    Some(iv) => iv.tick().await,
                    None => std::future::pending().await,
                }
            } => {}
        }
        if last_saved == Some(current_point(&app)) {
            continue;
        }
        match save_snapshot(&app).await {
            Ok(point) => last_saved = Some(point),
            Err(err) => {
                let retry = if err.is_retryable() { "will retry" } else { "not retrying" };
                tracing::warn!("autosave failed ({retry}): {err}");
                app.notify(NoticeLevel::Warning, format!("autosave failed: {err}"));
                if !err.is_retryable() {
                    return;
                }
            }
        }
    }
}
