use crate::state::{wall_clock_ms, AppState, SimState};
use crate::sync::publish;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tycoon_control::CommandSource;
use tycoon_core::{Action, EventEnvelope};

/// One simulation step: autopilot commands, the tick itself, then a metrics
/// sample when due. Rejected autopilot commands are skipped.
pub fn step(sim: &mut SimState, now_ms: u64) -> Vec<EventEnvelope> {
    let SimState {
        game_state,
        content,
        rng,
        autopilot,
        ..
    } = sim;

    let mut events = Vec::new();
    if let Some(autopilot) = autopilot.as_mut() {
        for command in autopilot.generate_commands(game_state, content, now_ms) {
            match tycoon_core::apply(game_state, &Action::Player(command), content, rng, now_ms) {
                Ok(committed) => events.extend(committed),
                Err(err) => tracing::debug!("autopilot command rejected: {err}"),
            }
        }
    }
    events.extend(tycoon_core::tick(game_state, content, rng, now_ms));

    let metrics_every = sim.metrics_every;
    if metrics_every > 0 && sim.game_state.meta.tick.is_multiple_of(metrics_every) {
        let snapshot = tycoon_core::compute_metrics(&sim.game_state, &sim.content);
        sim.push_metrics(snapshot);
    }
    events
}

pub async fn run_tick_loop(app: AppState, max_ticks: Option<u64>) {
    let mut interval = if app.ticks_per_sec > 0.0 {
        let mut iv = tokio::time::interval(Duration::from_secs_f64(1.0 / app.ticks_per_sec));
        iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);
        Some(iv)
    } else {
        None
    };

    loop {
        if app.paused.load(Ordering::Relaxed) {
            tokio::time::sleep(Duration::from_millis(50)).await;
            continue;
        }

        let done = {
            let mut guard = app.sim.lock();
            let events = step(&mut guard, wall_clock_ms());
            // Published under the lock so file changes queue in commit order.
            publish(&app, events);
            max_ticks.is_some_and(|max| guard.game_state.meta.tick >= max)
        };

        if done {
            tracing::info!("tick limit reached");
            break;
        }

        if let Some(ref mut iv) = interval {
            iv.tick().await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}
