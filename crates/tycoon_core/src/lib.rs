//! `tycoon_core` — deterministic hacker-career simulation.
//!
//! No IO, no network, no clock reads. All randomness via the passed-in Rng;
//! wall-clock time arrives as an explicit `now_ms` argument.

mod achievements;
mod commands;
pub mod corp;
mod crafting;
mod economy;
mod engine;
mod error;
pub mod files;
mod finance;
mod hacking;
mod id;
pub mod metrics;
pub mod progression;
mod projects;
pub mod risk;
mod sanitize;
pub mod stats;
pub mod thermal;
mod trade;
mod types;
pub mod wear;
pub mod world_events;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use achievements::evaluate_achievements;
pub use commands::apply_command;
pub use engine::{advance_clock, apply, tick, tick_by, ClockAdvance, ENERGY_MAX, HOURS_PER_TICK};
pub use error::{ActionError, ErrorKind};
pub use id::{generate_uuid, mint_uid};
pub use metrics::{compute_metrics, MetricsFileWriter, MetricsSnapshot};
pub use sanitize::sanitize_state;
pub use stats::{compute_stats, Stats};
pub use trade::{purchase_cost, sale_value, CLEANING_TOOL};
pub use types::*;

/// Current save schema. Bump when a migration in `sanitize_state` is added.
pub const SCHEMA_VERSION: u32 = 2;

/// Recent bank transactions kept on the state.
pub const TRANSACTION_HISTORY_CAP: usize = 100;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

/// Push an event stamped with the state's current tick.
pub(crate) fn push_event(state: &mut GameState, events: &mut Vec<EventEnvelope>, event: Event) {
    let tick = state.meta.tick;
    events.push(emit(&mut state.counters, tick, event));
}

/// One Bernoulli trial. Always consumes exactly one draw from the stream.
pub(crate) fn roll(rng: &mut impl rand::Rng, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

/// Mint a new inventory unit with a fresh uid and full durability.
pub(crate) fn mint_item(
    state: &mut GameState,
    item_id: ItemId,
    is_stolen: bool,
    rng: &mut impl rand::Rng,
) -> Uid {
    state.counters.next_item_serial += 1;
    let uid = mint_uid(rng, state.counters.next_item_serial);
    state.player.inventory.push(InventoryItem {
        uid: uid.clone(),
        item_id,
        is_stolen,
        durability: 100.0,
    });
    uid
}

pub(crate) fn record_transaction(
    state: &mut GameState,
    kind: TransactionKind,
    amount: f64,
    description: impl Into<String>,
) {
    let day = state.clock.day;
    let history = &mut state.finance.transactions;
    history.push(BankTransaction {
        day,
        kind,
        amount,
        description: description.into(),
    });
    if history.len() > TRANSACTION_HISTORY_CAP {
        let excess = history.len() - TRANSACTION_HISTORY_CAP;
        history.drain(..excess);
    }
}

#[cfg(test)]
mod tests;
