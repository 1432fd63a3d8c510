use super::*;
use crate::test_fixtures::{base_content, base_state, give_item, make_rng, never_rng};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

mod clock;
mod commands;
mod risk;
mod thermal;

// --- Shared test helpers ------------------------------------------------

/// Fixed wall clock for tests that do not care about signal windows.
const NOW_MS: u64 = 1_000_000;

fn run(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    command: Command,
) -> Result<Vec<EventEnvelope>, ActionError> {
    apply(state, &Action::Player(command), content, rng, NOW_MS)
}

fn run_ticks(state: &mut GameState, content: &GameContent, rng: &mut impl Rng, ticks: u32) {
    for _ in 0..ticks {
        tick(state, content, rng, NOW_MS);
    }
}

/// Give the player a unit of `item_id` and equip it in its slot.
fn equip_new(state: &mut GameState, content: &GameContent, item_id: &str) -> Uid {
    let uid = give_item(state, item_id, false);
    run(state, content, &mut never_rng(), Command::Equip { uid: uid.clone() }).unwrap();
    uid
}

fn snapshot_json(state: &GameState) -> serde_json::Value {
    serde_json::to_value(state).unwrap()
}

fn assert_equipped_owned(state: &GameState) {
    for uid in state.player.equipped.values() {
        assert!(
            state.player.item(uid).is_some(),
            "equipped uid {uid} missing from inventory"
        );
    }
}
