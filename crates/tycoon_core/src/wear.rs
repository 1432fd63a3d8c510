//! Hardware durability. Overheating grinds down every equipped unit.

use crate::{Constants, GameState, InventoryItem, Uid};

pub const MAX_DURABILITY: f64 = 100.0;

/// A unit at zero durability contributes no stats until repaired.
pub fn is_broken(item: &InventoryItem) -> bool {
    item.durability <= 0.0
}

/// New durability for each equipped, still-working unit after one
/// overheating tick. Empty when the rig is cool.
pub fn overheat_wear(
    prev: &GameState,
    overheating: bool,
    constants: &Constants,
) -> Vec<(Uid, f64)> {
    if !overheating || constants.overheat_wear_per_tick <= 0.0 {
        return Vec::new();
    }
    prev.player
        .equipped
        .values()
        .filter_map(|uid| prev.player.item(uid))
        .filter(|item| !is_broken(item))
        .map(|item| {
            let durability = (item.durability - constants.overheat_wear_per_tick).max(0.0);
            (item.uid.clone(), durability)
        })
        .collect()
}

pub fn repair_cost(item: &InventoryItem, constants: &Constants) -> f64 {
    (MAX_DURABILITY - item.durability).max(0.0) * constants.repair_cost_per_point
}
