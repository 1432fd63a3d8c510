//! Trace, global heat and corporate raids.

use std::collections::BTreeMap;

use rand::Rng;

use crate::{GameContent, HardwareType, InventoryItem, Uid};

pub const TRACE_MAX: f64 = 100.0;
/// Trace gained per tick while illegal gear is equipped.
pub const TRACE_BUILDUP: f64 = 0.05;
/// Trace shed per tick while clean. Faster than the buildup.
pub const TRACE_DECAY: f64 = 0.1;

pub const HEAT_MAX: f64 = 100.0;
/// Global heat never decays below this baseline.
pub const HEAT_FLOOR: f64 = 10.0;
pub const HEAT_DECAY_CHANCE: f64 = 0.1;
pub const HEAT_DECAY_AMOUNT: f64 = 1.0;
/// Heat added by every black-market purchase.
pub const SHADOW_PURCHASE_HEAT: f64 = 5.0;

pub const RAID_TRACE_THRESHOLD: f64 = 90.0;
pub const RAID_CHANCE: f64 = 0.01;
/// Fraction of the balance the player keeps after a raid.
pub const RAID_KEEP_FRACTION: f64 = 0.5;

pub const MIN_EXCHANGE_RATE: f64 = 0.1;
pub const EXCHANGE_HEAT_SCALE: f64 = 150.0;

pub fn illegal_equipped(
    equipped: &BTreeMap<HardwareType, Uid>,
    inventory: &[InventoryItem],
    content: &GameContent,
) -> bool {
    equipped.values().any(|uid| {
        inventory
            .iter()
            .find(|item| item.uid == *uid)
            .and_then(|item| content.items.get(&item.item_id))
            .is_some_and(|def| def.is_illegal)
    })
}

/// Next trace value. Builds slowly with illegal gear, decays faster without.
pub fn next_trace(trace: f64, illegal: bool) -> f64 {
    let next = if illegal {
        trace + TRACE_BUILDUP
    } else if trace > 0.0 {
        trace - TRACE_DECAY
    } else {
        trace
    };
    next.clamp(0.0, TRACE_MAX)
}

/// Rolls the heat-decay trial. Always consumes one draw.
pub fn decayed_heat(heat: f64, rng: &mut impl Rng) -> f64 {
    let hit = crate::roll(rng, HEAT_DECAY_CHANCE);
    if hit && heat > HEAT_FLOOR {
        (heat - HEAT_DECAY_AMOUNT).max(HEAT_FLOOR)
    } else {
        heat
    }
}

pub fn add_heat(heat: f64, amount: f64) -> f64 {
    (heat + amount).clamp(0.0, HEAT_MAX)
}

/// Rolls the raid trial against the pre-tick trace. Always consumes one draw.
pub fn raid_triggered(trace: f64, rng: &mut impl Rng) -> bool {
    let hit = crate::roll(rng, RAID_CHANCE);
    trace > RAID_TRACE_THRESHOLD && hit
}

/// Shadow credits received per unit of money.
pub fn exchange_rate(global_heat: f64) -> f64 {
    (1.0 - global_heat / EXCHANGE_HEAT_SCALE).max(MIN_EXCHANGE_RATE)
}
