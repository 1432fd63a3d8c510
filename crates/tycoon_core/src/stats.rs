//! Derived player capabilities from equipped hardware and unlocked perks.
//!
//! Pure: no mutation and no randomness. Callers recompute after any
//! inventory, equip or perk change; the tick recomputes every firing.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{EffectKind, GameContent, HardwareType, InventoryItem, PerkId, PerkKind, Uid};

pub const BASE_CLICK_POWER: f64 = 1.0;
pub const BASE_BUG_CHANCE: f64 = 0.15;
/// Bug chance never reaches zero.
pub const MIN_BUG_CHANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub click_power: f64,
    /// Lines generated per tick without player input.
    pub auto_code: f64,
    pub bug_chance: f64,
    pub heat_gen: f64,
    pub cooling: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            click_power: BASE_CLICK_POWER,
            auto_code: 0.0,
            bug_chance: BASE_BUG_CHANCE,
            heat_gen: 0.0,
            cooling: 0.0,
        }
    }
}

pub fn compute_stats(
    equipped: &BTreeMap<HardwareType, Uid>,
    inventory: &[InventoryItem],
    unlocked_perks: &BTreeSet<PerkId>,
    content: &GameContent,
) -> Stats {
    let mut stats = Stats::default();

    for uid in equipped.values() {
        let Some(unit) = inventory.iter().find(|item| item.uid == *uid) else {
            continue;
        };
        if crate::wear::is_broken(unit) {
            continue;
        }
        let Some(def) = content.items.get(&unit.item_id) else {
            continue;
        };
        for effect in &def.effects {
            match effect.kind {
                EffectKind::ClickPower => stats.click_power += effect.value,
                EffectKind::AutoCode => stats.auto_code += effect.value,
                EffectKind::BugResist => stats.bug_chance -= effect.value,
                EffectKind::Heat => stats.heat_gen += effect.value,
                EffectKind::Cooling => stats.cooling += effect.value,
            }
        }
    }

    for perk_id in unlocked_perks {
        let Some(perk) = content.perks.get(perk_id) else {
            continue;
        };
        match perk.effect.kind {
            PerkKind::ClickBoost => stats.click_power *= 1.0 + perk.effect.value,
            PerkKind::BugReduction => stats.bug_chance *= 1.0 - perk.effect.value,
            PerkKind::Miner => {}
        }
    }

    stats.bug_chance = stats.bug_chance.max(MIN_BUG_CHANCE);
    stats
}

/// Flat per-tick income from unlocked miner perks.
pub fn miner_income(unlocked_perks: &BTreeSet<PerkId>, content: &GameContent) -> f64 {
    unlocked_perks
        .iter()
        .filter_map(|id| content.perks.get(id))
        .filter(|perk| perk.effect.kind == PerkKind::Miner)
        .map(|perk| perk.effect.value)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, give_item};
    use crate::GameState;

    fn equip_all(state: &mut GameState, items: &[&str], content: &GameContent) {
        for item in items {
            let uid = give_item(state, item, false);
            let slot = content.items[&crate::ItemId::from(*item)].slot.unwrap();
            state.player.equipped.insert(slot, uid);
        }
    }

    fn stats_of(state: &GameState, content: &GameContent) -> Stats {
        compute_stats(
            &state.player.equipped,
            &state.player.inventory,
            &state.player.unlocked_perks,
            content,
        )
    }

    #[test]
    fn base_stats_with_nothing_equipped() {
        let content = base_content();
        let state = GameState::default();
        let stats = stats_of(&state, &content);
        assert!((stats.click_power - 1.0).abs() < 1e-9);
        assert!(stats.auto_code.abs() < 1e-9);
        assert!((stats.bug_chance - 0.15).abs() < 1e-9);
    }

    #[test]
    fn equipped_effects_accumulate_additively() {
        let content = base_content();
        let mut state = GameState::default();
        // basic_cpu: click +1, auto +1, heat +10; basic_cooler: cooling +20
        equip_all(&mut state, &["basic_cpu", "basic_cooler"], &content);
        let stats = stats_of(&state, &content);
        assert!((stats.click_power - 2.0).abs() < 1e-9);
        assert!((stats.auto_code - 1.0).abs() < 1e-9);
        assert!((stats.heat_gen - 10.0).abs() < 1e-9);
        assert!((stats.cooling - 20.0).abs() < 1e-9);
    }

    #[test]
    fn unequipped_inventory_does_not_count() {
        let content = base_content();
        let mut state = GameState::default();
        give_item(&mut state, "basic_cpu", false);
        let stats = stats_of(&state, &content);
        assert!(stats.auto_code.abs() < 1e-9);
    }

    #[test]
    fn click_boost_perks_multiply() {
        let content = base_content();
        let mut state = GameState::default();
        state.player.unlocked_perks.insert(PerkId::from("perk_fast_fingers"));
        state.player.unlocked_perks.insert(PerkId::from("perk_macro_keys"));
        let stats = stats_of(&state, &content);
        // 1 * 1.5 * 1.2
        assert!((stats.click_power - 1.8).abs() < 1e-9);
    }

    #[test]
    fn bug_chance_never_below_floor() {
        let content = base_content();
        let mut state = GameState::default();
        equip_all(&mut state, &["linter_ram"], &content);
        state.player.unlocked_perks.insert(PerkId::from("perk_code_review"));
        let stats = stats_of(&state, &content);
        assert!((stats.bug_chance - MIN_BUG_CHANCE).abs() < 1e-12);
    }

    #[test]
    fn broken_items_contribute_nothing() {
        let content = base_content();
        let mut state = GameState::default();
        equip_all(&mut state, &["basic_cpu"], &content);
        state.player.inventory[0].durability = 0.0;
        let stats = stats_of(&state, &content);
        assert!(stats.auto_code.abs() < 1e-9);
    }

    #[test]
    fn identical_inputs_give_bit_identical_stats() {
        let content = base_content();
        let mut state = GameState::default();
        equip_all(&mut state, &["basic_cpu", "basic_cooler", "linter_ram"], &content);
        state.player.unlocked_perks.insert(PerkId::from("perk_fast_fingers"));
        let first = stats_of(&state, &content);
        let second = stats_of(&state, &content);
        assert_eq!(first.click_power.to_bits(), second.click_power.to_bits());
        assert_eq!(first.auto_code.to_bits(), second.auto_code.to_bits());
        assert_eq!(first.bug_chance.to_bits(), second.bug_chance.to_bits());
        assert_eq!(first.heat_gen.to_bits(), second.heat_gen.to_bits());
        assert_eq!(first.cooling.to_bits(), second.cooling.to_bits());
    }
}
