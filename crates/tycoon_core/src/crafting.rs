//! Blueprint crafting: consume parts and money, then a tier-scaled skill check.

use rand::Rng;

use crate::trade::require_funds;
use crate::{
    mint_item, push_event, record_transaction, ActionError, BlueprintDef, BlueprintId, Currency,
    Event, EventEnvelope, GameContent, GameState, TransactionKind, Uid,
};

/// Skill checks never become a sure thing.
pub const MAX_CRAFT_SUCCESS: f64 = 0.95;

pub fn success_chance(def: &BlueprintDef, state: &GameState, content: &GameContent) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let tier = crate::progression::tier_index(state.player.tier) as f64;
    (def.base_success + content.constants.craft_tier_bonus * tier).clamp(0.0, MAX_CRAFT_SUCCESS)
}

/// Unequipped units consumed by `def`, or the first missing input.
fn pick_inputs(state: &GameState, def: &BlueprintDef) -> Result<Vec<Uid>, ActionError> {
    let mut picked = Vec::new();
    for input in &def.inputs {
        let units: Vec<&Uid> = state
            .player
            .inventory
            .iter()
            .filter(|item| {
                item.item_id == input.item_id
                    && !state.player.is_equipped(&item.uid)
                    && !picked.contains(&item.uid)
            })
            .map(|item| &item.uid)
            .collect();
        let available = u32::try_from(units.len()).unwrap_or(u32::MAX);
        if available < input.count {
            return Err(ActionError::MissingComponents {
                item_id: input.item_id.clone(),
                needed: input.count,
                available,
            });
        }
        picked.extend(units.into_iter().take(input.count as usize).cloned());
    }
    Ok(picked)
}

pub(crate) fn craft(
    state: &mut GameState,
    content: &GameContent,
    blueprint_id: &BlueprintId,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let def = content
        .blueprints
        .iter()
        .find(|b| b.id == *blueprint_id)
        .ok_or_else(|| ActionError::UnknownBlueprint(blueprint_id.clone()))?;
    let consumed = pick_inputs(state, def)?;
    require_funds(state, Currency::Money, def.money_cost)?;
    let chance = success_chance(def, state, content);

    let tainted = state
        .player
        .inventory
        .iter()
        .any(|item| item.is_stolen && consumed.contains(&item.uid));
    state.player.inventory.retain(|item| !consumed.contains(&item.uid));
    if def.money_cost > 0.0 {
        state.player.money -= def.money_cost;
        record_transaction(
            state,
            TransactionKind::Crafting,
            -def.money_cost,
            format!("Workbench: {blueprint_id}"),
        );
    }

    if crate::roll(rng, chance) {
        let uid = mint_item(state, def.output.clone(), tainted, rng);
        push_event(
            state,
            events,
            Event::Crafted {
                blueprint_id: blueprint_id.clone(),
                uid,
            },
        );
    } else {
        push_event(
            state,
            events,
            Event::CraftFailed {
                blueprint_id: blueprint_id.clone(),
            },
        );
    }
    Ok(())
}
