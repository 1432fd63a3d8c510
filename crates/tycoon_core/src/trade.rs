//! Hardware market: pricing, buying, selling, cleaning and equipping.

use rand::Rng;

use crate::risk::{add_heat, SHADOW_PURCHASE_HEAT};
use crate::{
    mint_item, push_event, record_transaction, ActionError, Constants, Currency, Event,
    EventEnvelope, GameContent, GameState, HardwareType, ItemDef, ItemId, ObjectiveKind,
    PlayerRole, TransactionKind, Uid,
};

/// Legitimate-market discount for engineers.
pub const ENGINEER_DISCOUNT: f64 = 0.15;
/// Tool that removes the stolen flag from a unit.
pub const CLEANING_TOOL: &str = "tool_flasher";

/// Price of one unit. Shadow purchases ignore market trends and role
/// discounts and are quoted in shadow credits.
pub fn purchase_cost(def: &ItemDef, state: &GameState, shadow: bool, constants: &Constants) -> f64 {
    if shadow {
        return def.base_cost * constants.shadow_price_factor;
    }
    let trend = def.slot.map_or(1.0, |slot| state.market.trend(slot));
    let discount = if state.player.role == PlayerRole::Engineer {
        1.0 - ENGINEER_DISCOUNT
    } else {
        1.0
    };
    def.base_cost * trend * discount
}

/// Money credited for a legitimate sale quoted at `value`.
pub fn sale_value(value: f64, role: PlayerRole, constants: &Constants) -> f64 {
    let bonus = if role == PlayerRole::Trader {
        1.0 + constants.trader_sale_bonus
    } else {
        1.0
    };
    value * constants.economy_multiplier * bonus
}

pub(crate) fn require_funds(
    state: &GameState,
    currency: Currency,
    needed: f64,
) -> Result<(), ActionError> {
    let available = match currency {
        Currency::Money => state.player.money,
        Currency::ShadowCredits => state.player.shadow_credits,
    };
    if available < needed {
        return Err(ActionError::InsufficientFunds {
            currency,
            needed,
            available,
        });
    }
    Ok(())
}

pub(crate) fn valid_amount(amount: f64) -> Result<f64, ActionError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(ActionError::InvalidAmount)
    }
}

pub(crate) fn buy(
    state: &mut GameState,
    content: &GameContent,
    item_id: &ItemId,
    shadow: bool,
    rng: &mut impl Rng,
    now_ms: u64,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let def = content
        .items
        .get(item_id)
        .ok_or_else(|| ActionError::UnknownItem(item_id.clone()))?;
    if shadow && !state.inbox.black_market_unlocked && !state.inbox.shadow_access_active(now_ms) {
        return Err(ActionError::BlackMarketLocked);
    }
    let cost = purchase_cost(def, state, shadow, &content.constants);

    if shadow {
        require_funds(state, Currency::ShadowCredits, cost)?;
        state.player.shadow_credits -= cost;
        state.risk.global_heat = add_heat(state.risk.global_heat, SHADOW_PURCHASE_HEAT);
    } else {
        require_funds(state, Currency::Money, cost)?;
        state.player.money -= cost;
        record_transaction(state, TransactionKind::Purchase, -cost, def.name.clone());
    }

    let uid = mint_item(state, item_id.clone(), shadow, rng);
    push_event(
        state,
        events,
        Event::ItemPurchased {
            uid,
            item_id: item_id.clone(),
            cost,
            shadow,
        },
    );
    Ok(())
}

fn slot_of(state: &GameState, uid: &Uid) -> Option<HardwareType> {
    state
        .player
        .equipped
        .iter()
        .find(|(_, equipped)| *equipped == uid)
        .map(|(slot, _)| *slot)
}

/// Another owned unit that fits `slot`, preferring working clean units.
fn replacement_for(
    state: &GameState,
    content: &GameContent,
    slot: HardwareType,
    outgoing: &Uid,
) -> Option<Uid> {
    let mut candidates: Vec<_> = state
        .player
        .inventory
        .iter()
        .filter(|item| item.uid != *outgoing)
        .filter(|item| {
            content
                .items
                .get(&item.item_id)
                .is_some_and(|def| def.slot == Some(slot))
        })
        .collect();
    candidates.sort_by_key(|item| (crate::wear::is_broken(item), item.is_stolen));
    candidates.first().map(|item| item.uid.clone())
}

pub(crate) fn sell(
    state: &mut GameState,
    content: &GameContent,
    uid: &Uid,
    value: f64,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let item = state
        .player
        .item(uid)
        .ok_or_else(|| ActionError::ItemNotFound(uid.clone()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ActionError::InvalidAmount);
    }
    if item.is_stolen {
        return Err(ActionError::StolenGoods(uid.clone()));
    }

    if let Some(slot) = slot_of(state, uid) {
        let replacement = replacement_for(state, content, slot, uid)
            .ok_or_else(|| ActionError::ItemEquipped(uid.clone()))?;
        state.player.equipped.insert(slot, replacement.clone());
        push_event(state, events, Event::ItemEquipped { slot, uid: replacement });
    }

    state.player.inventory.retain(|item| item.uid != *uid);
    let amount = sale_value(value, state.player.role, &content.constants);
    state.player.money += amount;
    record_transaction(state, TransactionKind::Sale, amount, format!("Sold {uid}"));
    crate::corp::advance_objectives(state, content, ObjectiveKind::SellItems, 1.0);
    push_event(state, events, Event::ItemSold { uid: uid.clone(), amount });
    Ok(())
}

pub(crate) fn clean(
    state: &mut GameState,
    uid: &Uid,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let tool = ItemId::from(CLEANING_TOOL);
    if !state.player.owns_item(&tool) {
        return Err(ActionError::MissingTool(tool));
    }
    let item = state
        .player
        .item_mut(uid)
        .ok_or_else(|| ActionError::ItemNotFound(uid.clone()))?;
    item.is_stolen = false;
    push_event(state, events, Event::ItemCleaned { uid: uid.clone() });
    Ok(())
}

pub(crate) fn equip(
    state: &mut GameState,
    content: &GameContent,
    uid: &Uid,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let item = state
        .player
        .item(uid)
        .ok_or_else(|| ActionError::ItemNotFound(uid.clone()))?;
    let def = content
        .items
        .get(&item.item_id)
        .ok_or_else(|| ActionError::UnknownItem(item.item_id.clone()))?;
    let slot = def
        .slot
        .ok_or_else(|| ActionError::NotEquippable(item.item_id.clone()))?;
    state.player.equipped.insert(slot, uid.clone());
    push_event(state, events, Event::ItemEquipped { slot, uid: uid.clone() });
    Ok(())
}

pub(crate) fn unequip(
    state: &mut GameState,
    slot: HardwareType,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    state
        .player
        .equipped
        .remove(&slot)
        .ok_or(ActionError::SlotEmpty(slot))?;
    push_event(state, events, Event::ItemUnequipped { slot });
    Ok(())
}

pub(crate) fn repair(
    state: &mut GameState,
    content: &GameContent,
    uid: &Uid,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let item = state
        .player
        .item(uid)
        .ok_or_else(|| ActionError::ItemNotFound(uid.clone()))?;
    let cost = crate::wear::repair_cost(item, &content.constants);
    if cost <= 0.0 {
        return Ok(());
    }
    require_funds(state, Currency::Money, cost)?;
    state.player.money -= cost;
    if let Some(item) = state.player.item_mut(uid) {
        item.durability = crate::wear::MAX_DURABILITY;
    }
    record_transaction(state, TransactionKind::Repair, -cost, format!("Repaired {uid}"));
    push_event(state, events, Event::ItemRepaired { uid: uid.clone(), cost });
    Ok(())
}
