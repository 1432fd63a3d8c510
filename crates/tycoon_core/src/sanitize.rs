//! Repair of loaded saves.
//!
//! Older or hand-edited saves can carry values no transition would produce.
//! `sanitize_state` forces them back inside their bounds and recomputes every
//! derived field. Returns a human-readable note per repair so the loader can
//! log what changed.

use crate::economy::clamp_credit;
use crate::progression::{hacker_rank, membership_rank_for_xp, standing_for, tier_for_reputation};
use crate::risk::{HEAT_FLOOR, HEAT_MAX, TRACE_MAX};
use crate::wear::MAX_DURABILITY;
use crate::world_events::clamp_trend;
use crate::{GameContent, GameState, HardwareType, SCHEMA_VERSION};

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn clamp_gauge(notes: &mut Vec<String>, name: &str, value: &mut f64, min: f64, max: f64) {
    let fixed = finite_or(*value, min).clamp(min, max);
    if fixed.to_bits() != value.to_bits() {
        notes.push(format!("{name} {value} clamped to {fixed}"));
        *value = fixed;
    }
}

pub fn sanitize_state(state: &mut GameState, content: &GameContent) -> Vec<String> {
    let mut notes = Vec::new();

    if state.meta.schema_version < SCHEMA_VERSION {
        notes.push(format!(
            "schema {} migrated to {SCHEMA_VERSION}",
            state.meta.schema_version
        ));
        state.meta.schema_version = SCHEMA_VERSION;
    }

    sanitize_player(state, content, &mut notes);
    sanitize_world(state, &mut notes);
    sanitize_corp(state, content, &mut notes);
    notes
}

fn sanitize_player(state: &mut GameState, content: &GameContent, notes: &mut Vec<String>) {
    let player = &mut state.player;
    for (name, value) in [
        ("money", &mut player.money),
        ("shadow_credits", &mut player.shadow_credits),
        ("lines_of_code", &mut player.lines_of_code),
    ] {
        if !value.is_finite() {
            notes.push(format!("{name} was not finite"));
            *value = 0.0;
        }
    }
    clamp_gauge(notes, "energy", &mut player.energy, 0.0, crate::engine::ENERGY_MAX);
    player.temperature = finite_or(player.temperature, crate::thermal::AMBIENT_TEMP);
    if !state.clock.time_of_day.is_finite() || !(0.0..24.0).contains(&state.clock.time_of_day) {
        notes.push("time of day reset".to_string());
        state.clock.time_of_day = 0.0;
    }
    if state.clock.day == 0 {
        state.clock.day = 1;
    }

    for item in &mut player.inventory {
        let name = format!("durability of {}", item.uid);
        clamp_gauge(notes, &name, &mut item.durability, 0.0, MAX_DURABILITY);
    }

    // Every equipped uid must point at an owned unit that fits the slot.
    let inventory = &player.inventory;
    let before = player.equipped.len();
    player.equipped.retain(|slot, uid| {
        inventory
            .iter()
            .find(|item| item.uid == *uid)
            .and_then(|item| content.items.get(&item.item_id))
            .is_some_and(|def| def.slot == Some(*slot))
    });
    if player.equipped.len() != before {
        notes.push(format!(
            "dropped {} dangling equipped uid(s)",
            before - player.equipped.len()
        ));
    }

    let tier = tier_for_reputation(player.reputation);
    if tier != player.tier {
        notes.push(format!("tier {:?} recomputed as {tier:?}", player.tier));
        player.tier = tier;
    }
    let stats = &mut player.hack_stats;
    stats.successful_hacks = stats.successful_hacks.min(stats.total_hacks);
    stats.best_streak = stats.best_streak.max(stats.streak);
    stats.rank = hacker_rank(stats);
    player.quest_index = player.quest_index.min(content.console_quests.len());
}

fn sanitize_world(state: &mut GameState, notes: &mut Vec<String>) {
    clamp_gauge(notes, "global heat", &mut state.risk.global_heat, HEAT_FLOOR, HEAT_MAX);
    clamp_gauge(notes, "trace", &mut state.risk.trace_percent, 0.0, TRACE_MAX);

    let finance = &mut state.finance;
    let score = clamp_credit(finance.credit_score);
    if score != finance.credit_score {
        notes.push(format!("credit score {} clamped to {score}", finance.credit_score));
        finance.credit_score = score;
    }
    finance.loan_debt = finite_or(finance.loan_debt, 0.0).max(0.0);
    let bills = finance.bills.len();
    finance.bills.retain(|bill| !bill.paid);
    if finance.bills.len() != bills {
        notes.push(format!("dropped {} paid bill(s)", bills - finance.bills.len()));
    }

    for hardware in HardwareType::ALL {
        let trend = state.market.trends.entry(hardware).or_insert(1.0);
        let fixed = clamp_trend(finite_or(*trend, 1.0));
        if fixed.to_bits() != trend.to_bits() {
            notes.push(format!("{} trend {trend} clamped to {fixed}", hardware.label()));
            *trend = fixed;
        }
    }
}

fn sanitize_corp(state: &mut GameState, content: &GameContent, notes: &mut Vec<String>) {
    let corp = &mut state.corp;
    for rep in &mut corp.reputations {
        rep.reputation = rep.reputation.clamp(
            crate::progression::CORP_REPUTATION_MIN,
            crate::progression::CORP_REPUTATION_MAX,
        );
        rep.standing = standing_for(rep.reputation);
    }

    if let Some(membership) = corp.membership.as_mut() {
        if content.corporations.iter().any(|c| c.id == membership.corp_id) {
            membership.rank = membership_rank_for_xp(membership.xp);
        } else {
            notes.push(format!("membership in unknown corp {} dropped", membership.corp_id));
            corp.membership = None;
        }
    }

    let member_of = corp.membership.as_ref().map(|m| m.corp_id.clone());
    corp.active_quests.retain_mut(|active| {
        let Some(def) = content.corp_quests.iter().find(|q| q.id == active.quest_id) else {
            notes.push(format!("unknown quest {} dropped", active.quest_id));
            return false;
        };
        if member_of.as_ref() != Some(&def.corp_id) {
            notes.push(format!("quest {} dropped with its corp", active.quest_id));
            return false;
        }
        active.progress.resize(def.objectives.len(), 0.0);
        for (progress, objective) in active.progress.iter_mut().zip(&def.objectives) {
            *progress = finite_or(*progress, 0.0).clamp(0.0, f64::from(objective.target));
        }
        true
    });
    corp.active_quests.truncate(crate::corp::MAX_ACTIVE_QUESTS);
}
