//! Hack resolution, the console quest chain and encrypted signals.
//!
//! The hack minigame itself runs outside the core; it reports success or
//! failure and this module applies the consequences.

use rand::Rng;

use crate::progression::{adjust_reputation, hacker_rank};
use crate::risk::{add_heat, TRACE_MAX};
use crate::{
    mint_item, push_event, record_transaction, ActionError, ConsoleQuestDef, Event, EventEnvelope,
    GameContent, GameState, HackContract, LabQuestId, ObjectiveKind, PlayerRole, TransactionKind,
};

pub(crate) fn resolve_hack(
    state: &mut GameState,
    content: &GameContent,
    difficulty: u32,
    success: bool,
    lab_quest: Option<&LabQuestId>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let lab_def = lab_quest
        .map(|id| {
            content
                .lab_quests
                .iter()
                .find(|q| q.id == *id)
                .ok_or_else(|| ActionError::UnknownLabQuest(id.clone()))
        })
        .transpose()?;
    let difficulty = difficulty.max(1);
    let constants = &content.constants;
    state.player.hack_stats.total_hacks += 1;

    if success {
        let stats = &mut state.player.hack_stats;
        stats.successful_hacks += 1;
        stats.streak += 1;
        stats.best_streak = stats.best_streak.max(stats.streak);

        let bonus = if state.player.role == PlayerRole::Hacker {
            1.0 + constants.hacker_payout_bonus
        } else {
            1.0
        };
        let scale = f64::from(difficulty);
        let money =
            scale * constants.hack_money_per_difficulty * constants.economy_multiplier * bonus;
        let shadow_credits = scale * constants.hack_shadow_per_difficulty * bonus;
        let reputation = i64::from(difficulty) * constants.hack_reputation_per_difficulty;

        state.player.money += money;
        state.player.shadow_credits += shadow_credits;
        record_transaction(
            state,
            TransactionKind::HackReward,
            money,
            format!("Contract payout (difficulty {difficulty})"),
        );
        let tier_change = adjust_reputation(state, reputation);
        push_event(
            state,
            events,
            Event::HackSucceeded {
                difficulty,
                money,
                shadow_credits,
                reputation,
            },
        );
        if let Some(event) = tier_change {
            push_event(state, events, event);
        }

        if let Some(def) = lab_def {
            if state.player.completed_lab_quests.insert(def.id.clone()) {
                for item_id in &def.reward_items {
                    let uid = mint_item(state, item_id.clone(), false, rng);
                    push_event(
                        state,
                        events,
                        Event::ItemPurchased {
                            uid,
                            item_id: item_id.clone(),
                            cost: 0.0,
                            shadow: false,
                        },
                    );
                }
                push_event(state, events, Event::LabQuestCompleted { quest_id: def.id.clone() });
            }
        }

        if let Some(contract) = state.player.pending_hack.take() {
            if contract.gateway && !state.inbox.black_market_unlocked {
                state.inbox.black_market_unlocked = true;
                push_event(state, events, Event::BlackMarketUnlocked);
            }
        }
        crate::corp::advance_objectives(state, content, ObjectiveKind::SuccessfulHacks, 1.0);
    } else {
        state.player.hack_stats.streak = 0;
        state.risk.trace_percent =
            (state.risk.trace_percent + constants.hack_fail_trace).clamp(0.0, TRACE_MAX);
        state.risk.global_heat = add_heat(state.risk.global_heat, constants.hack_fail_heat);
        push_event(state, events, Event::HackFailed { difficulty });
        if state.inbox.signal.take().is_some() {
            push_event(state, events, Event::SignalCancelled);
        }
    }

    let rank = hacker_rank(&state.player.hack_stats);
    if rank != state.player.hack_stats.rank {
        state.player.hack_stats.rank = rank;
        push_event(state, events, Event::HackerRankChanged { rank });
    }
    Ok(())
}

/// Trim, lowercase and collapse internal whitespace.
pub fn normalize_command(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn accepts(quest: &ConsoleQuestDef, input: &str) -> bool {
    let input = normalize_command(input);
    quest.accepts.iter().any(|pattern| {
        let pattern = normalize_command(pattern);
        match pattern.strip_suffix('*') {
            Some(prefix) => input.starts_with(prefix.trim_end()),
            None => input == pattern,
        }
    })
}

pub(crate) fn console_submit(
    state: &mut GameState,
    content: &GameContent,
    input: &str,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let quest = content
        .console_quests
        .get(state.player.quest_index)
        .ok_or(ActionError::NoQuestAvailable)?;
    if !accepts(quest, input) {
        return Err(ActionError::CommandRejected(normalize_command(input)));
    }
    state.player.quest_index += 1;
    push_event(state, events, Event::ConsoleQuestCompleted { quest_id: quest.id.clone() });

    let constants = &content.constants;
    if quest.gateway {
        let contract = HackContract {
            difficulty: constants.gateway_hack_difficulty,
            gateway: true,
        };
        push_event(
            state,
            events,
            Event::HackStarted {
                difficulty: contract.difficulty,
                gateway: true,
            },
        );
        state.player.pending_hack = Some(contract);
        return Ok(());
    }

    let money = quest.reward_money * constants.economy_multiplier;
    if money > 0.0 {
        state.player.money += money;
        record_transaction(state, TransactionKind::QuestReward, money, quest.title.clone());
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let xp = (quest.reward_xp as f64 * constants.xp_multiplier).round().max(0.0) as u64;
    state.player.xp = state.player.xp.saturating_add(xp);
    Ok(())
}

/// Answering an open signal trades it for a shadow-market access window.
pub(crate) fn answer_signal(
    state: &mut GameState,
    content: &GameContent,
    now_ms: u64,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    if !state.inbox.signal_active(now_ms) {
        return Err(ActionError::NoSignal);
    }
    state.inbox.signal = None;
    let until_ms = now_ms.saturating_add(content.constants.shadow_access_secs.saturating_mul(1000));
    state.inbox.shadow_access_until_ms = Some(until_ms);
    push_event(state, events, Event::ShadowAccessGranted { until_ms });
    Ok(())
}
