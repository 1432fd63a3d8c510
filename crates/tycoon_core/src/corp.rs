//! Corporation membership and corp quest state machines.
//!
//! Membership: `none -> active(Recruit) -> higher ranks via corp XP -> none`.
//! Quests: `available -> active -> completable -> collected`.

use smallvec::SmallVec;

use crate::progression::{adjust_corp_reputation, membership_rank_for_xp, rank_index};
use crate::{
    push_event, ActionError, ActiveCorpQuest, CorpId, CorpMembership, CorpQuestDef, CorpQuestId,
    Event, EventEnvelope, GameContent, GameState, MembershipRank, ObjectiveKind, TransactionKind,
};

pub const MAX_ACTIVE_QUESTS: usize = 3;
/// Corp reputation below this bars joining.
pub const JOIN_MIN_REPUTATION: i32 = -10;

fn quest_def<'a>(content: &'a GameContent, quest_id: &CorpQuestId) -> Option<&'a CorpQuestDef> {
    content.corp_quests.iter().find(|q| q.id == *quest_id)
}

pub(crate) fn join(
    state: &mut GameState,
    content: &GameContent,
    corp_id: &CorpId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    if !content.corporations.iter().any(|c| c.id == *corp_id) {
        return Err(ActionError::UnknownCorporation(corp_id.clone()));
    }
    if let Some(current) = &state.corp.membership {
        return Err(ActionError::AlreadyMember(current.corp_id.clone()));
    }
    let reputation = state.corp.reputation_with(corp_id);
    if reputation < JOIN_MIN_REPUTATION {
        return Err(ActionError::ReputationTooLow {
            corp_id: corp_id.clone(),
            reputation,
        });
    }

    adjust_corp_reputation(&mut state.corp.reputations, corp_id, 0);
    state.corp.membership = Some(CorpMembership {
        corp_id: corp_id.clone(),
        rank: MembershipRank::Recruit,
        xp: 0,
        joined_day: state.clock.day,
    });
    push_event(state, events, Event::CorpJoined { corp_id: corp_id.clone() });
    Ok(())
}

/// Leaving costs corp reputation proportional to rank and abandons that
/// corporation's active quests.
pub(crate) fn leave(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let membership = state.corp.membership.take().ok_or(ActionError::NotMember)?;
    let penalty = content.constants.leave_penalty_per_rank
        * i32::try_from(rank_index(membership.rank) + 1).unwrap_or(i32::MAX);
    adjust_corp_reputation(&mut state.corp.reputations, &membership.corp_id, -penalty);
    state.corp.active_quests.retain(|active| {
        quest_def(content, &active.quest_id).is_some_and(|def| def.corp_id != membership.corp_id)
    });
    push_event(
        state,
        events,
        Event::CorpLeft {
            corp_id: membership.corp_id,
            penalty,
        },
    );
    Ok(())
}

pub(crate) fn accept_quest(
    state: &mut GameState,
    content: &GameContent,
    quest_id: &CorpQuestId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let def =
        quest_def(content, quest_id).ok_or_else(|| ActionError::UnknownQuest(quest_id.clone()))?;
    let membership = state
        .corp
        .membership
        .as_ref()
        .filter(|m| m.corp_id == def.corp_id)
        .ok_or(ActionError::NotMember)?;
    if membership.rank < def.min_rank {
        return Err(ActionError::RankTooLow(quest_id.clone()));
    }
    let already = state.corp.active_quests.iter().any(|a| a.quest_id == *quest_id)
        || state.corp.completed_quests.contains(quest_id);
    if already {
        return Err(ActionError::DuplicateQuest(quest_id.clone()));
    }
    if state.corp.active_quests.len() >= MAX_ACTIVE_QUESTS {
        return Err(ActionError::QuestLimitReached {
            max: MAX_ACTIVE_QUESTS,
        });
    }

    state.corp.active_quests.push(ActiveCorpQuest {
        quest_id: quest_id.clone(),
        progress: SmallVec::from_elem(0.0, def.objectives.len()),
    });
    push_event(state, events, Event::CorpQuestAccepted { quest_id: quest_id.clone() });
    Ok(())
}

pub fn is_completable(active: &ActiveCorpQuest, def: &CorpQuestDef) -> bool {
    def.objectives.len() == active.progress.len()
        && def
            .objectives
            .iter()
            .zip(&active.progress)
            .all(|(objective, progress)| *progress >= f64::from(objective.target))
}

pub(crate) fn collect_quest(
    state: &mut GameState,
    content: &GameContent,
    quest_id: &CorpQuestId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let index = state
        .corp
        .active_quests
        .iter()
        .position(|a| a.quest_id == *quest_id)
        .ok_or_else(|| ActionError::QuestNotActive(quest_id.clone()))?;
    let def =
        quest_def(content, quest_id).ok_or_else(|| ActionError::UnknownQuest(quest_id.clone()))?;
    if !is_completable(&state.corp.active_quests[index], def) {
        return Err(ActionError::QuestIncomplete(quest_id.clone()));
    }

    state.corp.active_quests.remove(index);
    state.corp.completed_quests.push(quest_id.clone());

    let money = def.reward_money * content.constants.economy_multiplier;
    if money > 0.0 {
        state.player.money += money;
        crate::record_transaction(state, TransactionKind::QuestReward, money, def.title.clone());
    }
    adjust_corp_reputation(&mut state.corp.reputations, &def.corp_id, def.reward_reputation);

    let mut rank_change = None;
    if let Some(membership) = state.corp.membership.as_mut().filter(|m| m.corp_id == def.corp_id) {
        membership.xp = membership.xp.saturating_add(def.reward_corp_xp);
        let rank = membership_rank_for_xp(membership.xp);
        if rank != membership.rank {
            membership.rank = rank;
            rank_change = Some(Event::CorpRankChanged {
                corp_id: membership.corp_id.clone(),
                rank,
            });
        }
    }

    push_event(state, events, Event::CorpQuestCollected { quest_id: quest_id.clone() });
    if let Some(event) = rank_change {
        push_event(state, events, event);
    }
    Ok(())
}

/// Credit `amount` toward every active objective of `kind`, capped at target.
pub(crate) fn advance_objectives(
    state: &mut GameState,
    content: &GameContent,
    kind: ObjectiveKind,
    amount: f64,
) {
    for active in &mut state.corp.active_quests {
        let Some(def) = quest_def(content, &active.quest_id) else {
            continue;
        };
        for (objective, progress) in def.objectives.iter().zip(active.progress.iter_mut()) {
            if objective.kind == kind {
                *progress = (*progress + amount).min(f64::from(objective.target));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state};

    fn corp(id: &str) -> CorpId {
        CorpId::from(id)
    }

    fn quest(id: &str) -> CorpQuestId {
        CorpQuestId::from(id)
    }

    #[test]
    fn join_then_second_join_is_rejected() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut events = Vec::new();
        join(&mut state, &content, &corp("corp_nexus"), &mut events).unwrap();
        assert_eq!(
            join(&mut state, &content, &corp("corp_helix"), &mut events),
            Err(ActionError::AlreadyMember(corp("corp_nexus")))
        );
    }

    #[test]
    fn join_requires_minimum_reputation() {
        let content = base_content();
        let mut state = base_state(&content);
        adjust_corp_reputation(&mut state.corp.reputations, &corp("corp_nexus"), -11);
        let result = join(&mut state, &content, &corp("corp_nexus"), &mut Vec::new());
        assert!(matches!(result, Err(ActionError::ReputationTooLow { reputation: -11, .. })));

        adjust_corp_reputation(&mut state.corp.reputations, &corp("corp_nexus"), 1);
        assert!(join(&mut state, &content, &corp("corp_nexus"), &mut Vec::new()).is_ok());
    }

    #[test]
    fn leave_penalty_scales_with_rank() {
        let content = base_content();
        let mut state = base_state(&content);
        join(&mut state, &content, &corp("corp_nexus"), &mut Vec::new()).unwrap();
        if let Some(membership) = state.corp.membership.as_mut() {
            membership.rank = MembershipRank::Specialist;
        }
        leave(&mut state, &content, &mut Vec::new()).unwrap();
        assert!(state.corp.membership.is_none());
        assert_eq!(state.corp.reputation_with(&corp("corp_nexus")), -30);
        assert_eq!(leave(&mut state, &content, &mut Vec::new()), Err(ActionError::NotMember));
    }

    #[test]
    fn quest_limit_and_duplicates() {
        let content = base_content();
        let mut state = base_state(&content);
        join(&mut state, &content, &corp("corp_nexus"), &mut Vec::new()).unwrap();
        for id in ["nx_lines", "nx_sales", "nx_hacks"] {
            accept_quest(&mut state, &content, &quest(id), &mut Vec::new()).unwrap();
        }
        assert_eq!(
            accept_quest(&mut state, &content, &quest("nx_lines"), &mut Vec::new()),
            Err(ActionError::DuplicateQuest(quest("nx_lines")))
        );
        assert_eq!(
            accept_quest(&mut state, &content, &quest("nx_release"), &mut Vec::new()),
            Err(ActionError::QuestLimitReached { max: MAX_ACTIVE_QUESTS })
        );
    }

    #[test]
    fn quest_from_other_corp_needs_membership() {
        let content = base_content();
        let mut state = base_state(&content);
        join(&mut state, &content, &corp("corp_nexus"), &mut Vec::new()).unwrap();
        assert_eq!(
            accept_quest(&mut state, &content, &quest("hx_lines"), &mut Vec::new()),
            Err(ActionError::NotMember)
        );
    }

    #[test]
    fn collect_requires_every_objective() {
        let content = base_content();
        let mut state = base_state(&content);
        join(&mut state, &content, &corp("corp_nexus"), &mut Vec::new()).unwrap();
        accept_quest(&mut state, &content, &quest("nx_lines"), &mut Vec::new()).unwrap();
        assert_eq!(
            collect_quest(&mut state, &content, &quest("nx_lines"), &mut Vec::new()),
            Err(ActionError::QuestIncomplete(quest("nx_lines")))
        );

        advance_objectives(&mut state, &content, ObjectiveKind::WriteLines, 10_000.0);
        let money_before = state.player.money;
        collect_quest(&mut state, &content, &quest("nx_lines"), &mut Vec::new()).unwrap();

        assert!(state.corp.active_quests.is_empty());
        assert_eq!(state.corp.completed_quests, vec![quest("nx_lines")]);
        assert!((state.player.money - money_before - 250.0).abs() < 1e-9);
        let membership = state.corp.membership.as_ref().unwrap();
        assert_eq!(membership.xp, 120);
        assert_eq!(membership.rank, MembershipRank::Associate);
        // Collected quests cannot be accepted again.
        assert_eq!(
            accept_quest(&mut state, &content, &quest("nx_lines"), &mut Vec::new()),
            Err(ActionError::DuplicateQuest(quest("nx_lines")))
        );
    }

    #[test]
    fn objectives_cap_at_target() {
        let content = base_content();
        let mut state = base_state(&content);
        join(&mut state, &content, &corp("corp_nexus"), &mut Vec::new()).unwrap();
        accept_quest(&mut state, &content, &quest("nx_sales"), &mut Vec::new()).unwrap();
        advance_objectives(&mut state, &content, ObjectiveKind::SellItems, 5.0);
        advance_objectives(&mut state, &content, ObjectiveKind::WriteLines, 5.0);
        assert!((state.corp.active_quests[0].progress[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn leaving_drops_that_corps_quests() {
        let content = base_content();
        let mut state = base_state(&content);
        join(&mut state, &content, &corp("corp_nexus"), &mut Vec::new()).unwrap();
        accept_quest(&mut state, &content, &quest("nx_lines"), &mut Vec::new()).unwrap();
        leave(&mut state, &content, &mut Vec::new()).unwrap();
        assert!(state.corp.active_quests.is_empty());
    }
}
