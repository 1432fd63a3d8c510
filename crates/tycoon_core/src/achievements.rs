use crate::{AchievementCondition, Event, GameContent, GameState};

fn met(condition: &AchievementCondition, state: &GameState) -> bool {
    let player = &state.player;
    match condition {
        AchievementCondition::MoneyAtLeast { amount } => player.money >= *amount,
        AchievementCondition::LinesOfCodeAtLeast { lines } => player.lines_of_code >= *lines,
        AchievementCondition::ReputationAtLeast { reputation } => player.reputation >= *reputation,
        AchievementCondition::SuccessfulHacksAtLeast { count } => {
            player.hack_stats.successful_hacks >= *count
        }
        AchievementCondition::ProjectsReleasedAtLeast { count } => {
            player.released_projects.len() >= *count
        }
        AchievementCondition::DayAtLeast { day } => state.clock.day >= *day,
        AchievementCondition::TierAtLeast { tier } => player.tier >= *tier,
    }
}

/// Unlock every achievement whose condition holds on the committed state.
/// Unlocks are permanent; returns one event per newly unlocked achievement.
pub fn evaluate_achievements(state: &mut GameState, content: &GameContent) -> Vec<Event> {
    let newly: Vec<_> = content
        .achievements
        .iter()
        .filter(|def| !state.player.achievements.contains(&def.id))
        .filter(|def| met(&def.condition, state))
        .map(|def| def.id.clone())
        .collect();
    newly
        .into_iter()
        .map(|achievement_id| {
            state.player.achievements.insert(achievement_id.clone());
            Event::AchievementUnlocked { achievement_id }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state};
    use crate::AchievementId;

    #[test]
    fn unlocks_once() {
        let content = base_content();
        let mut state = base_state(&content);
        state.player.money = 10_000.0;
        let first = evaluate_achievements(&mut state, &content);
        assert!(first.contains(&Event::AchievementUnlocked {
            achievement_id: AchievementId::from("ach_first_grand")
        }));
        assert!(evaluate_achievements(&mut state, &content).is_empty());
    }

    #[test]
    fn unlock_survives_condition_lapsing() {
        let content = base_content();
        let mut state = base_state(&content);
        state.player.money = 10_000.0;
        evaluate_achievements(&mut state, &content);
        state.player.money = 0.0;
        evaluate_achievements(&mut state, &content);
        assert!(state
            .player
            .achievements
            .contains(&AchievementId::from("ach_first_grand")));
    }
}
