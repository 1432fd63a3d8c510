//! Threshold tables mapping raw counters to derived ranks.
//!
//! Every function here is pure and monotone in its input. Callers recompute
//! derived ranks immediately after the underlying counter changes.

use crate::{
    CorpId, CorpStanding, CorporationReputation, Event, GameState, HackStats, HackerRank,
    MembershipRank, PlayerTier,
};

/// Minimum reputation for each tier, in tier order.
pub const TIER_THRESHOLDS: [(i64, PlayerTier); 6] = [
    (0, PlayerTier::Trainee),
    (100, PlayerTier::Junior),
    (500, PlayerTier::Mid),
    (1500, PlayerTier::Senior),
    (4000, PlayerTier::Lead),
    (10_000, PlayerTier::Architect),
];

/// Minimum corp XP for each membership rank.
pub const MEMBERSHIP_XP_THRESHOLDS: [(u32, MembershipRank); 5] = [
    (0, MembershipRank::Recruit),
    (100, MembershipRank::Associate),
    (300, MembershipRank::Specialist),
    (700, MembershipRank::Executive),
    (1500, MembershipRank::Director),
];

pub const CORP_REPUTATION_MIN: i32 = -100;
pub const CORP_REPUTATION_MAX: i32 = 100;

pub fn tier_for_reputation(reputation: i64) -> PlayerTier {
    TIER_THRESHOLDS
        .iter()
        .rev()
        .find(|(min, _)| reputation >= *min)
        .map_or(PlayerTier::Trainee, |(_, tier)| *tier)
}

pub fn tier_index(tier: PlayerTier) -> usize {
    TIER_THRESHOLDS
        .iter()
        .position(|(_, t)| *t == tier)
        .unwrap_or(0)
}

pub fn standing_for(reputation: i32) -> CorpStanding {
    match reputation {
        r if r < -50 => CorpStanding::Hostile,
        r if r < -10 => CorpStanding::Distrusted,
        r if r < 10 => CorpStanding::Neutral,
        r if r < 50 => CorpStanding::Trusted,
        _ => CorpStanding::Allied,
    }
}

pub fn membership_rank_for_xp(xp: u32) -> MembershipRank {
    MEMBERSHIP_XP_THRESHOLDS
        .iter()
        .rev()
        .find(|(min, _)| xp >= *min)
        .map_or(MembershipRank::Recruit, |(_, rank)| *rank)
}

pub fn rank_index(rank: MembershipRank) -> usize {
    MEMBERSHIP_XP_THRESHOLDS
        .iter()
        .position(|(_, r)| *r == rank)
        .unwrap_or(0)
}

/// Running hacker rank from cumulative hack totals and the current streak.
pub fn hacker_rank(stats: &HackStats) -> HackerRank {
    let successes = stats.successful_hacks;
    let ratio = if stats.total_hacks == 0 {
        0.0
    } else {
        f64::from(successes) / f64::from(stats.total_hacks)
    };
    if successes >= 100 && ratio >= 0.8 && stats.best_streak >= 20 {
        HackerRank::Legend
    } else if successes >= 50 && ratio >= 0.7 {
        HackerRank::Ghost
    } else if successes >= 20 && ratio >= 0.5 {
        HackerRank::Phreaker
    } else if successes >= 5 {
        HackerRank::Cracker
    } else {
        HackerRank::ScriptKiddie
    }
}

/// Apply a reputation delta and recompute the tier. Returns a `TierChanged`
/// event when the tier moved.
pub(crate) fn adjust_reputation(state: &mut GameState, delta: i64) -> Option<Event> {
    state.player.reputation = state.player.reputation.saturating_add(delta);
    refresh_tier(state)
}

pub(crate) fn refresh_tier(state: &mut GameState) -> Option<Event> {
    let tier = tier_for_reputation(state.player.reputation);
    if tier == state.player.tier {
        return None;
    }
    state.player.tier = tier;
    Some(Event::TierChanged { tier })
}

/// Shift reputation with one corporation, clamped to `-100..=100`, creating
/// the entry on first contact.
pub(crate) fn adjust_corp_reputation(
    reps: &mut Vec<CorporationReputation>,
    corp_id: &CorpId,
    delta: i32,
) {
    let entry = match reps.iter().position(|r| r.corp_id == *corp_id) {
        Some(index) => &mut reps[index],
        None => {
            reps.push(CorporationReputation {
                corp_id: corp_id.clone(),
                reputation: 0,
                standing: CorpStanding::Neutral,
            });
            let last = reps.len() - 1;
            &mut reps[last]
        }
    };
    entry.reputation = entry
        .reputation
        .saturating_add(delta)
        .clamp(CORP_REPUTATION_MIN, CORP_REPUTATION_MAX);
    entry.standing = standing_for(entry.reputation);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds_are_inclusive() {
        assert_eq!(tier_for_reputation(-5), PlayerTier::Trainee);
        assert_eq!(tier_for_reputation(99), PlayerTier::Trainee);
        assert_eq!(tier_for_reputation(100), PlayerTier::Junior);
        assert_eq!(tier_for_reputation(1500), PlayerTier::Senior);
        assert_eq!(tier_for_reputation(1_000_000), PlayerTier::Architect);
    }

    #[test]
    fn tier_is_monotone_and_idempotent() {
        let mut previous = tier_for_reputation(-1000);
        for reputation in (-1000..12_000).step_by(7) {
            let tier = tier_for_reputation(reputation);
            assert!(tier >= previous, "tier dropped at {reputation}");
            assert_eq!(tier, tier_for_reputation(reputation));
            previous = tier;
        }
    }

    #[test]
    fn standings_cover_the_reputation_range() {
        assert_eq!(standing_for(-100), CorpStanding::Hostile);
        assert_eq!(standing_for(-50), CorpStanding::Distrusted);
        assert_eq!(standing_for(-10), CorpStanding::Neutral);
        assert_eq!(standing_for(10), CorpStanding::Trusted);
        assert_eq!(standing_for(50), CorpStanding::Allied);
    }

    #[test]
    fn membership_rank_follows_xp() {
        assert_eq!(membership_rank_for_xp(0), MembershipRank::Recruit);
        assert_eq!(membership_rank_for_xp(299), MembershipRank::Associate);
        assert_eq!(membership_rank_for_xp(1500), MembershipRank::Director);
        assert_eq!(rank_index(MembershipRank::Specialist), 2);
    }

    #[test]
    fn hacker_rank_needs_ratio_as_well_as_volume() {
        let sloppy = HackStats {
            total_hacks: 200,
            successful_hacks: 60,
            streak: 0,
            best_streak: 3,
            rank: HackerRank::ScriptKiddie,
        };
        assert_eq!(hacker_rank(&sloppy), HackerRank::Cracker);

        let clean = HackStats {
            total_hacks: 60,
            successful_hacks: 55,
            ..sloppy
        };
        assert_eq!(hacker_rank(&clean), HackerRank::Ghost);
    }

    #[test]
    fn corp_reputation_is_clamped_and_standing_tracks_it() {
        let mut reps = Vec::new();
        let corp = CorpId::from("corp_a");
        adjust_corp_reputation(&mut reps, &corp, 250);
        assert_eq!(reps[0].reputation, CORP_REPUTATION_MAX);
        assert_eq!(reps[0].standing, CorpStanding::Allied);
        adjust_corp_reputation(&mut reps, &corp, -400);
        assert_eq!(reps[0].reputation, CORP_REPUTATION_MIN);
        assert_eq!(reps[0].standing, CorpStanding::Hostile);
    }

    #[test]
    fn adjust_reputation_reports_tier_change_once() {
        let mut state = GameState::default();
        assert_eq!(
            adjust_reputation(&mut state, 120),
            Some(Event::TierChanged { tier: PlayerTier::Junior })
        );
        assert_eq!(adjust_reputation(&mut state, 10), None);
        assert_eq!(state.player.tier, PlayerTier::Junior);
    }
}
