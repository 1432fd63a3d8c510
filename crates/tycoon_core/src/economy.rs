//! Passive income, daily billing and app ad revenue.
//!
//! Everything here reads the pre-tick snapshot and returns amounts; the
//! engine folds them into the committed state.

use rand::Rng;

use crate::{Bill, BillId, Constants, GameContent, GameState, Stats};

/// Ticks per game hour. Project revenue is quoted per hour.
pub const TICKS_PER_HOUR: f64 = 60.0;
/// Visitors per point of project complexity.
pub const VISITORS_PER_COMPLEXITY: f64 = 0.5;
pub const AD_JITTER_MIN: f64 = 0.8;
pub const AD_JITTER_MAX: f64 = 1.2;
pub const CREDIT_SCORE_MIN: i32 = 300;
pub const CREDIT_SCORE_MAX: i32 = 850;

/// Money earned this tick without player input.
pub fn passive_income(prev: &GameState, content: &GameContent, overheating: bool) -> f64 {
    let revenue: f64 = prev
        .player
        .released_projects
        .iter()
        .map(|project| project.base_revenue)
        .sum();
    let mut income = revenue / TICKS_PER_HOUR * content.constants.economy_multiplier;
    if !overheating {
        income += crate::stats::miner_income(&prev.player.unlocked_perks, content);
    }
    income
}

/// Amount of the daily electricity and network bill.
pub fn daily_bill_amount(stats: &Stats, constants: &Constants) -> f64 {
    (stats.heat_gen * constants.electricity_rate).floor() + constants.base_internet_cost
}

pub(crate) fn issue_bill(
    prev: &GameState,
    new_day: u32,
    amount: f64,
    constants: &Constants,
) -> Bill {
    Bill {
        id: BillId(format!("bill_{:04}", prev.counters.next_bill_id)),
        description: format!("Power & network, day {}", new_day.saturating_sub(1)),
        amount,
        issued_day: new_day,
        due_day: new_day + constants.bill_due_days,
        paid: false,
    }
}

/// Ad revenue across every released project for one day. Draws one jitter
/// value per project, in release order.
pub fn ad_revenue(prev: &GameState, content: &GameContent, rng: &mut impl Rng) -> f64 {
    let total: f64 = prev
        .player
        .released_projects
        .iter()
        .map(|project| {
            let visitors = (f64::from(project.complexity) * VISITORS_PER_COMPLEXITY).floor();
            let jitter = rng.gen_range(AD_JITTER_MIN..=AD_JITTER_MAX);
            visitors * jitter * project.revenue_per_visitor
        })
        .sum();
    total * content.constants.economy_multiplier
}

/// Unpaid bills whose due day has passed as of `day`.
pub fn overdue_bills(prev: &GameState, day: u32) -> Vec<BillId> {
    prev.finance
        .bills
        .iter()
        .filter(|bill| !bill.paid && bill.due_day < day)
        .map(|bill| bill.id.clone())
        .collect()
}

pub fn clamp_credit(score: i32) -> i32 {
    score.clamp(CREDIT_SCORE_MIN, CREDIT_SCORE_MAX)
}
