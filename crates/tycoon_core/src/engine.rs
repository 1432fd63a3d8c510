use rand::Rng;

use crate::economy::{self, clamp_credit};
use crate::risk::{self, RAID_KEEP_FRACTION};
use crate::thermal::{self, ThermalStep};
use crate::world_events::{self, MarketShift};
use crate::{
    compute_stats, Action, ActionError, Bill, BillId, Clock, Email, Event, EventEnvelope,
    GameContent, GameState, ObjectiveKind, PlayerRole, SignalWindow, Stats, TransactionKind, Uid,
};

/// Game hours per tick: one real second is one game minute.
pub const HOURS_PER_TICK: f64 = 1.0 / 60.0;
pub const HOURS_PER_DAY: f64 = 24.0;

pub const CRUNCH_MULTIPLIER: f64 = 1.5;
/// Auto-code stalls at or below this energy.
pub const AUTO_CODE_MIN_ENERGY: f64 = 5.0;
pub const ENERGY_DRAIN_BASE: f64 = 0.05;
pub const ENERGY_DRAIN_HEAT_SCALE: f64 = 500.0;
/// Per-trial bug probability is `bug_chance` times this.
pub const AUTO_BUG_FACTOR: f64 = 0.1;
pub const ENERGY_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockAdvance {
    pub day: u32,
    pub time_of_day: f64,
    /// Number of midnights crossed.
    pub days_elapsed: u32,
}

impl ClockAdvance {
    pub fn day_changed(&self) -> bool {
        self.days_elapsed > 0
    }
}

/// Advance the clock by `hours`, wrapping at midnight. Non-finite or
/// negative advances leave the clock where it is.
pub fn advance_clock(clock: &Clock, hours: f64) -> ClockAdvance {
    let hours = if hours.is_finite() && hours > 0.0 { hours } else { 0.0 };
    let total = clock.time_of_day + hours;
    let whole_days = (total / HOURS_PER_DAY).floor();
    // Float-to-int `as` saturates; absurd advances pin at u32::MAX days.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let days_elapsed = whole_days as u32;
    let time_of_day = total.rem_euclid(HOURS_PER_DAY);
    ClockAdvance {
        day: clock.day.saturating_add(days_elapsed),
        time_of_day,
        days_elapsed,
    }
}

/// Apply one action. `Tick` never fails; player commands are atomic.
pub fn apply(
    state: &mut GameState,
    action: &Action,
    content: &GameContent,
    rng: &mut impl Rng,
    now_ms: u64,
) -> Result<Vec<EventEnvelope>, ActionError> {
    match action {
        Action::Tick => Ok(tick(state, content, rng, now_ms)),
        Action::Player(command) => crate::apply_command(state, command, content, rng, now_ms),
    }
}

/// Advance the simulation by one tick.
///
/// Order of operations:
/// 1. Advance the clock.
/// 2. Recompute stats and step the rig temperature.
/// 3. Accumulate auto-code, roll bugs, drain energy.
/// 4. Passive income; on a new day the power bill, overdue bills and ad revenue.
/// 5. Decay global heat.
/// 6. Update trace.
/// 7. Roll for a corporate raid.
/// 8. Walk the market.
/// 9. Maybe open an encrypted signal.
/// 10. Maybe deliver an email.
///
/// Steps 3-10 read the pre-tick snapshot plus the clock and thermal result of
/// steps 1-2; none observes another's output. Everything is folded into the
/// state in one commit, then achievements run on the committed state and the
/// tick counter increments.
pub fn tick(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    now_ms: u64,
) -> Vec<EventEnvelope> {
    tick_by(state, content, rng, now_ms, HOURS_PER_TICK)
}

/// `tick` with an explicit clock advance.
pub fn tick_by(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    now_ms: u64,
    hours: f64,
) -> Vec<EventEnvelope> {
    let delta = plan(state, content, rng, now_ms, hours);
    let mut events = Vec::new();
    commit(state, delta, content, &mut events);

    for event in crate::evaluate_achievements(state, content) {
        crate::push_event(state, &mut events, event);
    }

    state.meta.tick += 1;
    events
}

/// Everything one tick changes, computed from the pre-tick snapshot.
#[derive(Debug)]
struct TickDelta {
    clock: ClockAdvance,
    thermal: ThermalStep,
    lines_generated: f64,
    energy: f64,
    global_bug: bool,
    project_bug: bool,
    income: f64,
    bill: Option<Bill>,
    overdue: Vec<BillId>,
    overdue_penalty: i32,
    ad_revenue: f64,
    heat: f64,
    trace: f64,
    raid: bool,
    market: Option<MarketShift>,
    signal_expired: bool,
    shadow_access_expired: bool,
    signal: Option<SignalWindow>,
    email: Option<Email>,
    wear: Vec<(Uid, f64)>,
}

fn plan(
    prev: &GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    now_ms: u64,
    hours: f64,
) -> TickDelta {
    let constants = &content.constants;
    let player = &prev.player;

    // 1-2: sequenced context shared by the remaining steps.
    let clock = advance_clock(&prev.clock, hours);
    let stats = compute_stats(&player.equipped, &player.inventory, &player.unlocked_perks, content);
    let thermal = thermal::step(player.temperature, &stats);

    // 3
    let (lines_generated, energy) = auto_code(prev, &stats, &thermal, content);
    let bug_probability = stats.bug_chance * AUTO_BUG_FACTOR;
    let global_roll = crate::roll(rng, bug_probability);
    let project_roll = crate::roll(rng, bug_probability);
    let coded = lines_generated > 0.0;

    // 4
    let income = economy::passive_income(prev, content, thermal.is_overheating);
    let (bill, overdue, ad_revenue) = if clock.day_changed() {
        let amount = economy::daily_bill_amount(&stats, constants);
        (
            Some(economy::issue_bill(prev, clock.day, amount, constants)),
            economy::overdue_bills(prev, clock.day),
            economy::ad_revenue(prev, content, rng),
        )
    } else {
        (None, Vec::new(), 0.0)
    };

    // 5-7
    let heat = risk::decayed_heat(prev.risk.global_heat, rng);
    let illegal = risk::illegal_equipped(&player.equipped, &player.inventory, content);
    let trace = risk::next_trace(prev.risk.trace_percent, illegal);
    let raid = risk::raid_triggered(prev.risk.trace_percent, rng);

    // 8-10
    let market = world_events::market_shift(prev, clock.day, rng);
    let signal = world_events::signal(prev, now_ms, rng);
    let email = world_events::email(prev, clock.day, rng);

    TickDelta {
        clock,
        thermal,
        lines_generated,
        energy,
        global_bug: coded && global_roll,
        project_bug: coded && project_roll && player.active_project.is_some(),
        income,
        bill,
        overdue,
        overdue_penalty: constants.overdue_credit_penalty,
        ad_revenue,
        heat,
        trace,
        raid,
        market,
        signal_expired: prev
            .inbox
            .signal
            .as_ref()
            .is_some_and(|s| s.expires_at_ms <= now_ms),
        shadow_access_expired: prev
            .inbox
            .shadow_access_until_ms
            .is_some_and(|until| until <= now_ms),
        signal,
        email,
        wear: crate::wear::overheat_wear(prev, thermal.is_overheating, constants),
    }
}

/// Lines generated this tick and the resulting energy level.
fn auto_code(
    prev: &GameState,
    stats: &Stats,
    thermal: &ThermalStep,
    content: &GameContent,
) -> (f64, f64) {
    let player = &prev.player;
    if stats.auto_code <= 0.0 || player.energy <= AUTO_CODE_MIN_ENERGY {
        return (0.0, player.energy);
    }
    let crunch = if player.crunch_mode { CRUNCH_MULTIPLIER } else { 1.0 };
    let role = if player.role == PlayerRole::Coder {
        1.0 + content.constants.coder_speed_bonus
    } else {
        1.0
    };
    let generated = stats.auto_code * crunch * thermal.efficiency * role;
    let drain = ENERGY_DRAIN_BASE + stats.heat_gen / ENERGY_DRAIN_HEAT_SCALE;
    (generated, (player.energy - drain).clamp(0.0, ENERGY_MAX))
}

#[allow(clippy::too_many_lines)]
fn commit(
    state: &mut GameState,
    delta: TickDelta,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    // 1
    state.clock.day = delta.clock.day;
    state.clock.time_of_day = delta.clock.time_of_day;
    if delta.clock.day_changed() {
        crate::push_event(state, events, Event::DayStarted { day: delta.clock.day });
    }

    // 2
    let was_overheating = state.player.is_overheating;
    state.player.temperature = delta.thermal.temperature;
    state.player.is_overheating = delta.thermal.is_overheating;
    match (was_overheating, delta.thermal.is_overheating) {
        (false, true) => crate::push_event(
            state,
            events,
            Event::OverheatStarted { temperature: delta.thermal.temperature },
        ),
        (true, false) => crate::push_event(
            state,
            events,
            Event::OverheatEnded { temperature: delta.thermal.temperature },
        ),
        _ => {}
    }
    for (uid, durability) in delta.wear {
        let Some(item) = state.player.item_mut(&uid) else {
            continue;
        };
        let was_working = item.durability > 0.0;
        item.durability = durability;
        if was_working && durability <= 0.0 {
            crate::push_event(state, events, Event::ItemBroken { uid });
        }
    }

    // 3
    state.player.energy = delta.energy;
    if delta.lines_generated > 0.0 {
        state.player.lines_of_code += delta.lines_generated;
        if let Some(project) = state.player.active_project.as_mut() {
            project.progress += delta.lines_generated;
        }
        crate::corp::advance_objectives(
            state,
            content,
            ObjectiveKind::WriteLines,
            delta.lines_generated,
        );
    }
    if delta.global_bug {
        state.player.total_bugs += 1;
    }
    if delta.project_bug {
        let project = state.player.active_project.as_mut().map(|project| {
            project.bugs += 1;
            project.id.clone()
        });
        crate::push_event(state, events, Event::BugIntroduced { project });
    } else if delta.global_bug {
        crate::push_event(state, events, Event::BugIntroduced { project: None });
    }

    // 4
    state.player.money += delta.income;
    if let Some(bill) = delta.bill {
        state.counters.next_bill_id += 1;
        let (bill_id, amount) = (bill.id.clone(), bill.amount);
        state.finance.bills.push(bill);
        crate::push_event(state, events, Event::BillIssued { bill_id, amount });
    }
    for bill_id in delta.overdue {
        state.finance.credit_score =
            clamp_credit(state.finance.credit_score.saturating_sub(delta.overdue_penalty));
        let credit_score = state.finance.credit_score;
        crate::push_event(state, events, Event::BillOverdue { bill_id, credit_score });
    }
    if delta.ad_revenue > 0.0 {
        state.player.money += delta.ad_revenue;
        crate::record_transaction(
            state,
            TransactionKind::AdRevenue,
            delta.ad_revenue,
            "App ad revenue",
        );
        crate::push_event(state, events, Event::AdRevenue { amount: delta.ad_revenue });
    }

    // 5-6
    state.risk.global_heat = delta.heat;
    state.risk.trace_percent = delta.trace;

    // 7
    if delta.raid {
        let fine = state.player.money.max(0.0) * (1.0 - RAID_KEEP_FRACTION);
        state.player.money -= fine;
        state.risk.trace_percent = 0.0;
        state.player.blocking_modal = Some(crate::Modal::CorporateRaid { fine });
        crate::record_transaction(
            state,
            TransactionKind::RaidFine,
            -fine,
            "Corporate raid settlement",
        );
        crate::push_event(state, events, Event::CorporateRaid { fine });
    }

    // 8
    if let Some(shift) = delta.market {
        state.market.trends.insert(shift.category, shift.multiplier);
        crate::push_event(
            state,
            events,
            Event::MarketShift {
                category: shift.category,
                multiplier: shift.multiplier,
                delta: shift.delta,
            },
        );
        if let Some(item) = shift.news {
            let headline = item.headline.clone();
            world_events::push_news(&mut state.market.news, item);
            crate::push_event(state, events, Event::NewsPublished { headline });
        }
    }

    // 9
    if delta.signal_expired {
        state.inbox.signal = None;
        crate::push_event(state, events, Event::SignalExpired);
    }
    if delta.shadow_access_expired {
        state.inbox.shadow_access_until_ms = None;
    }
    if let Some(window) = delta.signal {
        let expires_at_ms = window.expires_at_ms;
        state.inbox.signal = Some(window);
        crate::push_event(state, events, Event::SignalDetected { expires_at_ms });
    }

    // 10
    if let Some(email) = delta.email {
        state.counters.next_email_id += 1;
        let (email_id, kind) = (email.id.clone(), email.kind);
        world_events::push_email(&mut state.inbox.emails, email);
        crate::push_event(state, events, Event::EmailReceived { email_id, kind });
    }
}
