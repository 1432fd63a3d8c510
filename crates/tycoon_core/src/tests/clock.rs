use super::*;

fn bills_after(steps: &[f64]) -> (GameState, Vec<Event>) {
    let content = base_content();
    let mut state = base_state(&content);
    let mut events = Vec::new();
    for hours in steps {
        let fired = tick_by(&mut state, &content, &mut never_rng(), NOW_MS, *hours);
        events.extend(fired.into_iter().map(|e| e.event));
    }
    (state, events)
}

#[test]
fn one_full_day_matches_two_partial_steps() {
    let (single, single_events) = bills_after(&[24.0]);
    let (split, split_events) = bills_after(&[10.0, 14.0]);

    assert_eq!(single.clock.day, 2);
    assert_eq!(split.clock.day, 2);
    assert!((single.clock.time_of_day - split.clock.time_of_day).abs() < 1e-9);
    assert_eq!(single.finance.bills, split.finance.bills);
    assert_eq!(single.finance.bills.len(), 1);

    let day_starts = |events: &[Event]| {
        events
            .iter()
            .filter(|e| matches!(e, Event::DayStarted { .. }))
            .count()
    };
    assert_eq!(day_starts(&single_events), 1);
    assert_eq!(day_starts(&split_events), 1);
}

#[test]
fn skipping_several_days_issues_one_bill() {
    let (state, _) = bills_after(&[72.0]);
    assert_eq!(state.clock.day, 4);
    assert_eq!(state.finance.bills.len(), 1);
    assert_eq!(state.finance.bills[0].issued_day, 4);
}

#[test]
fn clock_wraps_and_ignores_bad_input() {
    let clock = Clock {
        day: 3,
        time_of_day: 23.5,
    };
    let advance = advance_clock(&clock, 1.0);
    assert_eq!(advance.day, 4);
    assert!((advance.time_of_day - 0.5).abs() < 1e-12);
    assert!(advance.day_changed());

    for bad in [f64::NAN, f64::INFINITY, -3.0] {
        let advance = advance_clock(&clock, bad);
        assert_eq!(advance.day, 3);
        assert!(!advance.day_changed());
    }
}

#[test]
fn huge_advances_finish_and_saturate() {
    let clock = Clock {
        day: 3,
        time_of_day: 6.0,
    };
    let week = advance_clock(&clock, 24.0 * 7.0 + 2.0);
    assert_eq!(week.day, 10);
    assert_eq!(week.days_elapsed, 7);
    assert!((week.time_of_day - 8.0).abs() < 1e-9);

    let absurd = advance_clock(&clock, 1e20);
    assert_eq!(absurd.day, u32::MAX);
    assert!((0.0..24.0).contains(&absurd.time_of_day));
}

#[test]
fn unpaid_bills_hurt_credit_after_due_day() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = never_rng();
    // Day 2 issues a bill due on day 5; nothing is overdue before day 6.
    for _ in 0..4 {
        tick_by(&mut state, &content, &mut rng, NOW_MS, 24.0);
    }
    assert_eq!(state.clock.day, 5);
    assert_eq!(state.finance.credit_score, 650);

    tick_by(&mut state, &content, &mut rng, NOW_MS, 24.0);
    assert_eq!(state.finance.credit_score, 645);
}

#[test]
fn paying_a_bill_on_time_removes_it() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = never_rng();
    tick_by(&mut state, &content, &mut rng, NOW_MS, 24.0);
    let bill = state.finance.bills[0].clone();
    run(&mut state, &content, &mut rng, Command::PayBill { bill_id: bill.id }).unwrap();
    assert!(state.finance.bills.is_empty());
    assert!((state.player.money - (1000.0 - bill.amount)).abs() < 1e-9);
    assert_eq!(state.finance.credit_score, 652);
}

#[test]
fn released_apps_earn_ad_revenue_on_day_change() {
    let content = base_content();
    let mut state = base_state(&content);
    state
        .player
        .released_projects
        .push(test_fixtures::released_project("blog", 10, 0.0));
    let events = tick_by(&mut state, &content, &mut make_rng(), NOW_MS, 24.0);
    assert!(events
        .iter()
        .any(|e| matches!(e.event, Event::AdRevenue { amount } if amount > 0.0)));
}
