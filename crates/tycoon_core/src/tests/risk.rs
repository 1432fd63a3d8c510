use super::*;

#[test]
fn trace_builds_slowly_and_decays_twice_as_fast() {
    let content = base_content();
    let mut state = base_state(&content);
    equip_new(&mut state, &content, "cracked_nic");
    let mut rng = never_rng();

    run_ticks(&mut state, &content, &mut rng, 10);
    assert!((state.risk.trace_percent - 0.5).abs() < 1e-9);

    run(&mut state, &content, &mut rng, Command::Unequip { slot: HardwareType::Network }).unwrap();
    run_ticks(&mut state, &content, &mut rng, 5);
    assert!(state.risk.trace_percent.abs() < 1e-9);
}

#[test]
fn raid_fines_half_and_resets_trace() {
    let content = base_content();
    let mut state = base_state(&content);
    state.risk.trace_percent = 95.0;
    let events = tick(&mut state, &content, &mut test_fixtures::always_rng(), NOW_MS);

    assert!(events
        .iter()
        .any(|e| matches!(e.event, Event::CorporateRaid { fine } if (fine - 500.0).abs() < 1e-9)));
    assert!((state.player.money - 500.0).abs() < 1e-9);
    assert!(state.risk.trace_percent.abs() < 1e-12);
    assert!(matches!(
        state.player.blocking_modal,
        Some(Modal::CorporateRaid { .. })
    ));
}

#[test]
fn no_raid_below_threshold() {
    let content = base_content();
    let mut state = base_state(&content);
    state.risk.trace_percent = 90.0;
    let events = tick(&mut state, &content, &mut test_fixtures::always_rng(), NOW_MS);
    assert!(!events
        .iter()
        .any(|e| matches!(e.event, Event::CorporateRaid { .. })));
}

#[test]
fn heat_never_decays_below_floor() {
    let content = base_content();
    let mut state = base_state(&content);
    state.risk.global_heat = 12.0;
    run_ticks(&mut state, &content, &mut test_fixtures::always_rng(), 5);
    assert!((state.risk.global_heat - crate::risk::HEAT_FLOOR).abs() < 1e-12);
}

#[test]
fn conversion_worsens_with_heat() {
    let content = base_content();
    let mut cool = base_state(&content);
    let mut hot = base_state(&content);
    hot.risk.global_heat = 100.0;
    let convert = Command::ConvertCurrency { amount: 100.0 };
    run(&mut cool, &content, &mut make_rng(), convert.clone()).unwrap();
    run(&mut hot, &content, &mut make_rng(), convert).unwrap();
    assert!(cool.player.shadow_credits > hot.player.shadow_credits);
    assert!((hot.player.money - 900.0).abs() < 1e-9);
}
