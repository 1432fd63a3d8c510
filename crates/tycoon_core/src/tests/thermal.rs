use super::*;

#[test]
fn overheating_throttles_auto_code_fivefold() {
    let content = base_content();
    let mut state = base_state(&content);
    equip_new(&mut state, &content, "furnace_gpu");
    let mut rng = never_rng();

    run_ticks(&mut state, &content, &mut rng, 5);
    assert!(state.player.is_overheating);
    assert!(state.player.temperature > crate::thermal::OVERHEAT_THRESHOLD);

    let player = &state.player;
    let stats =
        compute_stats(&player.equipped, &player.inventory, &player.unlocked_perks, &content);
    let unthrottled = stats.auto_code * (1.0 + content.constants.coder_speed_bonus);

    let before = state.player.lines_of_code;
    tick(&mut state, &content, &mut rng, NOW_MS);
    let generated = state.player.lines_of_code - before;
    assert!((generated * 5.0 - unthrottled).abs() < 1e-9);
}

#[test]
fn overheat_edges_emit_events() {
    let content = base_content();
    let mut state = base_state(&content);
    let gpu = equip_new(&mut state, &content, "furnace_gpu");
    let mut rng = never_rng();

    let events = tick(&mut state, &content, &mut rng, NOW_MS);
    assert!(events
        .iter()
        .any(|e| matches!(e.event, Event::OverheatStarted { .. })));

    run(&mut state, &content, &mut rng, Command::Unequip { slot: HardwareType::Gpu }).unwrap();
    let mut cooled = false;
    for _ in 0..200 {
        let events = tick(&mut state, &content, &mut rng, NOW_MS);
        if events
            .iter()
            .any(|e| matches!(e.event, Event::OverheatEnded { .. }))
        {
            cooled = true;
            break;
        }
    }
    assert!(cooled);
    assert!(!state.player.is_overheating);
    // The unit only wore while it was equipped and hot.
    let durability = state.player.item(&gpu).unwrap().durability;
    assert!(durability < 100.0 && durability > 99.0);
}

#[test]
fn sustained_overheating_breaks_parts() {
    let content = base_content();
    let mut state = base_state(&content);
    let gpu = equip_new(&mut state, &content, "furnace_gpu");
    state.player.item_mut(&gpu).unwrap().durability = 0.1;
    let mut rng = never_rng();

    let mut broke = false;
    for _ in 0..5 {
        let events = tick(&mut state, &content, &mut rng, NOW_MS);
        broke |= events
            .iter()
            .any(|e| matches!(&e.event, Event::ItemBroken { uid } if *uid == gpu));
    }
    assert!(broke);
    // A broken part stops heating the rig.
    let player = &state.player;
    let stats =
        compute_stats(&player.equipped, &player.inventory, &player.unlocked_perks, &content);
    assert!(stats.heat_gen.abs() < 1e-12);

    run(&mut state, &content, &mut rng, Command::Repair { uid: gpu.clone() }).unwrap();
    assert!((state.player.item(&gpu).unwrap().durability - 100.0).abs() < 1e-12);
}
