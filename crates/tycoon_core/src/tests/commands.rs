use super::*;

#[test]
fn buy_equip_sell_last_unit() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();

    let events = run(
        &mut state,
        &content,
        &mut rng,
        Command::Buy {
            item_id: ItemId::from("basic_cpu"),
            shadow: false,
        },
    )
    .unwrap();
    assert!((state.player.money - 900.0).abs() < 1e-9);
    assert_eq!(state.player.inventory.len(), 1);
    let unit = state.player.inventory[0].clone();
    assert!(!unit.is_stolen);
    assert!(matches!(
        &events[0].event,
        Event::ItemPurchased { uid, .. } if *uid == unit.uid
    ));

    run(&mut state, &content, &mut rng, Command::Equip { uid: unit.uid.clone() }).unwrap();
    assert_eq!(state.player.equipped.get(&HardwareType::Cpu), Some(&unit.uid));

    let result = run(
        &mut state,
        &content,
        &mut rng,
        Command::Sell {
            uid: unit.uid.clone(),
            value: 80.0,
        },
    );
    assert_eq!(result, Err(ActionError::ItemEquipped(unit.uid.clone())));
    assert!((state.player.money - 900.0).abs() < 1e-9);
    assert_eq!(state.player.inventory.len(), 1);
}

#[test]
fn selling_equipped_unit_swaps_in_spare() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();
    let equipped = equip_new(&mut state, &content, "basic_cpu");
    let spare = give_item(&mut state, "basic_cpu", false);

    run(
        &mut state,
        &content,
        &mut rng,
        Command::Sell {
            uid: equipped,
            value: 80.0,
        },
    )
    .unwrap();
    assert_eq!(state.player.equipped.get(&HardwareType::Cpu), Some(&spare));
    assert!((state.player.money - 1080.0).abs() < 1e-9);
    assert_equipped_owned(&state);
}

#[test]
fn shadow_purchase_taint_and_cleaning() {
    let content = base_content();
    let mut state = base_state(&content);
    state.inbox.black_market_unlocked = true;
    let mut rng = make_rng();

    run(
        &mut state,
        &content,
        &mut rng,
        Command::Buy {
            item_id: ItemId::from("basic_cpu"),
            shadow: true,
        },
    )
    .unwrap();
    assert!((state.player.shadow_credits - 150.0).abs() < 1e-9);
    assert!((state.risk.global_heat - 15.0).abs() < 1e-9);
    assert!((state.player.money - 1000.0).abs() < 1e-9);
    let uid = state.player.inventory[0].uid.clone();
    assert!(state.player.inventory[0].is_stolen);

    let sell = Command::Sell {
        uid: uid.clone(),
        value: 40.0,
    };
    assert_eq!(
        run(&mut state, &content, &mut rng, sell.clone()),
        Err(ActionError::StolenGoods(uid.clone()))
    );

    // Cleaning needs the flasher tool.
    assert_eq!(
        run(&mut state, &content, &mut rng, Command::CleanItem { uid: uid.clone() }),
        Err(ActionError::MissingTool(ItemId::from("tool_flasher")))
    );
    run(
        &mut state,
        &content,
        &mut rng,
        Command::Buy {
            item_id: ItemId::from("tool_flasher"),
            shadow: false,
        },
    )
    .unwrap();
    run(&mut state, &content, &mut rng, Command::CleanItem { uid: uid.clone() }).unwrap();
    let cleaned = state.player.item(&uid).unwrap();
    assert!(!cleaned.is_stolen);
    assert!((cleaned.durability - 100.0).abs() < 1e-12);

    run(&mut state, &content, &mut rng, sell).unwrap();
    assert!(state.player.item(&uid).is_none());
    assert!((state.player.money - 990.0).abs() < 1e-9);
}

#[test]
fn shadow_market_locked_until_unlocked_or_signal_answered() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();
    let buy = Command::Buy {
        item_id: ItemId::from("basic_cpu"),
        shadow: true,
    };
    assert_eq!(
        run(&mut state, &content, &mut rng, buy.clone()),
        Err(ActionError::BlackMarketLocked)
    );

    state.inbox.signal = Some(SignalWindow {
        opened_at_ms: NOW_MS,
        expires_at_ms: NOW_MS + 90_000,
    });
    run(&mut state, &content, &mut rng, Command::AnswerSignal).unwrap();
    run(&mut state, &content, &mut rng, buy).unwrap();
}

#[test]
fn stolen_gate_leaves_state_untouched() {
    let content = base_content();
    let mut state = base_state(&content);
    let uid = give_item(&mut state, "basic_cooler", true);
    let before = snapshot_json(&state);
    let result = run(
        &mut state,
        &content,
        &mut make_rng(),
        Command::Sell { uid, value: 1_000.0 },
    );
    assert!(matches!(result, Err(ActionError::StolenGoods(_))));
    assert_eq!(snapshot_json(&state), before);
}

#[test]
fn failed_commands_are_atomic() {
    let content = base_content();
    let mut state = base_state(&content);
    state.player.money = 10.0;
    let before = snapshot_json(&state);
    let mut rng = make_rng();

    let failures = [
        Command::Buy {
            item_id: ItemId::from("basic_cpu"),
            shadow: false,
        },
        Command::Unequip {
            slot: HardwareType::Cpu,
        },
        Command::PayBill {
            bill_id: BillId::from("bill_9999"),
        },
        Command::ReleaseProject,
        Command::Craft {
            blueprint_id: BlueprintId::from("bp_overclocked_cpu"),
        },
        Command::LeaveCorp,
        Command::StartProject {
            name: "   ".into(),
            kind: ProjectKind::App,
            complexity: 3,
        },
    ];
    for command in failures {
        assert!(run(&mut state, &content, &mut rng, command.clone()).is_err(), "{command:?}");
        assert_eq!(snapshot_json(&state), before, "{command:?} mutated state");
    }
}

#[test]
fn equip_invariant_holds_over_random_sequences() {
    let content = base_content();
    let mut state = base_state(&content);
    state.player.money = 1_000_000.0;
    let mut rng = make_rng();
    let mut picker = ChaCha8Rng::seed_from_u64(7);
    let catalog = ["basic_cpu", "basic_cooler", "linter_ram", "overclocked_cpu"];

    for _ in 0..500 {
        let inventory: Vec<Uid> = state.player.inventory.iter().map(|i| i.uid.clone()).collect();
        let command = match picker.gen_range(0..3) {
            0 => Command::Buy {
                item_id: ItemId::from(catalog[picker.gen_range(0..catalog.len())]),
                shadow: false,
            },
            _ if inventory.is_empty() => continue,
            1 => Command::Equip {
                uid: inventory[picker.gen_range(0..inventory.len())].clone(),
            },
            _ => Command::Sell {
                uid: inventory[picker.gen_range(0..inventory.len())].clone(),
                value: 10.0,
            },
        };
        let _ = run(&mut state, &content, &mut rng, command);
        assert_equipped_owned(&state);
    }
}

#[test]
fn perk_unlock_spends_reputation_once() {
    let content = base_content();
    let mut state = base_state(&content);
    state.player.reputation = 30;
    let mut rng = make_rng();
    let unlock = Command::UnlockPerk {
        perk_id: PerkId::from("perk_macro_keys"),
    };

    let events = run(&mut state, &content, &mut rng, unlock.clone()).unwrap();
    assert_eq!(state.player.reputation, 10);
    assert!(events
        .iter()
        .any(|e| matches!(e.event, Event::PerkUnlocked { .. })));

    // Owned already: silently ignored.
    assert!(run(&mut state, &content, &mut rng, unlock).unwrap().is_empty());
    assert_eq!(state.player.reputation, 10);

    // Unaffordable: also ignored.
    let events = run(
        &mut state,
        &content,
        &mut rng,
        Command::UnlockPerk {
            perk_id: PerkId::from("perk_code_review"),
        },
    )
    .unwrap();
    assert!(events.is_empty());
}

#[test]
fn project_lifecycle_through_commands() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = never_rng();
    run(
        &mut state,
        &content,
        &mut rng,
        Command::StartProject {
            name: "Portfolio".into(),
            kind: ProjectKind::Website,
            complexity: 1,
        },
    )
    .unwrap();
    for _ in 0..100 {
        run(&mut state, &content, &mut rng, Command::WriteCode).unwrap();
    }
    run(&mut state, &content, &mut rng, Command::ReleaseProject).unwrap();
    assert_eq!(state.player.released_projects.len(), 1);
    assert_eq!(state.player.reputation, 1);
    assert!(state.files.get("/projects/proj_0000/README.md").is_some());
}

#[test]
fn file_commands_mirror_into_tree() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();
    let events = run(
        &mut state,
        &content,
        &mut rng,
        Command::SaveFile {
            path: "/notes/todo.txt".into(),
            content: "buy ram".into(),
        },
    )
    .unwrap();
    assert!(!events.is_empty());
    run(
        &mut state,
        &content,
        &mut rng,
        Command::RenameFile {
            from: "/notes/todo.txt".into(),
            to: "/notes/done.txt".into(),
        },
    )
    .unwrap();
    assert!(state.files.get("/notes/done.txt").is_some());
    assert!(state.files.get("/notes/todo.txt").is_none());
    run(
        &mut state,
        &content,
        &mut rng,
        Command::DeleteFile {
            path: "/notes".into(),
            recursive: true,
        },
    )
    .unwrap();
    assert!(state.files.get("/notes").is_none());
}

#[test]
fn dismissing_raid_modal() {
    let content = base_content();
    let mut state = base_state(&content);
    state.player.blocking_modal = Some(Modal::CorporateRaid { fine: 10.0 });
    let events = run(&mut state, &content, &mut make_rng(), Command::DismissModal).unwrap();
    assert!(state.player.blocking_modal.is_none());
    assert_eq!(events[0].event, Event::ModalDismissed);
}

#[test]
fn chatty_events_are_debug_level() {
    let content = base_content();
    let mut state = base_state(&content);
    let events = run(
        &mut state,
        &content,
        &mut make_rng(),
        Command::SaveFile {
            path: "/notes/a.txt".into(),
            content: "x".into(),
        },
    )
    .unwrap();
    assert!(events.iter().all(|e| e.event.level() == EventLevel::Debug));
    assert_eq!(Event::DayStarted { day: 2 }.level(), EventLevel::Normal);
    assert!(EventLevel::Normal < EventLevel::Debug);
}
