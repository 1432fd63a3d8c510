//! Shared test fixtures for tycoon_core and downstream crates.
//!
//! `base_content()` is a small but complete catalog: a handful of parts
//! covering every slot behaviour the rules care about, one perk of each kind,
//! two corporations with quests, a three-step console chain, one lab quest,
//! one blueprint and a few achievements. Constants are the defaults.
//! `minimal_content()` is the empty catalog for validation tests.

use std::collections::BTreeMap;

use rand::rngs::mock::StepRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    AchievementCondition, AchievementDef, BlueprintDef, BlueprintInput, ConsoleQuestDef,
    Constants, CorpId, CorpQuestDef, CorporationDef, EffectKind, GameContent, GameState,
    HardwareType, InventoryItem, ItemDef, ItemEffect, ItemId, LabQuestDef, MetaState,
    MembershipRank, ObjectiveDef, ObjectiveKind, PerkDef, PerkEffect, PerkId, PerkKind,
    PlayerId, PlayerState, Project, ProjectId, ProjectKind, Uid, SCHEMA_VERSION,
};

fn item(
    id: &str,
    slot: Option<HardwareType>,
    base_cost: f64,
    effects: &[(EffectKind, f64)],
) -> ItemDef {
    ItemDef {
        id: ItemId::from(id),
        name: id.replace('_', " "),
        slot,
        base_cost,
        effects: effects
            .iter()
            .map(|&(kind, value)| ItemEffect { kind, value })
            .collect(),
        is_illegal: false,
    }
}

fn perk(id: &str, cost: i64, kind: PerkKind, value: f64) -> (PerkId, PerkDef) {
    (
        PerkId::from(id),
        PerkDef {
            id: PerkId::from(id),
            name: id.trim_start_matches("perk_").replace('_', " "),
            cost,
            effect: PerkEffect { kind, value },
        },
    )
}

fn corp_quest(
    id: &str,
    corp: &str,
    kind: ObjectiveKind,
    target: u32,
    reward_money: f64,
    reward_corp_xp: u32,
) -> CorpQuestDef {
    CorpQuestDef {
        id: id.into(),
        corp_id: CorpId::from(corp),
        title: id.replace('_', " "),
        min_rank: MembershipRank::Recruit,
        objectives: vec![ObjectiveDef { kind, target }],
        reward_money,
        reward_reputation: 5,
        reward_corp_xp,
    }
}

fn console_quest(
    id: &str,
    accepts: &[&str],
    reward_money: f64,
    reward_xp: u64,
    gateway: bool,
) -> ConsoleQuestDef {
    ConsoleQuestDef {
        id: id.into(),
        title: id.replace('_', " "),
        accepts: accepts.iter().map(|s| (*s).to_string()).collect(),
        reward_money,
        reward_xp,
        gateway,
    }
}

pub fn base_content() -> GameContent {
    use EffectKind::{AutoCode, BugResist, ClickPower, Cooling, Heat};

    let mut cracked_nic = item(
        "cracked_nic",
        Some(HardwareType::Network),
        60.0,
        &[(AutoCode, 2.0)],
    );
    cracked_nic.is_illegal = true;

    let items = [
        item(
            "basic_cpu",
            Some(HardwareType::Cpu),
            100.0,
            &[(ClickPower, 1.0), (AutoCode, 1.0), (Heat, 10.0)],
        ),
        item("basic_cooler", Some(HardwareType::Cooler), 80.0, &[(Cooling, 20.0)]),
        item("linter_ram", Some(HardwareType::Ram), 150.0, &[(BugResist, 0.2)]),
        item(
            "overclocked_cpu",
            Some(HardwareType::Cpu),
            400.0,
            &[(ClickPower, 3.0), (AutoCode, 3.0), (Heat, 40.0)],
        ),
        // Runs hot enough to overheat any rig within a tick.
        item(
            "furnace_gpu",
            Some(HardwareType::Gpu),
            300.0,
            &[(AutoCode, 5.0), (Heat, 500.0)],
        ),
        cracked_nic,
        item("tool_flasher", None, 50.0, &[]),
    ]
    .into_iter()
    .map(|def| (def.id.clone(), def))
    .collect::<BTreeMap<_, _>>();

    GameContent {
        content_version: "test".to_string(),
        items,
        perks: BTreeMap::from([
            perk("perk_fast_fingers", 10, PerkKind::ClickBoost, 0.5),
            perk("perk_macro_keys", 20, PerkKind::ClickBoost, 0.2),
            perk("perk_code_review", 50, PerkKind::BugReduction, 0.9),
            perk("perk_miner", 100, PerkKind::Miner, 0.5),
        ]),
        corporations: vec![
            CorporationDef {
                id: CorpId::from("corp_nexus"),
                name: "Nexus Dynamics".to_string(),
            },
            CorporationDef {
                id: CorpId::from("corp_helix"),
                name: "Helix Biotech".to_string(),
            },
        ],
        corp_quests: vec![
            corp_quest("nx_lines", "corp_nexus", ObjectiveKind::WriteLines, 500, 250.0, 120),
            corp_quest("nx_sales", "corp_nexus", ObjectiveKind::SellItems, 2, 100.0, 40),
            corp_quest("nx_hacks", "corp_nexus", ObjectiveKind::SuccessfulHacks, 3, 150.0, 60),
            corp_quest("nx_release", "corp_nexus", ObjectiveKind::ReleaseProjects, 1, 300.0, 80),
            corp_quest("hx_lines", "corp_helix", ObjectiveKind::WriteLines, 300, 200.0, 100),
        ],
        console_quests: vec![
            console_quest("cq_help", &["help"], 50.0, 10, false),
            console_quest("cq_gateway", &["connect darknet"], 0.0, 0, true),
            console_quest("cq_scan", &["nmap *"], 100.0, 20, false),
        ],
        lab_quests: vec![LabQuestDef {
            id: "lab_firmware".into(),
            title: "Dump the router firmware".to_string(),
            reward_items: vec![ItemId::from("tool_flasher")],
        }],
        blueprints: vec![BlueprintDef {
            id: "bp_overclocked_cpu".into(),
            output: ItemId::from("overclocked_cpu"),
            inputs: vec![BlueprintInput {
                item_id: ItemId::from("basic_cpu"),
                count: 2,
            }],
            money_cost: 50.0,
            base_success: 0.6,
        }],
        achievements: vec![
            AchievementDef {
                id: "ach_first_grand".into(),
                name: "Five figures soon".to_string(),
                condition: AchievementCondition::MoneyAtLeast { amount: 5000.0 },
            },
            AchievementDef {
                id: "ach_hello_world".into(),
                name: "Hello, world".to_string(),
                condition: AchievementCondition::LinesOfCodeAtLeast { lines: 100.0 },
            },
            AchievementDef {
                id: "ach_first_hack".into(),
                name: "In".to_string(),
                condition: AchievementCondition::SuccessfulHacksAtLeast { count: 1 },
            },
        ],
        constants: Constants::default(),
    }
}

/// No catalog entries at all; default constants.
pub fn minimal_content() -> GameContent {
    GameContent {
        content_version: "minimal".to_string(),
        ..GameContent::default()
    }
}

/// Fresh player: 1000 money, 200 shadow credits, empty rig, day 1.
pub fn base_state(content: &GameContent) -> GameState {
    GameState {
        meta: MetaState {
            tick: 0,
            seed: 42,
            schema_version: SCHEMA_VERSION,
            content_version: content.content_version.clone(),
            player_id: PlayerId::from("player_test"),
        },
        player: PlayerState {
            money: 1000.0,
            shadow_credits: 200.0,
            ..PlayerState::default()
        },
        ..GameState::default()
    }
}

/// Put one unit of `item_id` in the inventory without touching the RNG.
pub fn give_item(state: &mut GameState, item_id: &str, is_stolen: bool) -> Uid {
    state.counters.next_item_serial += 1;
    let uid = Uid(format!("item_{:06}", state.counters.next_item_serial));
    state.player.inventory.push(InventoryItem {
        uid: uid.clone(),
        item_id: ItemId::from(item_id),
        is_stolen,
        durability: 100.0,
    });
    uid
}

/// A released project earning `base_revenue` per game hour.
pub fn released_project(name: &str, complexity: u32, base_revenue: f64) -> Project {
    let constants = Constants::default();
    Project {
        id: ProjectId(format!("proj_{name}")),
        name: name.to_string(),
        kind: ProjectKind::App,
        complexity,
        progress: f64::from(complexity) * constants.lines_per_complexity,
        target_lines: f64::from(complexity) * constants.lines_per_complexity,
        bugs: 0,
        base_revenue,
        revenue_per_visitor: constants.revenue_per_visitor,
        released_day: Some(1),
    }
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

/// Every `f64` draw is 0.0: each roll succeeds and ranges yield their low end.
pub fn always_rng() -> StepRng {
    StepRng::new(0, 0)
}

/// Every `f64` draw is just below 1.0: each roll fails.
pub fn never_rng() -> StepRng {
    StepRng::new(u64::MAX, 0)
}
