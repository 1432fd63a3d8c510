//! Content catalogs: JSON files under the content directory, checked for
//! cross-references before the simulation ever sees them.

use anyhow::{ensure, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tycoon_core::{
    AchievementDef, BlueprintDef, ConsoleQuestDef, Constants, CorpQuestDef, CorporationDef,
    GameContent, ItemDef, ItemId, LabQuestDef, PerkDef,
};

#[derive(Deserialize)]
struct ItemsFile {
    content_version: String,
    items: Vec<ItemDef>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(name)).with_context(|| format!("reading {name}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {name}"))
}

/// Validates cross-references in loaded content.
///
/// Catches mistakes like a quest pointing at an unknown corporation, a
/// blueprint consuming an item that does not exist, or duplicate ids.
pub fn validate_content(content: &GameContent) -> Result<()> {
    let item_known = |id: &ItemId| content.items.contains_key(id);

    for (key, item) in &content.items {
        ensure!(key == &item.id, "item keyed '{key}' declares id '{}'", item.id);
        ensure!(!item.id.0.is_empty(), "item with empty id");
        ensure!(
            item.base_cost.is_finite() && item.base_cost >= 0.0,
            "item '{}' has invalid base cost {}",
            item.id,
            item.base_cost,
        );
    }
    ensure!(
        item_known(&ItemId::from(tycoon_core::CLEANING_TOOL)),
        "cleaning tool '{}' is not a known item",
        tycoon_core::CLEANING_TOOL,
    );
    for id in &content.constants.starter_kit {
        ensure!(item_known(id), "starter kit item '{id}' is not a known item");
        ensure!(
            content.items[id].slot.is_some(),
            "starter kit item '{id}' cannot be equipped"
        );
    }

    for perk in content.perks.values() {
        ensure!(perk.cost >= 0, "perk '{}' has negative cost", perk.id);
    }

    let mut corp_ids = HashSet::new();
    for corp in &content.corporations {
        ensure!(corp_ids.insert(&corp.id), "duplicate corporation '{}'", corp.id);
    }
    let mut quest_ids = HashSet::new();
    for quest in &content.corp_quests {
        ensure!(quest_ids.insert(&quest.id), "duplicate corp quest '{}'", quest.id);
        ensure!(
            corp_ids.contains(&quest.corp_id),
            "corp quest '{}' references unknown corporation '{}'",
            quest.id,
            quest.corp_id,
        );
        ensure!(!quest.objectives.is_empty(), "corp quest '{}' has no objectives", quest.id);
        for objective in &quest.objectives {
            ensure!(objective.target > 0, "corp quest '{}' has a zero target", quest.id);
        }
    }

    for quest in &content.console_quests {
        ensure!(!quest.accepts.is_empty(), "console quest '{}' accepts nothing", quest.id);
    }
    for quest in &content.lab_quests {
        for item in &quest.reward_items {
            ensure!(
                item_known(item),
                "lab quest '{}' rewards unknown item '{item}'",
                quest.id,
            );
        }
    }

    for blueprint in &content.blueprints {
        ensure!(
            item_known(&blueprint.output),
            "blueprint '{}' outputs unknown item '{}'",
            blueprint.id,
            blueprint.output,
        );
        ensure!(
            (0.0..=1.0).contains(&blueprint.base_success),
            "blueprint '{}' success chance {} outside 0..1",
            blueprint.id,
            blueprint.base_success,
        );
        for input in &blueprint.inputs {
            ensure!(
                item_known(&input.item_id),
                "blueprint '{}' consumes unknown item '{}'",
                blueprint.id,
                input.item_id,
            );
        }
    }

    let achievement_ids: BTreeSet<_> = content.achievements.iter().map(|a| &a.id).collect();
    ensure!(
        achievement_ids.len() == content.achievements.len(),
        "duplicate achievement ids"
    );
    Ok(())
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let items_file: ItemsFile = read_json(dir, "items.json")?;
    let perks: Vec<PerkDef> = read_json(dir, "perks.json")?;
    let corporations: Vec<CorporationDef> = read_json(dir, "corporations.json")?;
    let corp_quests: Vec<CorpQuestDef> = read_json(dir, "corp_quests.json")?;
    let console_quests: Vec<ConsoleQuestDef> = read_json(dir, "console_quests.json")?;
    let lab_quests: Vec<LabQuestDef> = read_json(dir, "lab_quests.json")?;
    let blueprints: Vec<BlueprintDef> = read_json(dir, "blueprints.json")?;
    let achievements: Vec<AchievementDef> = read_json(dir, "achievements.json")?;

    let content = GameContent {
        content_version: items_file.content_version,
        items: items_file
            .items
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect::<BTreeMap<_, _>>(),
        perks: perks.into_iter().map(|perk| (perk.id.clone(), perk)).collect(),
        corporations,
        corp_quests,
        console_quests,
        lab_quests,
        blueprints,
        achievements,
        constants,
    };
    validate_content(&content).context("validating content")?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tycoon_core::test_fixtures::{base_content, minimal_content};
    use tycoon_core::{BlueprintInput, CorpId, ObjectiveDef, ObjectiveKind};

    fn error_of(content: &GameContent) -> String {
        format!("{:#}", validate_content(content).unwrap_err())
    }

    #[test]
    fn fixture_content_passes_validation() {
        validate_content(&base_content()).unwrap();
    }

    #[test]
    fn cleaning_tool_must_exist() {
        assert!(error_of(&minimal_content()).contains("cleaning tool"));
    }

    #[test]
    fn quest_with_unknown_corp_fails() {
        let mut content = base_content();
        content.corp_quests.push(CorpQuestDef {
            id: "ghost_quest".into(),
            corp_id: CorpId::from("corp_ghost"),
            title: "Ghost".to_string(),
            min_rank: tycoon_core::MembershipRank::Recruit,
            objectives: vec![ObjectiveDef {
                kind: ObjectiveKind::WriteLines,
                target: 10,
            }],
            reward_money: 0.0,
            reward_reputation: 0,
            reward_corp_xp: 0,
        });
        assert!(error_of(&content).contains("unknown corporation"));
    }

    #[test]
    fn blueprint_with_unknown_input_fails() {
        let mut content = base_content();
        content.blueprints[0].inputs.push(BlueprintInput {
            item_id: ItemId::from("unobtainium"),
            count: 1,
        });
        assert!(error_of(&content).contains("consumes unknown item"));
    }

    #[test]
    fn unequippable_starter_kit_fails() {
        let mut content = base_content();
        content.constants.starter_kit = vec![ItemId::from("tool_flasher")];
        assert!(error_of(&content).contains("cannot be equipped"));
    }

    #[test]
    fn missing_directory_reports_file() {
        let err = load_content("/definitely/not/here").unwrap_err();
        assert!(format!("{err:#}").contains("constants.json"));
    }
}
