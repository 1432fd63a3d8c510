use serde::{Deserialize, Serialize};
use tycoon_core::corp::{is_completable, JOIN_MIN_REPUTATION, MAX_ACTIVE_QUESTS};
use tycoon_core::progression::tier_index;
use tycoon_core::thermal::{target_temperature, OVERHEAT_THRESHOLD};
use tycoon_core::wear::{is_broken, repair_cost};
use tycoon_core::{
    compute_stats, purchase_cost, Command, EffectKind, GameContent, GameState, HardwareType,
    InventoryItem, ItemDef, ProjectKind, Uid,
};

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        now_ms: u64,
    ) -> Vec<Command>;
}

/// Plays a career headless. Each call looks at one snapshot and emits, in
/// order:
/// 1. Dismiss a blocking modal.
/// 2. Pay unpaid bills, oldest due first.
/// 3. Repair broken equipped parts, top up low energy, drop crunch when hot.
/// 4. Equip idle parts, sell superseded spares, buy at most one upgrade.
/// 5. Unlock the cheapest affordable perk.
/// 6. Start, type on, or release the active project.
/// 7. Join a corporation, collect finished quests, accept new ones.
///
/// Later steps budget against what earlier steps already spent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutopilotController {
    /// `WriteCode` commands per call.
    pub clicks_per_tick: u32,
    /// Money never spent on upgrades or perks.
    pub cash_reserve: f64,
    /// Recharge once energy falls below this.
    pub low_energy: f64,
    /// Headroom kept below the overheat threshold when choosing parts.
    pub thermal_margin: f64,
}

impl Default for AutopilotController {
    fn default() -> Self {
        Self {
            clicks_per_tick: 3,
            cash_reserve: 100.0,
            low_energy: 25.0,
            thermal_margin: 15.0,
        }
    }
}

/// Fraction of a part's list price asked when selling a spare.
const SPARE_RESALE_FACTOR: f64 = 0.5;
/// An upgrade is bought only while money covers this many times its price.
const UPGRADE_BUDGET_FACTOR: f64 = 2.0;

/// How much a part helps the rig; heat only counts against it via the
/// thermal check.
fn part_score(def: &ItemDef) -> f64 {
    def.effects
        .iter()
        .map(|effect| match effect.kind {
            EffectKind::ClickPower => effect.value,
            EffectKind::AutoCode => effect.value * 2.0,
            EffectKind::BugResist => effect.value * 10.0,
            EffectKind::Cooling => effect.value * 0.1,
            EffectKind::Heat => 0.0,
        })
        .sum()
}

fn equipped_def<'a>(
    state: &GameState,
    content: &'a GameContent,
    slot: HardwareType,
) -> Option<&'a ItemDef> {
    let uid = state.player.equipped.get(&slot)?;
    let unit = state.player.item(uid)?;
    content.items.get(&unit.item_id)
}

fn equipped_score(state: &GameState, content: &GameContent, slot: HardwareType) -> f64 {
    equipped_def(state, content, slot).map_or(0.0, part_score)
}

impl AutopilotController {
    /// Whether the rig stays clear of overheating with `def` in its slot.
    fn runs_cool_with(&self, state: &GameState, content: &GameContent, def: &ItemDef) -> bool {
        let Some(slot) = def.slot else {
            return false;
        };
        let candidate = Uid::from("autopilot_candidate");
        let mut inventory = state.player.inventory.clone();
        inventory.push(InventoryItem {
            uid: candidate.clone(),
            item_id: def.id.clone(),
            is_stolen: false,
            durability: 100.0,
        });
        let mut equipped = state.player.equipped.clone();
        equipped.insert(slot, candidate);
        let stats = compute_stats(&equipped, &inventory, &state.player.unlocked_perks, content);
        target_temperature(&stats) < OVERHEAT_THRESHOLD - self.thermal_margin
    }

    fn maintenance(
        &self,
        state: &GameState,
        content: &GameContent,
        budget: &mut f64,
        out: &mut Vec<Command>,
    ) {
        let mut bills: Vec<_> = state.finance.bills.iter().filter(|b| !b.paid).collect();
        bills.sort_by_key(|b| (b.due_day, b.id.clone()));
        for bill in bills {
            if bill.amount <= *budget + self.cash_reserve {
                *budget -= bill.amount;
                out.push(Command::PayBill {
                    bill_id: bill.id.clone(),
                });
            }
        }

        for uid in state.player.equipped.values() {
            let Some(unit) = state.player.item(uid) else {
                continue;
            };
            let cost = repair_cost(unit, &content.constants);
            if is_broken(unit) && cost <= *budget {
                *budget -= cost;
                out.push(Command::Repair { uid: uid.clone() });
            }
        }

        let player = &state.player;
        if player.energy < self.low_energy {
            let points = tycoon_core::ENERGY_MAX - player.energy;
            let cost = points * content.constants.energy_price_per_point;
            if cost <= *budget {
                *budget -= cost;
                out.push(Command::Recharge { amount: points });
            }
        }
        if player.crunch_mode && player.is_overheating {
            out.push(Command::SetCrunch { enabled: false });
        }
    }

    fn hardware(
        &self,
        state: &GameState,
        content: &GameContent,
        budget: &mut f64,
        out: &mut Vec<Command>,
    ) {
        let player = &state.player;
        let mut claimed: Vec<HardwareType> = Vec::new();

        // Idle, working parts that beat what is in their slot.
        for unit in &player.inventory {
            if player.is_equipped(&unit.uid) || is_broken(unit) || unit.is_stolen {
                continue;
            }
            let Some(def) = content.items.get(&unit.item_id) else {
                continue;
            };
            let Some(slot) = def.slot else {
                continue;
            };
            if claimed.contains(&slot) || part_score(def) <= equipped_score(state, content, slot) {
                continue;
            }
            if self.runs_cool_with(state, content, def) {
                claimed.push(slot);
                out.push(Command::Equip {
                    uid: unit.uid.clone(),
                });
            }
        }
        if !claimed.is_empty() {
            return;
        }

        // Spares that lost their slot to something better.
        for unit in &player.inventory {
            if player.is_equipped(&unit.uid) || unit.is_stolen {
                continue;
            }
            let Some(def) = content.items.get(&unit.item_id) else {
                continue;
            };
            let Some(slot) = def.slot else {
                continue;
            };
            if part_score(def) <= equipped_score(state, content, slot) {
                out.push(Command::Sell {
                    uid: unit.uid.clone(),
                    value: def.base_cost * SPARE_RESALE_FACTOR * state.market.trend(slot),
                });
            }
        }

        // One upgrade: the biggest improvement per unit of money.
        let best = content
            .items
            .values()
            .filter(|def| !def.is_illegal)
            .filter_map(|def| {
                let slot = def.slot?;
                let gain = part_score(def) - equipped_score(state, content, slot);
                let cost = purchase_cost(def, state, false, &content.constants);
                (gain > 0.0 && cost * UPGRADE_BUDGET_FACTOR <= *budget)
                    .then_some((def, gain / cost.max(1.0), cost))
            })
            .filter(|(def, _, _)| self.runs_cool_with(state, content, def))
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.id.cmp(&a.0.id)));
        if let Some((def, _, cost)) = best {
            *budget -= cost;
            out.push(Command::Buy {
                item_id: def.id.clone(),
                shadow: false,
            });
        }
    }

    fn perks(state: &GameState, content: &GameContent, out: &mut Vec<Command>) {
        let cheapest = content
            .perks
            .values()
            .filter(|perk| !state.player.unlocked_perks.contains(&perk.id))
            .filter(|perk| perk.cost <= state.player.reputation)
            .min_by_key(|perk| (perk.cost, perk.id.clone()));
        if let Some(perk) = cheapest {
            out.push(Command::UnlockPerk {
                perk_id: perk.id.clone(),
            });
        }
    }

    fn project(&self, state: &GameState, out: &mut Vec<Command>) {
        match &state.player.active_project {
            None => {
                let complexity = u32::try_from(tier_index(state.player.tier) + 1).unwrap_or(1);
                out.push(Command::StartProject {
                    name: format!("Side project {}", state.counters.next_project_id + 1),
                    kind: ProjectKind::App,
                    complexity,
                });
            }
            Some(project) if project.is_complete() => out.push(Command::ReleaseProject),
            Some(_) => {
                for _ in 0..self.clicks_per_tick {
                    out.push(Command::WriteCode);
                }
            }
        }
    }

    fn corporation(state: &GameState, content: &GameContent, out: &mut Vec<Command>) {
        let Some(membership) = &state.corp.membership else {
            let friendliest = content
                .corporations
                .iter()
                .map(|corp| (state.corp.reputation_with(&corp.id), corp))
                .filter(|(reputation, _)| *reputation >= JOIN_MIN_REPUTATION)
                .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.id.cmp(&a.1.id)));
            if let Some((_, corp)) = friendliest {
                out.push(Command::JoinCorp {
                    corp_id: corp.id.clone(),
                });
            }
            return;
        };

        let mut active = state.corp.active_quests.len();
        for quest in &state.corp.active_quests {
            let done = content
                .corp_quests
                .iter()
                .find(|def| def.id == quest.quest_id)
                .is_some_and(|def| is_completable(quest, def));
            if done {
                active -= 1;
                out.push(Command::CollectCorpQuest {
                    quest_id: quest.quest_id.clone(),
                });
            }
        }

        for def in &content.corp_quests {
            if active >= MAX_ACTIVE_QUESTS {
                break;
            }
            let taken = state.corp.active_quests.iter().any(|a| a.quest_id == def.id)
                || state.corp.completed_quests.contains(&def.id);
            if def.corp_id == membership.corp_id && membership.rank >= def.min_rank && !taken {
                active += 1;
                out.push(Command::AcceptCorpQuest {
                    quest_id: def.id.clone(),
                });
            }
        }
    }
}

impl CommandSource for AutopilotController {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        _now_ms: u64,
    ) -> Vec<Command> {
        let mut commands = Vec::new();
        if state.player.blocking_modal.is_some() {
            commands.push(Command::DismissModal);
        }
        let mut budget = state.player.money - self.cash_reserve;

        self.maintenance(state, content, &mut budget, &mut commands);
        self.hardware(state, content, &mut budget, &mut commands);
        Self::perks(state, content, &mut commands);
        self.project(state, &mut commands);
        Self::corporation(state, content, &mut commands);
        commands
    }
}
