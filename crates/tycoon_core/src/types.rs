//! Type definitions for `tycoon_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.
//! Every state struct is `#[serde(default)]` so saves written by older builds
//! load with documented defaults for fields they predate.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::files::{FileChange, FileTree};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(PlayerId);
string_id!(ItemId);
string_id!(Uid);
string_id!(PerkId);
string_id!(CorpId);
string_id!(CorpQuestId);
string_id!(ConsoleQuestId);
string_id!(LabQuestId);
string_id!(BlueprintId);
string_id!(AchievementId);
string_id!(ProjectId);
string_id!(BillId);
string_id!(EmailId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// Hardware slot / market category. One equipped uid per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareType {
    Cpu,
    Gpu,
    Ram,
    Storage,
    Cooler,
    Case,
    Monitor,
    Psu,
    Network,
}

impl HardwareType {
    pub const ALL: [HardwareType; 9] = [
        HardwareType::Cpu,
        HardwareType::Gpu,
        HardwareType::Ram,
        HardwareType::Storage,
        HardwareType::Cooler,
        HardwareType::Case,
        HardwareType::Monitor,
        HardwareType::Psu,
        HardwareType::Network,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HardwareType::Cpu => "CPU",
            HardwareType::Gpu => "GPU",
            HardwareType::Ram => "RAM",
            HardwareType::Storage => "Storage",
            HardwareType::Cooler => "Cooling",
            HardwareType::Case => "Chassis",
            HardwareType::Monitor => "Display",
            HardwareType::Psu => "Power supply",
            HardwareType::Network => "Network gear",
        }
    }
}

/// Career tier, a pure function of reputation (see `progression::tier_for_reputation`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerTier {
    #[default]
    Trainee,
    Junior,
    Mid,
    Senior,
    Lead,
    Architect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    /// Faster auto-code generation.
    #[default]
    Coder,
    /// Discount on legitimate hardware purchases.
    Engineer,
    /// Bonus on legitimate sales.
    Trader,
    /// Bonus on hack payouts.
    Hacker,
}

/// Standing with a corporation, derived from the -100..100 reputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpStanding {
    Hostile,
    Distrusted,
    #[default]
    Neutral,
    Trusted,
    Allied,
}

/// Rank inside a corporation the player is a member of, derived from corp XP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRank {
    #[default]
    Recruit,
    Associate,
    Specialist,
    Executive,
    Director,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HackerRank {
    #[default]
    ScriptKiddie,
    Cracker,
    Phreaker,
    Ghost,
    Legend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    Job,
    Threat,
    Spam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Inflation,
    Deflation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    #[default]
    App,
    Website,
    Library,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Money,
    ShadowCredits,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::Money => f.write_str("money"),
            Currency::ShadowCredits => f.write_str("shadow credits"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Purchase,
    Sale,
    AdRevenue,
    BillPayment,
    Loan,
    LoanRepayment,
    HackReward,
    QuestReward,
    Conversion,
    RaidFine,
    Repair,
    Recharge,
    Crafting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    WriteLines,
    SuccessfulHacks,
    SellItems,
    ReleaseProjects,
}

/// Verbosity of an event for printing and streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Normal,
    Debug,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// The single mutable aggregate. Mutated only through `engine::apply`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub meta: MetaState,
    pub clock: Clock,
    pub player: PlayerState,
    pub finance: FinanceState,
    pub risk: RiskState,
    pub market: MarketState,
    pub inbox: InboxState,
    pub corp: CorpState,
    pub files: FileTree,
    pub counters: Counters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaState {
    pub tick: u64,
    pub seed: u64,
    pub schema_version: u32,
    pub content_version: String,
    pub player_id: PlayerId,
}

/// Simulated time. One tick is one game minute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Clock {
    pub day: u32,
    /// Hours since midnight, `0.0..24.0`.
    pub time_of_day: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            day: 1,
            time_of_day: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub money: f64,
    pub shadow_credits: f64,
    pub reputation: i64,
    pub tier: PlayerTier,
    pub role: PlayerRole,
    pub xp: u64,
    pub energy: f64,
    pub temperature: f64,
    pub is_overheating: bool,
    pub crunch_mode: bool,
    pub lines_of_code: f64,
    pub total_bugs: u64,
    pub inventory: Vec<InventoryItem>,
    pub equipped: BTreeMap<HardwareType, Uid>,
    pub unlocked_perks: BTreeSet<PerkId>,
    pub active_project: Option<Project>,
    pub released_projects: Vec<Project>,
    pub hack_stats: HackStats,
    pub pending_hack: Option<HackContract>,
    /// Index into `GameContent::console_quests` of the next console quest.
    pub quest_index: usize,
    pub completed_lab_quests: BTreeSet<LabQuestId>,
    pub achievements: BTreeSet<AchievementId>,
    pub blocking_modal: Option<Modal>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            money: 0.0,
            shadow_credits: 0.0,
            reputation: 0,
            tier: PlayerTier::Trainee,
            role: PlayerRole::Coder,
            xp: 0,
            energy: 100.0,
            temperature: 30.0,
            is_overheating: false,
            crunch_mode: false,
            lines_of_code: 0.0,
            total_bugs: 0,
            inventory: Vec::new(),
            equipped: BTreeMap::new(),
            unlocked_perks: BTreeSet::new(),
            active_project: None,
            released_projects: Vec::new(),
            hack_stats: HackStats::default(),
            pending_hack: None,
            quest_index: 0,
            completed_lab_quests: BTreeSet::new(),
            achievements: BTreeSet::new(),
            blocking_modal: None,
        }
    }
}

impl PlayerState {
    pub fn item(&self, uid: &Uid) -> Option<&InventoryItem> {
        self.inventory.iter().find(|item| item.uid == *uid)
    }

    pub fn item_mut(&mut self, uid: &Uid) -> Option<&mut InventoryItem> {
        self.inventory.iter_mut().find(|item| item.uid == *uid)
    }

    pub fn is_equipped(&self, uid: &Uid) -> bool {
        self.equipped.values().any(|equipped| equipped == uid)
    }

    pub fn owns_item(&self, item_id: &ItemId) -> bool {
        self.inventory.iter().any(|item| item.item_id == *item_id)
    }
}

/// One physical unit the player owns. Units of the same catalog item are
/// tracked separately so stolen taint is per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub uid: Uid,
    pub item_id: ItemId,
    #[serde(default)]
    pub is_stolen: bool,
    /// `0.0..=100.0`. A unit at 0 is broken and contributes no stats.
    #[serde(default = "full_durability")]
    pub durability: f64,
}

fn full_durability() -> f64 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub kind: ProjectKind,
    pub complexity: u32,
    #[serde(default)]
    pub progress: f64,
    pub target_lines: f64,
    #[serde(default)]
    pub bugs: u32,
    /// Revenue per game hour once released.
    #[serde(default)]
    pub base_revenue: f64,
    #[serde(default)]
    pub revenue_per_visitor: f64,
    #[serde(default)]
    pub released_day: Option<u32>,
}

impl Project {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.target_lines
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackStats {
    pub total_hacks: u32,
    pub successful_hacks: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub rank: HackerRank,
}

/// A hack the player has been handed but not yet resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HackContract {
    pub difficulty: u32,
    /// Resolving this hack successfully unlocks the black market.
    #[serde(default)]
    pub gateway: bool,
}

/// A blocking narrative modal the UI must show before play continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Modal {
    CorporateRaid { fine: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceState {
    pub bills: Vec<Bill>,
    /// Most recent first-in order, capped at `TRANSACTION_HISTORY_CAP`.
    pub transactions: Vec<BankTransaction>,
    pub loan_debt: f64,
    /// `300..=850`.
    pub credit_score: i32,
}

impl Default for FinanceState {
    fn default() -> Self {
        Self {
            bills: Vec::new(),
            transactions: Vec::new(),
            loan_debt: 0.0,
            credit_score: 650,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub description: String,
    pub amount: f64,
    pub issued_day: u32,
    pub due_day: u32,
    #[serde(default)]
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub day: u32,
    pub kind: TransactionKind,
    /// Signed: positive is income.
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskState {
    /// `0.0..=100.0`, never decays below `risk::HEAT_FLOOR`.
    pub global_heat: f64,
    /// `0.0..=100.0`.
    pub trace_percent: f64,
}

impl Default for RiskState {
    fn default() -> Self {
        Self {
            global_heat: 10.0,
            trace_percent: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketState {
    /// Price multiplier per category, `0.5..=2.0`.
    pub trends: BTreeMap<HardwareType, f64>,
    /// Newest last, capped at `world_events::NEWS_CAP`.
    pub news: Vec<NewsItem>,
}

impl Default for MarketState {
    fn default() -> Self {
        Self {
            trends: HardwareType::ALL.iter().map(|t| (*t, 1.0)).collect(),
            news: Vec::new(),
        }
    }
}

impl MarketState {
    pub fn trend(&self, hardware: HardwareType) -> f64 {
        self.trends.get(&hardware).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub day: u32,
    pub category: HardwareType,
    pub direction: TrendDirection,
    pub headline: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InboxState {
    pub emails: Vec<Email>,
    pub signal: Option<SignalWindow>,
    /// Absolute wall-clock expiry of the current shadow-market window.
    pub shadow_access_until_ms: Option<u64>,
    pub black_market_unlocked: bool,
}

impl InboxState {
    pub fn signal_active(&self, now_ms: u64) -> bool {
        self.signal.as_ref().is_some_and(|s| s.expires_at_ms > now_ms)
    }

    pub fn shadow_access_active(&self, now_ms: u64) -> bool {
        self.shadow_access_until_ms.is_some_and(|until| until > now_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub kind: EmailKind,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub day: u32,
    #[serde(default)]
    pub read: bool,
}

/// A time-boxed encrypted signal the player can answer before it expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalWindow {
    pub opened_at_ms: u64,
    pub expires_at_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpState {
    pub reputations: Vec<CorporationReputation>,
    pub membership: Option<CorpMembership>,
    pub active_quests: Vec<ActiveCorpQuest>,
    pub completed_quests: Vec<CorpQuestId>,
}

impl CorpState {
    pub fn reputation_with(&self, corp_id: &CorpId) -> i32 {
        self.reputations
            .iter()
            .find(|r| r.corp_id == *corp_id)
            .map_or(0, |r| r.reputation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporationReputation {
    pub corp_id: CorpId,
    /// `-100..=100`.
    pub reputation: i32,
    #[serde(default)]
    pub standing: CorpStanding,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpMembership {
    pub corp_id: CorpId,
    #[serde(default)]
    pub rank: MembershipRank,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub joined_day: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveCorpQuest {
    pub quest_id: CorpQuestId,
    /// One counter per objective, same order as the quest definition.
    pub progress: SmallVec<[f64; 4]>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_bill_id: u64,
    pub next_email_id: u64,
    pub next_project_id: u64,
    pub next_item_serial: u64,
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

/// Everything that can change a `GameState`. The tick is one action among
/// the player's commands so ordering is explicit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", content = "command", rename_all = "snake_case")]
pub enum Action {
    Tick,
    Player(Command),
}

/// Player-triggered transitions. Each is atomic: it commits entirely or
/// returns an `ActionError` and leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Buy {
        item_id: ItemId,
        #[serde(default)]
        shadow: bool,
    },
    Sell {
        uid: Uid,
        value: f64,
    },
    CleanItem {
        uid: Uid,
    },
    Equip {
        uid: Uid,
    },
    Unequip {
        slot: HardwareType,
    },
    Repair {
        uid: Uid,
    },
    UnlockPerk {
        perk_id: PerkId,
    },
    ConvertCurrency {
        amount: f64,
    },
    ResolveHack {
        difficulty: u32,
        success: bool,
        #[serde(default)]
        lab_quest: Option<LabQuestId>,
    },
    ConsoleSubmit {
        input: String,
    },
    AnswerSignal,
    JoinCorp {
        corp_id: CorpId,
    },
    LeaveCorp,
    AcceptCorpQuest {
        quest_id: CorpQuestId,
    },
    CollectCorpQuest {
        quest_id: CorpQuestId,
    },
    StartProject {
        name: String,
        #[serde(default)]
        kind: ProjectKind,
        complexity: u32,
    },
    WriteCode,
    ReleaseProject,
    SetCrunch {
        enabled: bool,
    },
    PayBill {
        bill_id: BillId,
    },
    TakeLoan {
        amount: f64,
    },
    RepayLoan {
        amount: f64,
    },
    Recharge {
        amount: f64,
    },
    Craft {
        blueprint_id: BlueprintId,
    },
    SaveFile {
        path: String,
        content: String,
    },
    DeleteFile {
        path: String,
        #[serde(default)]
        recursive: bool,
    },
    RenameFile {
        from: String,
        to: String,
    },
    SetRole {
        role: PlayerRole,
    },
    DismissModal,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    DayStarted { day: u32 },
    OverheatStarted { temperature: f64 },
    OverheatEnded { temperature: f64 },
    BugIntroduced { project: Option<ProjectId> },
    BillIssued { bill_id: BillId, amount: f64 },
    BillOverdue { bill_id: BillId, credit_score: i32 },
    BillPaid { bill_id: BillId, amount: f64 },
    AdRevenue { amount: f64 },
    CorporateRaid { fine: f64 },
    MarketShift { category: HardwareType, multiplier: f64, delta: f64 },
    NewsPublished { headline: String },
    SignalDetected { expires_at_ms: u64 },
    SignalExpired,
    SignalCancelled,
    ShadowAccessGranted { until_ms: u64 },
    EmailReceived { email_id: EmailId, kind: EmailKind },
    AchievementUnlocked { achievement_id: AchievementId },
    ItemPurchased { uid: Uid, item_id: ItemId, cost: f64, shadow: bool },
    ItemSold { uid: Uid, amount: f64 },
    ItemCleaned { uid: Uid },
    ItemEquipped { slot: HardwareType, uid: Uid },
    ItemUnequipped { slot: HardwareType },
    ItemRepaired { uid: Uid, cost: f64 },
    ItemBroken { uid: Uid },
    PerkUnlocked { perk_id: PerkId },
    TierChanged { tier: PlayerTier },
    CurrencyConverted { money: f64, shadow_credits: f64 },
    HackStarted { difficulty: u32, gateway: bool },
    HackSucceeded { difficulty: u32, money: f64, shadow_credits: f64, reputation: i64 },
    HackFailed { difficulty: u32 },
    HackerRankChanged { rank: HackerRank },
    BlackMarketUnlocked,
    ConsoleQuestCompleted { quest_id: ConsoleQuestId },
    LabQuestCompleted { quest_id: LabQuestId },
    CorpJoined { corp_id: CorpId },
    CorpLeft { corp_id: CorpId, penalty: i32 },
    CorpRankChanged { corp_id: CorpId, rank: MembershipRank },
    CorpQuestAccepted { quest_id: CorpQuestId },
    CorpQuestCollected { quest_id: CorpQuestId },
    ProjectStarted { project_id: ProjectId },
    ProjectReleased { project_id: ProjectId, base_revenue: f64 },
    CrunchModeChanged { enabled: bool },
    LoanTaken { amount: f64, debt: f64 },
    LoanRepaid { amount: f64, debt: f64 },
    EnergyRecharged { amount: f64 },
    Crafted { blueprint_id: BlueprintId, uid: Uid },
    CraftFailed { blueprint_id: BlueprintId },
    RoleChanged { role: PlayerRole },
    ModalDismissed,
    FileChanged { change: FileChange },
}

impl Event {
    /// Routine bookkeeping is `Debug`; anything a player would notice is `Normal`.
    pub fn level(&self) -> EventLevel {
        match self {
            Event::BugIntroduced { .. }
            | Event::FileChanged { .. }
            | Event::MarketShift { .. }
            | Event::ItemEquipped { .. }
            | Event::ItemUnequipped { .. }
            | Event::EnergyRecharged { .. }
            | Event::CrunchModeChanged { .. }
            | Event::ModalDismissed => EventLevel::Debug,
            _ => EventLevel::Normal,
        }
    }
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameContent {
    pub content_version: String,
    pub items: BTreeMap<ItemId, ItemDef>,
    pub perks: BTreeMap<PerkId, PerkDef>,
    pub corporations: Vec<CorporationDef>,
    pub corp_quests: Vec<CorpQuestDef>,
    pub console_quests: Vec<ConsoleQuestDef>,
    pub lab_quests: Vec<LabQuestDef>,
    pub blueprints: Vec<BlueprintDef>,
    pub achievements: Vec<AchievementDef>,
    pub constants: Constants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    /// `None` for tools and crafting parts that cannot be equipped.
    #[serde(default)]
    pub slot: Option<HardwareType>,
    pub base_cost: f64,
    #[serde(default)]
    pub effects: Vec<ItemEffect>,
    #[serde(default)]
    pub is_illegal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemEffect {
    pub kind: EffectKind,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    ClickPower,
    AutoCode,
    BugResist,
    #[serde(alias = "heat_output")]
    Heat,
    Cooling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerkDef {
    pub id: PerkId,
    pub name: String,
    /// Reputation spent to unlock.
    pub cost: i64,
    pub effect: PerkEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerkEffect {
    pub kind: PerkKind,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerkKind {
    /// `click_power *= 1 + value`.
    ClickBoost,
    /// `bug_chance *= 1 - value`.
    BugReduction,
    /// Flat money per tick while not overheating.
    Miner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporationDef {
    pub id: CorpId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpQuestDef {
    pub id: CorpQuestId,
    pub corp_id: CorpId,
    pub title: String,
    #[serde(default)]
    pub min_rank: MembershipRank,
    pub objectives: Vec<ObjectiveDef>,
    #[serde(default)]
    pub reward_money: f64,
    #[serde(default)]
    pub reward_reputation: i32,
    #[serde(default)]
    pub reward_corp_xp: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveDef {
    pub kind: ObjectiveKind,
    pub target: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleQuestDef {
    pub id: ConsoleQuestId,
    pub title: String,
    /// Accepted inputs after normalization. A trailing `*` accepts any suffix.
    pub accepts: Vec<String>,
    #[serde(default)]
    pub reward_money: f64,
    #[serde(default)]
    pub reward_xp: u64,
    /// Completing this quest starts the black-market gateway hack instead of paying out.
    #[serde(default)]
    pub gateway: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabQuestDef {
    pub id: LabQuestId,
    pub title: String,
    #[serde(default)]
    pub reward_items: Vec<ItemId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintDef {
    pub id: BlueprintId,
    pub output: ItemId,
    pub inputs: Vec<BlueprintInput>,
    #[serde(default)]
    pub money_cost: f64,
    /// Skill-check success probability at tier Trainee.
    pub base_success: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintInput {
    pub item_id: ItemId,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: String,
    pub condition: AchievementCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementCondition {
    MoneyAtLeast { amount: f64 },
    LinesOfCodeAtLeast { lines: f64 },
    ReputationAtLeast { reputation: i64 },
    SuccessfulHacksAtLeast { count: u32 },
    ProjectsReleasedAtLeast { count: usize },
    DayAtLeast { day: u32 },
    TierAtLeast { tier: PlayerTier },
}

/// Tunable economy values. Formula constants fixed by the game rules live
/// next to the code that uses them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Constants {
    /// Global scale on all money income.
    pub economy_multiplier: f64,
    pub xp_multiplier: f64,
    pub electricity_rate: f64,
    pub base_internet_cost: f64,
    pub bill_due_days: u32,
    pub overdue_credit_penalty: i32,
    pub on_time_payment_bonus: i32,
    pub shadow_price_factor: f64,
    pub trader_sale_bonus: f64,
    pub coder_speed_bonus: f64,
    pub hacker_payout_bonus: f64,
    pub hack_money_per_difficulty: f64,
    pub hack_shadow_per_difficulty: f64,
    pub hack_reputation_per_difficulty: i64,
    pub hack_fail_trace: f64,
    pub hack_fail_heat: f64,
    pub gateway_hack_difficulty: u32,
    pub leave_penalty_per_rank: i32,
    pub overheat_wear_per_tick: f64,
    pub repair_cost_per_point: f64,
    pub energy_price_per_point: f64,
    pub loan_limit_per_point: f64,
    pub loan_interest_rate: f64,
    pub shadow_access_secs: u64,
    pub craft_tier_bonus: f64,
    pub lines_per_complexity: f64,
    pub revenue_per_complexity: f64,
    pub revenue_per_visitor: f64,
    pub starting_money: f64,
    pub starting_shadow_credits: f64,
    /// Units minted and equipped for a new player.
    pub starter_kit: Vec<ItemId>,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            economy_multiplier: 1.0,
            xp_multiplier: 1.0,
            electricity_rate: 0.5,
            base_internet_cost: 25.0,
            bill_due_days: 3,
            overdue_credit_penalty: 5,
            on_time_payment_bonus: 2,
            shadow_price_factor: 0.5,
            trader_sale_bonus: 0.1,
            coder_speed_bonus: 0.2,
            hacker_payout_bonus: 0.25,
            hack_money_per_difficulty: 100.0,
            hack_shadow_per_difficulty: 20.0,
            hack_reputation_per_difficulty: 5,
            hack_fail_trace: 10.0,
            hack_fail_heat: 5.0,
            gateway_hack_difficulty: 3,
            leave_penalty_per_rank: 10,
            overheat_wear_per_tick: 0.05,
            repair_cost_per_point: 2.0,
            energy_price_per_point: 1.0,
            loan_limit_per_point: 20.0,
            loan_interest_rate: 0.1,
            shadow_access_secs: 300,
            craft_tier_bonus: 0.05,
            lines_per_complexity: 100.0,
            revenue_per_complexity: 6.0,
            revenue_per_visitor: 0.05,
            starting_money: 500.0,
            starting_shadow_credits: 0.0,
            starter_kit: Vec::new(),
        }
    }
}
