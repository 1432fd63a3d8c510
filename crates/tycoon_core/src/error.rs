use serde::Serialize;
use thiserror::Error;

use crate::files::FsError;
use crate::{
    BillId, BlueprintId, CorpId, CorpQuestId, Currency, HardwareType, ItemId, LabQuestId, Uid,
};

/// Why a player action was refused. The state is always left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("insufficient {currency}: need {needed:.2}, have {available:.2}")]
    InsufficientFunds {
        currency: Currency,
        needed: f64,
        available: f64,
    },
    #[error("item {0} is stolen and must be cleaned before it can be sold")]
    StolenGoods(Uid),
    #[error("item {0} is the last unit equipped in its slot")]
    ItemEquipped(Uid),
    #[error("no item with uid {0} in inventory")]
    ItemNotFound(Uid),
    #[error("unknown catalog item {0}")]
    UnknownItem(ItemId),
    #[error("item {0} has no hardware slot")]
    NotEquippable(ItemId),
    #[error("requires {0} in inventory")]
    MissingTool(ItemId),
    #[error("the black market is not accessible")]
    BlackMarketLocked,
    #[error("nothing equipped in the {0:?} slot")]
    SlotEmpty(HardwareType),
    #[error("already a member of {0}")]
    AlreadyMember(CorpId),
    #[error("not a member of the required corporation")]
    NotMember,
    #[error("reputation with {corp_id} is too low ({reputation})")]
    ReputationTooLow { corp_id: CorpId, reputation: i32 },
    #[error("unknown corporation {0}")]
    UnknownCorporation(CorpId),
    #[error("unknown corp quest {0}")]
    UnknownQuest(CorpQuestId),
    #[error("quest {0} was already accepted or completed")]
    DuplicateQuest(CorpQuestId),
    #[error("at most {max} quests can be active")]
    QuestLimitReached { max: usize },
    #[error("quest {0} is not active")]
    QuestNotActive(CorpQuestId),
    #[error("quest {0} objectives are not complete")]
    QuestIncomplete(CorpQuestId),
    #[error("corp rank too low for quest {0}")]
    RankTooLow(CorpQuestId),
    #[error("unknown lab quest {0}")]
    UnknownLabQuest(LabQuestId),
    #[error("a project is already in development")]
    ProjectActive,
    #[error("no project in development")]
    NoActiveProject,
    #[error("project incomplete: {progress:.0}/{target:.0} lines")]
    ProjectIncomplete { progress: f64, target: f64 },
    #[error("no unpaid bill {0}")]
    BillNotFound(BillId),
    #[error("amount must be positive and finite")]
    InvalidAmount,
    #[error("credit limit exceeded: requested {requested:.2}, available {available:.2}")]
    CreditLimitExceeded { requested: f64, available: f64 },
    #[error("unknown blueprint {0}")]
    UnknownBlueprint(BlueprintId),
    #[error("missing components: need {needed} x {item_id}, have {available}")]
    MissingComponents {
        item_id: ItemId,
        needed: u32,
        available: u32,
    },
    #[error("command not recognized: {0}")]
    CommandRejected(String),
    #[error("no console quest available")]
    NoQuestAvailable,
    #[error("no open signal to answer")]
    NoSignal,
    #[error(transparent)]
    File(#[from] FsError),
}

/// Coarse classification used to pick how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InsufficientResource,
    InvariantViolation,
    StolenGoods,
    NotFound,
    Rejected,
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::InsufficientFunds { .. }
            | ActionError::CreditLimitExceeded { .. }
            | ActionError::MissingComponents { .. }
            | ActionError::MissingTool(_) => ErrorKind::InsufficientResource,
            ActionError::StolenGoods(_) => ErrorKind::StolenGoods,
            ActionError::ItemEquipped(_)
            | ActionError::AlreadyMember(_)
            | ActionError::DuplicateQuest(_)
            | ActionError::QuestLimitReached { .. }
            | ActionError::ProjectActive
            | ActionError::ReputationTooLow { .. }
            | ActionError::RankTooLow(_)
            | ActionError::NotMember
            | ActionError::QuestIncomplete(_)
            | ActionError::ProjectIncomplete { .. }
            | ActionError::BlackMarketLocked => ErrorKind::InvariantViolation,
            ActionError::ItemNotFound(_)
            | ActionError::UnknownItem(_)
            | ActionError::SlotEmpty(_)
            | ActionError::UnknownCorporation(_)
            | ActionError::UnknownQuest(_)
            | ActionError::QuestNotActive(_)
            | ActionError::UnknownLabQuest(_)
            | ActionError::NoActiveProject
            | ActionError::BillNotFound(_)
            | ActionError::UnknownBlueprint(_)
            | ActionError::NoQuestAvailable
            | ActionError::NoSignal => ErrorKind::NotFound,
            ActionError::NotEquippable(_)
            | ActionError::InvalidAmount
            | ActionError::CommandRejected(_)
            | ActionError::File(_) => ErrorKind::Rejected,
        }
    }
}
