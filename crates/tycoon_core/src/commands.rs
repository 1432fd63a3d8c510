//! Player command dispatch.
//!
//! Each command runs against a draft copy of the state. The draft replaces
//! the live state only when the handler succeeds, so a failing command leaves
//! no partial mutation behind.

use rand::Rng;

use crate::{
    corp, crafting, finance, hacking, projects, push_event, trade, ActionError, Command, Event,
    EventEnvelope, GameContent, GameState, PerkId,
};

pub fn apply_command(
    state: &mut GameState,
    command: &Command,
    content: &GameContent,
    rng: &mut impl Rng,
    now_ms: u64,
) -> Result<Vec<EventEnvelope>, ActionError> {
    let mut draft = state.clone();
    let mut events = Vec::new();
    dispatch(&mut draft, command, content, rng, now_ms, &mut events)?;
    *state = draft;
    Ok(events)
}

fn dispatch(
    state: &mut GameState,
    command: &Command,
    content: &GameContent,
    rng: &mut impl Rng,
    now_ms: u64,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    match command {
        Command::Buy { item_id, shadow } => {
            trade::buy(state, content, item_id, *shadow, rng, now_ms, events)
        }
        Command::Sell { uid, value } => trade::sell(state, content, uid, *value, events),
        Command::CleanItem { uid } => trade::clean(state, uid, events),
        Command::Equip { uid } => trade::equip(state, content, uid, events),
        Command::Unequip { slot } => trade::unequip(state, *slot, events),
        Command::Repair { uid } => trade::repair(state, content, uid, events),
        Command::UnlockPerk { perk_id } => {
            unlock_perk(state, content, perk_id, events);
            Ok(())
        }
        Command::ConvertCurrency { amount } => finance::convert_currency(state, *amount, events),
        Command::ResolveHack {
            difficulty,
            success,
            lab_quest,
        } => hacking::resolve_hack(
            state,
            content,
            *difficulty,
            *success,
            lab_quest.as_ref(),
            rng,
            events,
        ),
        Command::ConsoleSubmit { input } => hacking::console_submit(state, content, input, events),
        Command::AnswerSignal => hacking::answer_signal(state, content, now_ms, events),
        Command::JoinCorp { corp_id } => corp::join(state, content, corp_id, events),
        Command::LeaveCorp => corp::leave(state, content, events),
        Command::AcceptCorpQuest { quest_id } => {
            corp::accept_quest(state, content, quest_id, events)
        }
        Command::CollectCorpQuest { quest_id } => {
            corp::collect_quest(state, content, quest_id, events)
        }
        Command::StartProject {
            name,
            kind,
            complexity,
        } => projects::start(state, content, name, *kind, *complexity, events),
        Command::WriteCode => projects::write_code(state, content, rng, events),
        Command::ReleaseProject => projects::release(state, content, events),
        Command::SetCrunch { enabled } => {
            projects::set_crunch(state, *enabled, events);
            Ok(())
        }
        Command::PayBill { bill_id } => finance::pay_bill(state, content, bill_id, events),
        Command::TakeLoan { amount } => finance::take_loan(state, content, *amount, events),
        Command::RepayLoan { amount } => finance::repay_loan(state, *amount, events),
        Command::Recharge { amount } => finance::recharge(state, content, *amount, events),
        Command::Craft { blueprint_id } => {
            crafting::craft(state, content, blueprint_id, rng, events)
        }
        Command::SaveFile { path, content: body } => {
            for change in state.files.write_file(path, body)? {
                push_event(state, events, Event::FileChanged { change });
            }
            Ok(())
        }
        Command::DeleteFile { path, recursive } => {
            let change = state.files.delete(path, *recursive)?;
            push_event(state, events, Event::FileChanged { change });
            Ok(())
        }
        Command::RenameFile { from, to } => {
            let change = state.files.rename(from, to)?;
            push_event(state, events, Event::FileChanged { change });
            Ok(())
        }
        Command::SetRole { role } => {
            if state.player.role != *role {
                state.player.role = *role;
                push_event(state, events, Event::RoleChanged { role: *role });
            }
            Ok(())
        }
        Command::DismissModal => {
            if state.player.blocking_modal.take().is_some() {
                push_event(state, events, Event::ModalDismissed);
            }
            Ok(())
        }
    }
}

/// Silently ignored when the perk is unknown, already owned or unaffordable.
fn unlock_perk(
    state: &mut GameState,
    content: &GameContent,
    perk_id: &PerkId,
    events: &mut Vec<EventEnvelope>,
) {
    let Some(perk) = content.perks.get(perk_id) else {
        return;
    };
    if state.player.unlocked_perks.contains(perk_id) || state.player.reputation < perk.cost {
        return;
    }
    let tier_change = crate::progression::adjust_reputation(state, -perk.cost);
    state.player.unlocked_perks.insert(perk_id.clone());
    push_event(state, events, Event::PerkUnlocked { perk_id: perk_id.clone() });
    if let Some(event) = tier_change {
        push_event(state, events, event);
    }
}
