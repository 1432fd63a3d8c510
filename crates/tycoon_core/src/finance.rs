//! Bills, loans, energy recharge and currency exchange.

use crate::economy::clamp_credit;
use crate::engine::ENERGY_MAX;
use crate::trade::{require_funds, valid_amount};
use crate::{
    push_event, record_transaction, ActionError, BillId, Currency, Event, EventEnvelope,
    GameContent, GameState, TransactionKind,
};

/// Credit score gained when a loan is paid off.
pub const LOAN_CLEARED_BONUS: i32 = 10;

pub(crate) fn pay_bill(
    state: &mut GameState,
    content: &GameContent,
    bill_id: &BillId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let index = state
        .finance
        .bills
        .iter()
        .position(|bill| bill.id == *bill_id && !bill.paid)
        .ok_or_else(|| ActionError::BillNotFound(bill_id.clone()))?;
    let bill = &state.finance.bills[index];
    let (amount, on_time) = (bill.amount, state.clock.day <= bill.due_day);
    require_funds(state, Currency::Money, amount)?;

    state.player.money -= amount;
    let bill = state.finance.bills.remove(index);
    if on_time {
        state.finance.credit_score =
            clamp_credit(state.finance.credit_score + content.constants.on_time_payment_bonus);
    }
    record_transaction(state, TransactionKind::BillPayment, -amount, bill.description);
    push_event(state, events, Event::BillPaid { bill_id: bill.id, amount });
    Ok(())
}

/// Remaining borrowing capacity at the current credit score.
pub fn loan_capacity(state: &GameState, content: &GameContent) -> f64 {
    let headroom = f64::from(state.finance.credit_score - crate::economy::CREDIT_SCORE_MIN);
    (headroom * content.constants.loan_limit_per_point - state.finance.loan_debt).max(0.0)
}

pub(crate) fn take_loan(
    state: &mut GameState,
    content: &GameContent,
    amount: f64,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let amount = valid_amount(amount)?;
    let available = loan_capacity(state, content);
    if amount > available {
        return Err(ActionError::CreditLimitExceeded {
            requested: amount,
            available,
        });
    }
    state.player.money += amount;
    state.finance.loan_debt += amount * (1.0 + content.constants.loan_interest_rate);
    record_transaction(state, TransactionKind::Loan, amount, "Loan disbursement");
    let debt = state.finance.loan_debt;
    push_event(state, events, Event::LoanTaken { amount, debt });
    Ok(())
}

pub(crate) fn repay_loan(
    state: &mut GameState,
    amount: f64,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let amount = valid_amount(amount)?.min(state.finance.loan_debt);
    if amount <= 0.0 {
        return Err(ActionError::InvalidAmount);
    }
    require_funds(state, Currency::Money, amount)?;
    state.player.money -= amount;
    state.finance.loan_debt -= amount;
    if state.finance.loan_debt < 1e-6 {
        state.finance.loan_debt = 0.0;
        state.finance.credit_score = clamp_credit(state.finance.credit_score + LOAN_CLEARED_BONUS);
    }
    record_transaction(state, TransactionKind::LoanRepayment, -amount, "Loan repayment");
    let debt = state.finance.loan_debt;
    push_event(state, events, Event::LoanRepaid { amount, debt });
    Ok(())
}

/// Buy up to `amount` energy points; tops out at a full bar.
pub(crate) fn recharge(
    state: &mut GameState,
    content: &GameContent,
    amount: f64,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let points = valid_amount(amount)?.min(ENERGY_MAX - state.player.energy);
    if points <= 0.0 {
        return Ok(());
    }
    let cost = points * content.constants.energy_price_per_point;
    require_funds(state, Currency::Money, cost)?;
    state.player.money -= cost;
    state.player.energy = (state.player.energy + points).min(ENERGY_MAX);
    record_transaction(state, TransactionKind::Recharge, -cost, "Energy drink bulk order");
    push_event(state, events, Event::EnergyRecharged { amount: points });
    Ok(())
}

/// Money to shadow credits at the heat-dependent exchange rate.
pub(crate) fn convert_currency(
    state: &mut GameState,
    amount: f64,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), ActionError> {
    let amount = valid_amount(amount)?;
    require_funds(state, Currency::Money, amount)?;
    let shadow_credits = amount * crate::risk::exchange_rate(state.risk.global_heat);
    state.player.money -= amount;
    state.player.shadow_credits += shadow_credits;
    record_transaction(state, TransactionKind::Conversion, -amount, "Shadow exchange");
    push_event(
        state,
        events,
        Event::CurrencyConverted {
            money: amount,
            shadow_credits,
        },
    );
    Ok(())
}
