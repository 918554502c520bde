use crate::domain::{parse_amount, Amount, PartyKind, TransactionKind};

use super::AppError;

// Boundary parsers for raw user input. Everything here runs before a request
// reaches the store, so a rejected input never queues a write.

pub fn parse_transaction_kind(input: &str) -> Result<TransactionKind, AppError> {
    TransactionKind::from_name(input)
        .ok_or_else(|| AppError::InvalidTransactionKind(input.to_string()))
}

pub fn parse_party_kind(input: &str) -> Result<PartyKind, AppError> {
    PartyKind::from_name(input).ok_or_else(|| AppError::InvalidPartyKind(input.to_string()))
}

/// Parse an amount that is recorded as-is (transactions, expenses).
pub fn parse_recorded_amount(input: &str) -> Result<Amount, AppError> {
    let amount = parse_signed_amount(input)?;
    if amount < 0 {
        return Err(AppError::negative_amount(amount));
    }
    Ok(amount)
}

/// Parse a balance, which may be negative.
pub fn parse_signed_amount(input: &str) -> Result<Amount, AppError> {
    parse_amount(input).map_err(|e| AppError::InvalidAmount(format!("'{}': {}", input, e)))
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Drop optional text that is only whitespace.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
