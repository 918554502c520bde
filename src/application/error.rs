use thiserror::Error;

use crate::domain::{Amount, LedgerError, PartyId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown transaction type '{0}'. Valid types: credit, debit, payment, receipt")]
    InvalidTransactionKind(String),

    #[error("Unknown party type '{0}'. Valid types: client, supplier")]
    InvalidPartyKind(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Party not found: {0}")]
    PartyNotFound(PartyId),

    #[error("Party {0} could not be read from the data file and cannot be changed")]
    UnreadableParty(PartyId),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::BalanceOverflow { .. } => AppError::InvalidAmount(err.to_string()),
            LedgerError::UnreadableParty(id) => AppError::UnreadableParty(id),
            LedgerError::IdsExhausted => AppError::Storage(anyhow::Error::new(err)),
        }
    }
}

impl AppError {
    pub(crate) fn negative_amount(amount: Amount) -> Self {
        AppError::InvalidAmount(format!("amount must not be negative (got {})", amount))
    }
}
