use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{
    annotate_transactions, apply_transaction, build_integrity_report, compute_aggregates,
    Aggregates, Amount, Expense, IntegrityReport, Party, PartyId, PartyKind, Settings,
    SettingsUpdate, Transaction, TransactionEntry, TransactionKind,
};
use crate::storage::Store;

use super::validation::{optional_text, require_text};
use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (CLI, HTTP handlers, etc.).
///
/// Cloning is cheap and clones share the same write queue.
#[derive(Debug, Clone)]
pub struct LedgerService {
    store: Store,
}

impl LedgerService {
    /// Create a new ledger service on top of the given store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Open the data file at `path`, creating it if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let store = Store::open(path).await?;
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // ========================
    // Party operations
    // ========================

    /// Add a client or supplier with an opening balance.
    pub async fn add_party(
        &self,
        name: &str,
        kind: PartyKind,
        initial_balance: Amount,
        phone: Option<String>,
        address: Option<String>,
    ) -> Result<Party, AppError> {
        let name = require_text("party name", name)?;
        let phone = optional_text(phone);
        let address = optional_text(address);

        let party = self
            .store
            .try_update(|doc| {
                let now = Utc::now();
                let mut party = Party::new(doc.next_id(now)?, name, kind, initial_balance, now);
                if let Some(phone) = phone {
                    party = party.with_phone(phone);
                }
                if let Some(address) = address {
                    party = party.with_address(address);
                }
                doc.parties.push(party.clone());
                Ok::<_, AppError>(party)
            })
            .await?;

        info!(party_id = party.id, kind = %party.kind, balance = party.balance, "party added");
        Ok(party)
    }

    /// List parties in creation order, optionally only one kind.
    pub async fn list_parties(&self, kind: Option<PartyKind>) -> Vec<Party> {
        let doc = self.store.read().await;
        doc.parties
            .into_iter()
            .filter(|p| kind.is_none_or(|k| p.kind == k))
            .collect()
    }

    pub async fn get_party(&self, id: PartyId) -> Result<Party, AppError> {
        self.store
            .read()
            .await
            .parties
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(AppError::PartyNotFound(id))
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a ledger entry and move the party balance with it.
    ///
    /// The log append and the balance change happen in the same store update,
    /// so they are persisted together or not at all. A `party_id` that does
    /// not resolve is accepted: the entry is logged and no balance moves.
    /// An amount that would push the balance out of range is rejected with
    /// [`AppError::InvalidAmount`] and nothing is written.
    pub async fn record_transaction(
        &self,
        party_id: Option<PartyId>,
        kind: TransactionKind,
        amount: Amount,
        description: Option<String>,
    ) -> Result<Transaction, AppError> {
        if amount < 0 {
            return Err(AppError::negative_amount(amount));
        }
        let description = optional_text(description);

        let (transaction, adjusted) = self
            .store
            .try_update(|doc| {
                let now = Utc::now();
                let mut transaction =
                    Transaction::new(doc.next_id(now)?, party_id, kind, amount, now);
                if let Some(description) = description {
                    transaction = transaction.with_description(description);
                }
                let adjusted = apply_transaction(doc, transaction.clone())?;
                Ok::<_, AppError>((transaction, adjusted))
            })
            .await?;

        if adjusted {
            info!(
                transaction_id = transaction.id,
                party_id = ?party_id,
                kind = %kind,
                amount,
                "transaction recorded"
            );
        } else {
            warn!(
                transaction_id = transaction.id,
                party_id = ?party_id,
                kind = %kind,
                amount,
                "transaction recorded without a matching party, no balance changed"
            );
        }

        Ok(transaction)
    }

    /// The transaction log in creation order, with party names attached.
    pub async fn list_transactions(&self) -> Vec<TransactionEntry> {
        annotate_transactions(&self.store.read().await)
    }

    // ========================
    // Expense operations
    // ========================

    pub async fn add_expense(
        &self,
        category: &str,
        amount: Amount,
        note: Option<String>,
    ) -> Result<Expense, AppError> {
        if amount < 0 {
            return Err(AppError::negative_amount(amount));
        }
        let category = require_text("expense category", category)?;
        let note = optional_text(note);

        let expense = self
            .store
            .try_update(|doc| {
                let now = Utc::now();
                let mut expense = Expense::new(doc.next_id(now)?, category, amount, now);
                if let Some(note) = note {
                    expense = expense.with_note(note);
                }
                doc.expenses.push(expense.clone());
                Ok::<_, AppError>(expense)
            })
            .await?;

        info!(expense_id = expense.id, category = %expense.category, amount, "expense added");
        Ok(expense)
    }

    pub async fn list_expenses(&self) -> Vec<Expense> {
        self.store.read().await.expenses
    }

    // ========================
    // Reporting
    // ========================

    /// Dashboard totals from a single snapshot.
    pub async fn get_aggregates(&self) -> Aggregates {
        compute_aggregates(&self.store.read().await)
    }

    /// Replay every party balance against the log.
    pub async fn check_integrity(&self) -> IntegrityReport {
        build_integrity_report(&self.store.read().await)
    }

    // ========================
    // Settings
    // ========================

    pub async fn get_settings(&self) -> Settings {
        self.store.read().await.settings
    }

    /// Merge the provided fields into the stored settings.
    /// An empty update writes nothing.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, AppError> {
        let changed = !update.is_empty();
        let doc = self
            .store
            .mutate(|mut doc| {
                if !changed {
                    return None;
                }
                doc.settings.merge(update);
                Some(doc)
            })
            .await?;

        if changed {
            info!(
                company = doc.settings.company_name(),
                currency = doc.settings.currency(),
                "settings updated"
            );
        }
        Ok(doc.settings)
    }
}
