use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Amount, Collection, Document, PartyId, Transaction, TransactionKind};

/// Display name used when a transaction points at a party that no longer resolves.
pub const UNKNOWN_PARTY_NAME: &str = "Unknown";

/// Reasons a change cannot be applied to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The new balance does not fit in an `Amount`.
    BalanceOverflow {
        party_id: PartyId,
        balance: Amount,
        delta: Amount,
    },
    /// The party exists in the data file but its record could not be read.
    UnreadableParty(PartyId),
    /// No id above the largest one in use is left.
    IdsExhausted,
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::BalanceOverflow {
                party_id,
                balance,
                delta,
            } => write!(
                f,
                "moving the balance of party {} from {} by {} is out of range",
                party_id, balance, delta
            ),
            LedgerError::UnreadableParty(id) => {
                write!(f, "party {} is stored in a form that cannot be updated", id)
            }
            LedgerError::IdsExhausted => write!(f, "no record ids left"),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Append a transaction to the log and move the referenced party's balance
/// by the signed amount, in one step over the same document.
///
/// Returns `Ok(true)` if a party was found and adjusted. A dangling reference
/// is tolerated: the entry is still logged, no balance moves. On error the
/// document is left as it was.
pub fn apply_transaction(
    doc: &mut Document,
    transaction: Transaction,
) -> Result<bool, LedgerError> {
    let delta = transaction.signed_delta();
    let adjusted = match transaction.party_id {
        Some(id) if doc.party(id).is_none() && doc.has_untyped(Collection::Parties, id) => {
            return Err(LedgerError::UnreadableParty(id));
        }
        Some(id) => match doc.party_mut(id) {
            Some(party) => {
                party.balance =
                    party
                        .balance
                        .checked_add(delta)
                        .ok_or(LedgerError::BalanceOverflow {
                            party_id: id,
                            balance: party.balance,
                            delta,
                        })?;
                true
            }
            None => false,
        },
        None => false,
    };
    doc.transactions.push(transaction);
    Ok(adjusted)
}

/// Dashboard totals, all computed from one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    /// Sum of positive balances (owed to us)
    pub total_receivable: Amount,
    /// Sum of absolute negative balances (owed by us)
    pub total_payable: Amount,
    /// Sum of payments received
    pub total_income: Amount,
    pub total_expenses: Amount,
    pub party_count: usize,
}

/// Totals saturate at the `Amount` bounds instead of wrapping.
fn saturating_total(amounts: impl Iterator<Item = Amount>) -> Amount {
    amounts.fold(0, Amount::saturating_add)
}

pub fn compute_aggregates(doc: &Document) -> Aggregates {
    let total_receivable = saturating_total(
        doc.parties
            .iter()
            .filter(|p| p.is_receivable())
            .map(|p| p.balance),
    );
    let total_payable = saturating_total(
        doc.parties
            .iter()
            .filter(|p| p.is_payable())
            .map(|p| p.balance.saturating_abs()),
    );
    let total_income = saturating_total(
        doc.transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Payment)
            .map(|t| t.amount),
    );
    let total_expenses = saturating_total(doc.expenses.iter().map(|e| e.amount));

    Aggregates {
        total_receivable,
        total_payable,
        total_income,
        total_expenses,
        party_count: doc.parties.len(),
    }
}

/// A transaction joined with the display name of its party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    #[serde(rename = "clientName")]
    pub party_name: String,
}

/// The transaction log in creation order, each entry annotated with its party name.
pub fn annotate_transactions(doc: &Document) -> Vec<TransactionEntry> {
    let names: HashMap<PartyId, &str> = doc
        .parties
        .iter()
        .map(|p| (p.id, p.name.as_str()))
        .collect();

    doc.transactions
        .iter()
        .map(|t| TransactionEntry {
            party_name: t
                .party_id
                .and_then(|id| names.get(&id).copied())
                .unwrap_or(UNKNOWN_PARTY_NAME)
                .to_string(),
            transaction: t.clone(),
        })
        .collect()
}

/// Sum of signed deltas per party, over the whole log. Widened to `i128` so
/// any log read from disk can be replayed exactly.
pub fn compute_movements(transactions: &[Transaction]) -> HashMap<PartyId, i128> {
    let mut movements: HashMap<PartyId, i128> = HashMap::new();
    for transaction in transactions {
        if let Some(id) = transaction.party_id {
            *movements.entry(id).or_insert(0) += i128::from(transaction.signed_delta());
        }
    }
    movements
}

/// A party whose stored balance disagrees with its replayed log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceMismatch {
    pub party_id: PartyId,
    pub party_name: String,
    pub recorded: Amount,
    pub expected: i128,
}

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub party_count: usize,
    pub transaction_count: usize,
    /// Parties created before initial balances were tracked; cannot be replayed.
    pub unverified_parties: usize,
    /// Transactions whose party reference does not resolve.
    pub orphaned_transactions: usize,
    pub mismatches: Vec<BalanceMismatch>,
    pub duplicate_ids: Vec<u64>,
    /// Records kept verbatim because they could not be read.
    pub untyped_records: usize,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    /// Orphaned transactions and untyped records are reported but do not make
    /// the ledger unhealthy.
    pub fn is_healthy(&self) -> bool {
        self.mismatches.is_empty() && self.duplicate_ids.is_empty()
    }
}

/// Replay the log against every party with a known initial balance and look
/// for records that share an id.
pub fn build_integrity_report(doc: &Document) -> IntegrityReport {
    let movements = compute_movements(&doc.transactions);
    let mut report = IntegrityReport {
        party_count: doc.parties.len(),
        transaction_count: doc.transactions.len(),
        untyped_records: doc.untyped.len(),
        ..Default::default()
    };

    for party in &doc.parties {
        let Some(initial) = party.initial_balance else {
            report.unverified_parties += 1;
            continue;
        };
        let expected = i128::from(initial) + movements.get(&party.id).copied().unwrap_or(0);
        if expected != i128::from(party.balance) {
            report.issues.push(format!(
                "Party '{}' ({}) has balance {} but its transactions add up to {}",
                party.name, party.id, party.balance, expected
            ));
            report.mismatches.push(BalanceMismatch {
                party_id: party.id,
                party_name: party.name.clone(),
                recorded: party.balance,
                expected,
            });
        }
    }

    let known: HashSet<PartyId> = doc.parties.iter().map(|p| p.id).collect();
    report.orphaned_transactions = doc
        .transactions
        .iter()
        .filter(|t| t.party_id.is_none_or(|id| !known.contains(&id)))
        .count();

    let mut seen = HashSet::new();
    let ids = doc
        .parties
        .iter()
        .map(|p| p.id)
        .chain(doc.transactions.iter().map(|t| t.id))
        .chain(doc.expenses.iter().map(|e| e.id));
    for id in ids {
        if !seen.insert(id) && !report.duplicate_ids.contains(&id) {
            report.issues.push(format!("Id {} is used by more than one record", id));
            report.duplicate_ids.push(id);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{Expense, Party, PartyKind};

    fn doc_with_parties(parties: &[(PartyId, &str, Amount)]) -> Document {
        let mut doc = Document::default();
        for (id, name, balance) in parties {
            doc.parties.push(Party::new(
                *id,
                name.to_string(),
                PartyKind::Client,
                *balance,
                Utc::now(),
            ));
        }
        doc
    }

    fn tx(id: u64, party: Option<PartyId>, kind: TransactionKind, amount: Amount) -> Transaction {
        Transaction::new(id, party, kind, amount, Utc::now())
    }

    #[test]
    fn test_apply_transaction_moves_balance_and_logs() {
        let mut doc = doc_with_parties(&[(1, "A", 0)]);

        let credit = tx(10, Some(1), TransactionKind::Credit, 1000);
        let payment = tx(11, Some(1), TransactionKind::Payment, 400);
        assert!(apply_transaction(&mut doc, credit).unwrap());
        assert!(apply_transaction(&mut doc, payment).unwrap());

        assert_eq!(doc.party(1).unwrap().balance, 600);
        assert_eq!(doc.transactions.len(), 2);
    }

    #[test]
    fn test_apply_transaction_tolerates_dangling_reference() {
        let mut doc = doc_with_parties(&[(1, "A", 250)]);

        let dangling = tx(10, Some(99), TransactionKind::Credit, 100);
        let unbooked = tx(11, None, TransactionKind::Debit, 5);
        assert!(!apply_transaction(&mut doc, dangling).unwrap());
        assert!(!apply_transaction(&mut doc, unbooked).unwrap());

        assert_eq!(doc.party(1).unwrap().balance, 250);
        assert_eq!(doc.transactions.len(), 2);
    }

    #[test]
    fn test_apply_transaction_rejects_balance_overflow() {
        let mut doc = doc_with_parties(&[(1, "A", 1)]);

        let result = apply_transaction(
            &mut doc,
            tx(10, Some(1), TransactionKind::Credit, Amount::MAX),
        );
        assert_eq!(
            result,
            Err(LedgerError::BalanceOverflow {
                party_id: 1,
                balance: 1,
                delta: Amount::MAX,
            })
        );
        assert_eq!(doc.party(1).unwrap().balance, 1);
        assert!(doc.transactions.is_empty());

        // The other direction still has room.
        let debit = tx(11, Some(1), TransactionKind::Debit, Amount::MAX);
        assert!(apply_transaction(&mut doc, debit).unwrap());
        assert_eq!(doc.party(1).unwrap().balance, 1 - Amount::MAX);
    }

    #[test]
    fn test_apply_transaction_refuses_unreadable_party() {
        let mut doc: Document = serde_json::from_str(
            r#"{"clients": [{"id": 5, "name": null, "balance": 10}]}"#,
        )
        .unwrap();
        assert!(doc.parties.is_empty());

        let result = apply_transaction(&mut doc, tx(10, Some(5), TransactionKind::Credit, 1));
        assert_eq!(result, Err(LedgerError::UnreadableParty(5)));
        assert!(doc.transactions.is_empty());
    }

    #[test]
    fn test_aggregates_saturate_instead_of_wrapping() {
        let doc = doc_with_parties(&[(1, "A", Amount::MAX), (2, "B", 5), (3, "C", Amount::MIN)]);

        let totals = compute_aggregates(&doc);
        assert_eq!(totals.total_receivable, Amount::MAX);
        assert_eq!(totals.total_payable, Amount::MAX);
    }

    #[test]
    fn test_aggregates_scenario() {
        let mut doc = doc_with_parties(&[(1, "A", 0), (2, "B", 0)]);
        apply_transaction(&mut doc, tx(10, Some(1), TransactionKind::Credit, 1000)).unwrap();
        apply_transaction(&mut doc, tx(11, Some(1), TransactionKind::Payment, 400)).unwrap();
        apply_transaction(&mut doc, tx(12, Some(2), TransactionKind::Debit, 200)).unwrap();
        apply_transaction(&mut doc, tx(13, Some(2), TransactionKind::Receipt, 50)).unwrap();
        doc.expenses
            .push(Expense::new(20, "rent".into(), 300, Utc::now()));

        assert_eq!(doc.party(1).unwrap().balance, 600);
        assert_eq!(doc.party(2).unwrap().balance, -150);

        let totals = compute_aggregates(&doc);
        assert_eq!(totals.total_receivable, 600);
        assert_eq!(totals.total_payable, 150);
        assert_eq!(totals.total_income, 400);
        assert_eq!(totals.total_expenses, 300);
        assert_eq!(totals.party_count, 2);
    }

    #[test]
    fn test_annotate_uses_fallback_name() {
        let mut doc = doc_with_parties(&[(1, "Ali", 0)]);
        apply_transaction(&mut doc, tx(10, Some(1), TransactionKind::Credit, 5)).unwrap();
        apply_transaction(&mut doc, tx(11, Some(42), TransactionKind::Credit, 5)).unwrap();
        apply_transaction(&mut doc, tx(12, None, TransactionKind::Credit, 5)).unwrap();

        let names: Vec<String> = annotate_transactions(&doc)
            .into_iter()
            .map(|e| e.party_name)
            .collect();
        assert_eq!(names, ["Ali", UNKNOWN_PARTY_NAME, UNKNOWN_PARTY_NAME]);
    }

    #[test]
    fn test_integrity_report_healthy_ledger() {
        let mut doc = doc_with_parties(&[(1, "A", 100), (2, "B", -20)]);
        apply_transaction(&mut doc, tx(10, Some(1), TransactionKind::Credit, 50)).unwrap();
        apply_transaction(&mut doc, tx(11, Some(2), TransactionKind::Receipt, 20)).unwrap();
        apply_transaction(&mut doc, tx(12, Some(77), TransactionKind::Credit, 1)).unwrap();

        let report = build_integrity_report(&doc);
        assert!(report.is_healthy(), "issues: {:?}", report.issues);
        assert_eq!(report.orphaned_transactions, 1);
        assert_eq!(report.transaction_count, 3);
    }

    #[test]
    fn test_integrity_report_detects_tampered_balance() {
        let mut doc = doc_with_parties(&[(1, "A", 0)]);
        apply_transaction(&mut doc, tx(10, Some(1), TransactionKind::Credit, 50)).unwrap();
        doc.party_mut(1).unwrap().balance = 75;

        let report = build_integrity_report(&doc);
        assert!(!report.is_healthy());
        assert_eq!(
            report.mismatches,
            vec![BalanceMismatch {
                party_id: 1,
                party_name: "A".into(),
                recorded: 75,
                expected: 50,
            }]
        );
    }

    #[test]
    fn test_integrity_report_skips_legacy_parties() {
        let mut doc = doc_with_parties(&[(1, "Legacy", 0)]);
        doc.party_mut(1).unwrap().initial_balance = None;
        doc.party_mut(1).unwrap().balance = 12345;

        let report = build_integrity_report(&doc);
        assert!(report.is_healthy());
        assert_eq!(report.unverified_parties, 1);
    }

    #[test]
    fn test_integrity_report_detects_duplicate_ids() {
        let mut doc = doc_with_parties(&[(1, "A", 0)]);
        apply_transaction(&mut doc, tx(1, Some(1), TransactionKind::Credit, 5)).unwrap();

        let report = build_integrity_report(&doc);
        assert_eq!(report.duplicate_ids, vec![1]);
        assert!(!report.is_healthy());
    }
}
