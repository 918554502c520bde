use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Amount, PartyId};

pub type TransactionId = u64;

/// The four ledger movements. The sign of each one is fixed from our point
/// of view: positive balances are owed to us, negative ones are owed by us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// We extended credit to the party (they owe us more)
    Credit,
    /// We took goods or credit from the party (we owe them more)
    Debit,
    /// The party paid us
    Payment,
    /// We paid the party
    Receipt,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 4] = [
        TransactionKind::Credit,
        TransactionKind::Debit,
        TransactionKind::Payment,
        TransactionKind::Receipt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
            TransactionKind::Payment => "payment",
            TransactionKind::Receipt => "receipt",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "credit" => Some(TransactionKind::Credit),
            "debit" => Some(TransactionKind::Debit),
            "payment" => Some(TransactionKind::Payment),
            "receipt" => Some(TransactionKind::Receipt),
            _ => None,
        }
    }

    /// Signed change this kind applies to the party balance.
    pub fn signed_delta(&self, amount: Amount) -> Amount {
        match self {
            TransactionKind::Credit | TransactionKind::Receipt => amount,
            TransactionKind::Debit | TransactionKind::Payment => amount.saturating_neg(),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Completed,
}

/// An immutable ledger entry. There is no update or delete path: corrections
/// are made by recording an opposite transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Amount,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Party this entry is booked against. Kept even if the party is gone.
    #[serde(rename = "clientId", default)]
    pub party_id: Option<PartyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "date")]
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        party_id: Option<PartyId>,
        kind: TransactionKind,
        amount: Amount,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            amount,
            kind,
            party_id,
            description: None,
            recorded_at,
            status: TransactionStatus::Completed,
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn signed_delta(&self) -> Amount {
        self.kind.signed_delta(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_table() {
        assert_eq!(TransactionKind::Credit.signed_delta(100), 100);
        assert_eq!(TransactionKind::Debit.signed_delta(100), -100);
        assert_eq!(TransactionKind::Payment.signed_delta(100), -100);
        assert_eq!(TransactionKind::Receipt.signed_delta(100), 100);
    }

    #[test]
    fn test_kind_names() {
        for kind in TransactionKind::ALL {
            assert_eq!(TransactionKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::from_name("PAYMENT"), Some(TransactionKind::Payment));
        assert_eq!(TransactionKind::from_name("refund"), None);
    }

    #[test]
    fn test_wire_field_names() {
        let tx = Transaction::new(5, Some(9), TransactionKind::Debit, 200, Utc::now())
            .with_description("flour");
        let value = serde_json::to_value(&tx).unwrap();

        assert_eq!(value["type"], "debit");
        assert_eq!(value["clientId"], 9);
        assert_eq!(value["status"], "completed");
        assert_eq!(value["description"], "flour");
        assert!(value.get("date").is_some());
        assert!(value.get("recorded_at").is_none());
    }

    #[test]
    fn test_null_party_reference() {
        let json = r#"{
            "id": 1,
            "amount": 50,
            "type": "receipt",
            "clientId": null,
            "date": "2024-05-01T10:00:00.123Z",
            "status": "completed"
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.party_id, None);
        assert_eq!(tx.signed_delta(), 50);
    }

    #[test]
    fn test_unknown_kind_does_not_type() {
        // Such records are kept verbatim by the document instead.
        let json = r#"{"id": 1, "amount": 5, "type": "gift", "date": "2024-05-01T10:00:00Z"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }
}
