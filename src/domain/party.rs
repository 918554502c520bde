use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Amount;

pub type PartyId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    /// Someone we sell to; a positive balance is money they owe us
    #[default]
    Client,
    /// Someone we buy from; a negative balance is money we owe them
    Supplier,
}

impl PartyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyKind::Client => "client",
            PartyKind::Supplier => "supplier",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "client" => Some(PartyKind::Client),
            "supplier" => Some(PartyKind::Supplier),
            _ => None,
        }
    }
}

impl std::fmt::Display for PartyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A client or supplier with a running balance.
///
/// The balance is only ever changed by recording a transaction against the
/// party, so `balance == initial_balance + Σ signed deltas` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: PartyId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: PartyKind,
    #[serde(default)]
    pub balance: Amount,
    /// Balance at creation. Absent on records written before it was tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_balance: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Party {
    pub fn new(
        id: PartyId,
        name: String,
        kind: PartyKind,
        initial_balance: Amount,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            phone: None,
            address: None,
            kind,
            balance: initial_balance,
            initial_balance: Some(initial_balance),
            created_at: Some(created_at),
            extra: Map::new(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Positive balance: the party owes us.
    pub fn is_receivable(&self) -> bool {
        self.balance > 0
    }

    /// Negative balance: we owe the party.
    pub fn is_payable(&self) -> bool {
        self.balance < 0
    }
}
