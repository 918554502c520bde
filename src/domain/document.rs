use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{Expense, LedgerError, Party, PartyId, Settings, Transaction, User};

/// The record collections of a data file, by wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Parties,
    Transactions,
    Expenses,
    Users,
}

impl Collection {
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Parties => "clients",
            Collection::Transactions => "debts",
            Collection::Expenses => "expenses",
            Collection::Users => "users",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A record that does not fit its collection's type, e.g. a debt with a type
/// other than the four known ones. It is written back untouched at the
/// position it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct UntypedRecord {
    pub collection: Collection,
    pub position: usize,
    pub value: Value,
    pub reason: String,
}

impl UntypedRecord {
    pub fn id(&self) -> Option<u64> {
        self.value.get("id").and_then(Value::as_u64)
    }
}

/// The whole persisted state. Collections keep insertion order, which is also
/// creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub parties: Vec<Party>,
    pub transactions: Vec<Transaction>,
    pub expenses: Vec<Expense>,
    pub settings: Settings,
    pub users: Vec<User>,
    /// Top-level collections this crate does not know about.
    pub extra: Map<String, Value>,
    pub untyped: Vec<UntypedRecord>,
}

impl Document {
    pub fn party(&self, id: PartyId) -> Option<&Party> {
        self.parties.iter().find(|p| p.id == id)
    }

    pub fn party_mut(&mut self, id: PartyId) -> Option<&mut Party> {
        self.parties.iter_mut().find(|p| p.id == id)
    }

    /// Whether a record with `id` sits in `collection` but could not be typed.
    pub fn has_untyped(&self, collection: Collection, id: u64) -> bool {
        self.untyped
            .iter()
            .any(|r| r.collection == collection && r.id() == Some(id))
    }

    /// Largest record id in any collection, untyped records included.
    pub fn max_id(&self) -> Option<u64> {
        let parties = self.parties.iter().map(|p| p.id);
        let transactions = self.transactions.iter().map(|t| t.id);
        let expenses = self.expenses.iter().map(|e| e.id);
        let users = self.users.iter().map(|u| u.id);
        let untyped = self.untyped.iter().filter_map(UntypedRecord::id);
        parties
            .chain(transactions)
            .chain(expenses)
            .chain(users)
            .chain(untyped)
            .max()
    }

    /// Allocate an id for a new record.
    ///
    /// Ids stay time-derived (epoch milliseconds) so they sort with records
    /// written by older versions, but never repeat: when two records are
    /// created within the same millisecond the second one gets `max + 1`.
    /// Must only be called inside a store mutation, which serializes callers.
    pub fn next_id(&self, now: DateTime<Utc>) -> Result<u64, LedgerError> {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        match self.max_id() {
            Some(max) if max >= millis => max.checked_add(1).ok_or(LedgerError::IdsExhausted),
            _ => Ok(millis),
        }
    }

    fn merged<T: Serialize>(
        &self,
        collection: Collection,
        typed: &[T],
    ) -> Result<Vec<Value>, serde_json::Error> {
        let mut values = typed
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        // Records are only ever appended, so original positions still hold.
        for record in self.untyped.iter().filter(|r| r.collection == collection) {
            let at = record.position.min(values.len());
            values.insert(at, record.value.clone());
        }
        Ok(values)
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    clients: Vec<Value>,
    #[serde(default)]
    debts: Vec<Value>,
    #[serde(default)]
    expenses: Vec<Value>,
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    users: Vec<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn split_records<T: DeserializeOwned>(
    collection: Collection,
    values: Vec<Value>,
    untyped: &mut Vec<UntypedRecord>,
) -> Vec<T> {
    let mut typed = Vec::with_capacity(values.len());
    for (position, value) in values.into_iter().enumerate() {
        match T::deserialize(&value) {
            Ok(record) => typed.push(record),
            Err(err) => untyped.push(UntypedRecord {
                collection,
                position,
                value,
                reason: err.to_string(),
            }),
        }
    }
    typed
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDocument::deserialize(deserializer)?;
        let mut untyped = Vec::new();
        Ok(Document {
            parties: split_records(Collection::Parties, raw.clients, &mut untyped),
            transactions: split_records(Collection::Transactions, raw.debts, &mut untyped),
            expenses: split_records(Collection::Expenses, raw.expenses, &mut untyped),
            settings: raw.settings,
            users: split_records(Collection::Users, raw.users, &mut untyped),
            extra: raw.extra,
            untyped,
        })
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let parties = self
            .merged(Collection::Parties, &self.parties)
            .map_err(S::Error::custom)?;
        let transactions = self
            .merged(Collection::Transactions, &self.transactions)
            .map_err(S::Error::custom)?;
        let expenses = self
            .merged(Collection::Expenses, &self.expenses)
            .map_err(S::Error::custom)?;
        let users = self
            .merged(Collection::Users, &self.users)
            .map_err(S::Error::custom)?;

        let mut map = serializer.serialize_map(Some(5 + self.extra.len()))?;
        map.serialize_entry(Collection::Parties.key(), &parties)?;
        map.serialize_entry(Collection::Transactions.key(), &transactions)?;
        map.serialize_entry(Collection::Expenses.key(), &expenses)?;
        map.serialize_entry("settings", &self.settings)?;
        map.serialize_entry(Collection::Users.key(), &users)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
