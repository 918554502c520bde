use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Amount;

pub type ExpenseId = u64;

/// Money spent on running the business. Not tied to any party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: Amount,
    /// Older data files may carry expenses without a category.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "date")]
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Expense {
    pub fn new(id: ExpenseId, category: String, amount: Amount, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            amount,
            category,
            note: None,
            recorded_at,
            extra: Map::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_without_category_is_accepted() {
        let json = r#"{"id": 4, "amount": 250, "date": "2024-05-01T10:00:00.123Z"}"#;
        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.category, "");

        let value = serde_json::to_value(&expense).unwrap();
        assert!(value.get("category").is_none());
        assert_eq!(value["amount"], 250);
    }
}
