use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_COMPANY_NAME: &str = "متجر ديونك";
pub const DEFAULT_CURRENCY: &str = "IQD";

pub const COMPANY_NAME_KEY: &str = "companyName";
pub const CURRENCY_KEY: &str = "currency";
pub const NOTIFICATIONS_KEY: &str = "notifications";

/// Shop-wide preferences.
///
/// Kept as the raw JSON object, since other front ends merge arbitrary request
/// bodies into it. The accessors read the known keys leniently and fall back
/// to the defaults when a key is missing or holds an unusable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut values = Map::new();
        values.insert(COMPANY_NAME_KEY.into(), DEFAULT_COMPANY_NAME.into());
        values.insert(CURRENCY_KEY.into(), DEFAULT_CURRENCY.into());
        values.insert(NOTIFICATIONS_KEY.into(), Value::Bool(true));
        Self { values }
    }
}

/// Partial settings change. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub company_name: Option<String>,
    pub currency: Option<String>,
    pub notifications: Option<bool>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none() && self.currency.is_none() && self.notifications.is_none()
    }
}

impl Settings {
    pub fn company_name(&self) -> &str {
        self.text(COMPANY_NAME_KEY).unwrap_or(DEFAULT_COMPANY_NAME)
    }

    pub fn currency(&self) -> &str {
        self.text(CURRENCY_KEY).unwrap_or(DEFAULT_CURRENCY)
    }

    /// Accepts booleans, `"true"`/`"false"` style strings and numbers.
    pub fn notifications(&self) -> bool {
        match self.values.get(NOTIFICATIONS_KEY) {
            Some(Value::Bool(on)) => *on,
            Some(Value::String(s)) => {
                !matches!(s.trim().to_lowercase().as_str(), "false" | "0" | "off" | "no")
            }
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            _ => true,
        }
    }

    /// Raw value of any key, including the ones this crate does not interpret.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Shallow merge: only the provided fields are overwritten.
    pub fn merge(&mut self, update: SettingsUpdate) {
        if let Some(company_name) = update.company_name {
            self.values.insert(COMPANY_NAME_KEY.into(), company_name.into());
        }
        if let Some(currency) = update.currency {
            self.values.insert(CURRENCY_KEY.into(), currency.into());
        }
        if let Some(notifications) = update.notifications {
            self.values.insert(NOTIFICATIONS_KEY.into(), Value::Bool(notifications));
        }
    }
}

/// A login account. Credentials are issued and checked by the HTTP layer;
/// the ledger only stores and round-trips these records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Password hash, opaque here.
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
