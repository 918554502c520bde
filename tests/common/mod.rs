// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use dyonak::application::LedgerService;
use dyonak::domain::{Party, PartyKind};
use tempfile::TempDir;

/// Helper to create a test service with a temporary data file
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(data_path(&temp_dir)).await?;
    Ok((service, temp_dir))
}

pub fn data_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("db.json")
}

/// Test fixture: a client and a supplier, both starting at zero
pub struct StandardParties {
    pub client: Party,
    pub supplier: Party,
}

impl StandardParties {
    pub async fn create(service: &LedgerService) -> Result<Self> {
        let client = service
            .add_party("Ali Hassan", PartyKind::Client, 0, Some("07701234567".into()), None)
            .await?;
        let supplier = service
            .add_party("Baghdad Flour Co.", PartyKind::Supplier, 0, None, Some("Karrada".into()))
            .await?;
        Ok(Self { client, supplier })
    }
}

/// A data file in the layout written by the original web front end.
pub const LEGACY_DOCUMENT: &str = r#"{
  "clients": [
    {
      "id": 1714557600123,
      "name": "Ali Hassan",
      "phone": "07701234567",
      "type": "client",
      "balance": 600,
      "createdAt": "2024-05-01T10:00:00.123Z"
    },
    {
      "id": 1714557600456,
      "name": "Baghdad Flour Co.",
      "phone": "07809876543",
      "type": "supplier",
      "balance": -150,
      "createdAt": "2024-05-01T10:00:00.456Z",
      "notes": "delivers on Sundays"
    }
  ],
  "debts": [
    {
      "id": 1714557700001,
      "amount": 1000,
      "type": "credit",
      "clientId": 1714557600123,
      "description": "rice and sugar",
      "date": "2024-05-01T10:01:40.001Z",
      "status": "completed"
    },
    {
      "id": 1714557700002,
      "amount": 400,
      "type": "payment",
      "clientId": 1714557600123,
      "date": "2024-05-01T10:01:40.002Z",
      "status": "completed"
    },
    {
      "id": 1714557700003,
      "amount": 150,
      "type": "debit",
      "clientId": 1714557600456,
      "date": "2024-05-01T10:01:40.003Z",
      "status": "completed"
    }
  ],
  "expenses": [
    {
      "id": 1714557800001,
      "amount": 250,
      "category": "rent",
      "note": "May",
      "date": "2024-05-01T10:03:20.001Z"
    }
  ],
  "settings": {
    "companyName": "متجر ديونك",
    "currency": "IQD",
    "notifications": true,
    "theme": "dark"
  },
  "users": [
    {
      "id": 1714557500000,
      "name": "Admin",
      "email": "admin@example.com",
      "password": "$2a$10$abcdefghijklmnopqrstuv",
      "createdAt": "2024-05-01T09:58:20.000Z"
    }
  ]
}"#;

/// A data file the original server accepts but that does not fit the typed
/// records everywhere: an expense without category, a debt type outside the
/// four known ones, a client without a name and settings with a string flag.
pub const LOOSE_DOCUMENT: &str = r#"{
  "clients": [
    { "id": 1, "name": "Ali Hassan", "type": "client", "balance": 0, "createdAt": "2024-05-01T10:00:00.123Z" },
    { "id": 2, "name": "Karim", "type": "supplier", "balance": -50 },
    { "id": 3, "name": null, "type": "client", "balance": 10 }
  ],
  "debts": [
    { "id": 10, "amount": 50, "type": "loan", "clientId": 2, "date": "2024-05-02T10:00:00.000Z" }
  ],
  "expenses": [
    { "id": 20, "amount": 75, "date": "2024-05-03T10:00:00.250Z" }
  ],
  "settings": { "companyName": "Karrada Market", "notifications": "false" },
  "users": []
}"#;
