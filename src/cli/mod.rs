use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::application::validation::{
    parse_party_kind, parse_recorded_amount, parse_signed_amount, parse_transaction_kind,
};
use crate::application::LedgerService;
use crate::config::Config;
use crate::domain::{format_amount, PartyId, SettingsUpdate};

/// Dyonak - debts, payments and expenses ledger
#[derive(Parser)]
#[command(name = "dyonak")]
#[command(about = "Track what clients owe you and what you owe suppliers")]
#[command(version)]
pub struct Cli {
    /// Data file path (overrides DYONAK_DATA)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data file if it does not exist
    Init,

    /// Client and supplier management commands
    #[command(subcommand)]
    Party(PartyCommands),

    /// Record a transaction against a party
    Record {
        /// Transaction type: credit, debit, payment, receipt
        kind: String,

        /// Amount in whole currency units (e.g., "25000" or "25,000")
        amount: String,

        /// Party ID the transaction is booked against
        #[arg(short, long)]
        party: Option<PartyId>,

        /// Description of the transaction
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List all transactions
    Transactions,

    /// Expense commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Show dashboard totals
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Settings commands
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Verify that every balance matches its transactions
    Check,
}

#[derive(Subcommand)]
pub enum PartyCommands {
    /// Add a new client or supplier
    Add {
        /// Display name
        name: String,

        /// Party type: client, supplier
        #[arg(short = 't', long = "type", default_value = "client")]
        kind: String,

        /// Opening balance (positive: they owe us, negative: we owe them)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        balance: String,

        /// Phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Postal address
        #[arg(short, long)]
        address: Option<String>,
    },

    /// List parties
    List {
        /// Only this type: client, supplier
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
    },

    /// Show one party
    Show {
        /// Party ID
        id: PartyId,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Category (e.g., "rent", "salaries")
        category: String,

        /// Amount in whole currency units
        amount: String,

        /// Free-form note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List expenses
    List,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Change one or more settings
    Set {
        #[arg(long)]
        company_name: Option<String>,

        #[arg(long)]
        currency: Option<String>,

        #[arg(long)]
        notifications: Option<bool>,
    },
}

impl Cli {
    /// Resolve the data path: `--data` wins over the environment.
    pub fn data_path(&self, config: &Config) -> PathBuf {
        self.data
            .clone()
            .unwrap_or_else(|| config.data_path.clone())
    }

    pub async fn run(self, config: Config) -> Result<()> {
        let service = LedgerService::open(self.data_path(&config)).await?;

        match self.command {
            Commands::Init => {
                println!("Data file ready: {}", service.store().path().display());
            }

            Commands::Party(party_cmd) => {
                run_party_command(&service, party_cmd).await?;
            }

            Commands::Record {
                kind,
                amount,
                party,
                description,
            } => {
                let kind = parse_transaction_kind(&kind)?;
                let amount = parse_recorded_amount(&amount)?;

                let transaction = service
                    .record_transaction(party, kind, amount, description)
                    .await?;

                let party_name = match transaction.party_id {
                    Some(id) => service
                        .get_party(id)
                        .await
                        .map(|p| p.name)
                        .unwrap_or_else(|_| format!("unknown party {}", id)),
                    None => "no party".to_string(),
                };
                println!(
                    "Recorded {} of {} for {} ({})",
                    transaction.kind,
                    format_amount(transaction.amount),
                    party_name,
                    transaction.id
                );
            }

            Commands::Transactions => {
                run_transactions_command(&service).await?;
            }

            Commands::Expense(expense_cmd) => {
                run_expense_command(&service, expense_cmd).await?;
            }

            Commands::Stats { json } => {
                let totals = service.get_aggregates().await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&totals)?);
                } else {
                    let settings = service.get_settings().await;
                    let currency = settings.currency();
                    println!("Receivable: {:>14} {}", format_amount(totals.total_receivable), currency);
                    println!("Payable:    {:>14} {}", format_amount(totals.total_payable), currency);
                    println!("Income:     {:>14} {}", format_amount(totals.total_income), currency);
                    println!("Expenses:   {:>14} {}", format_amount(totals.total_expenses), currency);
                    println!("Parties:    {:>14}", totals.party_count);
                }
            }

            Commands::Settings(settings_cmd) => {
                run_settings_command(&service, settings_cmd).await?;
            }

            Commands::Check => {
                run_check_command(&service).await?;
            }
        }

        Ok(())
    }
}

async fn run_party_command(service: &LedgerService, cmd: PartyCommands) -> Result<()> {
    match cmd {
        PartyCommands::Add {
            name,
            kind,
            balance,
            phone,
            address,
        } => {
            let kind = parse_party_kind(&kind)?;
            let balance = parse_signed_amount(&balance)?;

            let party = service
                .add_party(&name, kind, balance, phone, address)
                .await?;
            println!(
                "Added {}: {} ({}), balance {}",
                party.kind,
                party.name,
                party.id,
                format_amount(party.balance)
            );
        }

        PartyCommands::List { kind } => {
            let kind = kind.as_deref().map(parse_party_kind).transpose()?;
            let parties = service.list_parties(kind).await;
            if parties.is_empty() {
                println!("No parties found.");
            } else {
                println!("{:<15} {:<24} {:<10} {:>14}", "ID", "NAME", "TYPE", "BALANCE");
                println!("{}", "-".repeat(66));
                for party in parties {
                    println!(
                        "{:<15} {:<24} {:<10} {:>14}",
                        party.id,
                        party.name,
                        party.kind,
                        format_amount(party.balance)
                    );
                }
            }
        }

        PartyCommands::Show { id } => {
            let party = service.get_party(id).await?;

            println!("Party: {}", party.name);
            println!("  ID:       {}", party.id);
            println!("  Type:     {}", party.kind);
            if let Some(phone) = &party.phone {
                println!("  Phone:    {}", phone);
            }
            if let Some(address) = &party.address {
                println!("  Address:  {}", address);
            }
            if let Some(created_at) = party.created_at {
                println!("  Created:  {}", created_at.format("%Y-%m-%d %H:%M:%S"));
            }
            println!("  Balance:  {}", format_amount(party.balance));
        }
    }
    Ok(())
}

async fn run_transactions_command(service: &LedgerService) -> Result<()> {
    let entries = service.list_transactions().await;
    if entries.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<17} {:<15} {:<20} {:<8} {:>12}  DESCRIPTION",
        "DATE", "ID", "PARTY", "TYPE", "AMOUNT"
    );
    println!("{}", "-".repeat(90));
    for entry in entries {
        let tx = &entry.transaction;
        println!(
            "{:<17} {:<15} {:<20} {:<8} {:>12}  {}",
            tx.recorded_at.format("%Y-%m-%d %H:%M"),
            tx.id,
            entry.party_name,
            tx.kind,
            format_amount(tx.amount),
            tx.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn run_expense_command(service: &LedgerService, cmd: ExpenseCommands) -> Result<()> {
    match cmd {
        ExpenseCommands::Add {
            category,
            amount,
            note,
        } => {
            let amount = parse_recorded_amount(&amount)?;
            let expense = service.add_expense(&category, amount, note).await?;
            println!(
                "Recorded expense: {} {} ({})",
                expense.category,
                format_amount(expense.amount),
                expense.id
            );
        }

        ExpenseCommands::List => {
            let expenses = service.list_expenses().await;
            if expenses.is_empty() {
                println!("No expenses found.");
            } else {
                println!("{:<17} {:<20} {:>12}  NOTE", "DATE", "CATEGORY", "AMOUNT");
                println!("{}", "-".repeat(64));
                for expense in expenses {
                    println!(
                        "{:<17} {:<20} {:>12}  {}",
                        expense.recorded_at.format("%Y-%m-%d %H:%M"),
                        expense.category,
                        format_amount(expense.amount),
                        expense.note.as_deref().unwrap_or("")
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_settings_command(service: &LedgerService, cmd: SettingsCommands) -> Result<()> {
    let settings = match cmd {
        SettingsCommands::Show => service.get_settings().await,
        SettingsCommands::Set {
            company_name,
            currency,
            notifications,
        } => {
            service
                .update_settings(SettingsUpdate {
                    company_name,
                    currency,
                    notifications,
                })
                .await?
        }
    };

    println!("Company:       {}", settings.company_name());
    println!("Currency:      {}", settings.currency());
    println!(
        "Notifications: {}",
        if settings.notifications() { "on" } else { "off" }
    );
    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await;

    println!("Parties:      {}", report.party_count);
    println!("Transactions: {}", report.transaction_count);
    if report.unverified_parties > 0 {
        println!(
            "Skipped:      {} (no initial balance on record)",
            report.unverified_parties
        );
    }
    if report.orphaned_transactions > 0 {
        println!(
            "Orphaned:     {} (party not found)",
            report.orphaned_transactions
        );
    }
    if report.untyped_records > 0 {
        println!(
            "Unreadable:   {} (kept as-is, not counted)",
            report.untyped_records
        );
    }
    println!();

    if report.is_healthy() {
        println!("Ledger is consistent.");
    } else {
        println!("Issues found:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
        anyhow::bail!("Ledger integrity check failed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_flag_overrides_config() {
        let cli = Cli::parse_from(["dyonak", "--data", "/tmp/other.json", "check"]);
        let config = Config::default();
        assert_eq!(cli.data_path(&config), PathBuf::from("/tmp/other.json"));
    }

    #[test]
    fn test_config_path_used_without_flag() {
        let cli = Cli::parse_from(["dyonak", "stats"]);
        let config = Config {
            data_path: PathBuf::from("shop.json"),
            ..Config::default()
        };
        assert_eq!(cli.data_path(&config), PathBuf::from("shop.json"));
    }

    #[test]
    fn test_negative_opening_balance_parses() {
        let cli = Cli::parse_from([
            "dyonak", "party", "add", "Karim", "--type", "supplier", "--balance", "-300",
        ]);
        match cli.command {
            Commands::Party(PartyCommands::Add { balance, kind, .. }) => {
                assert_eq!(balance, "-300");
                assert_eq!(kind, "supplier");
            }
            _ => panic!("expected party add"),
        }
    }

    #[test]
    fn test_record_arguments() {
        let cli = Cli::parse_from([
            "dyonak", "record", "payment", "400", "--party", "17", "-d", "cash",
        ]);
        match cli.command {
            Commands::Record {
                kind,
                amount,
                party,
                description,
            } => {
                assert_eq!(kind, "payment");
                assert_eq!(amount, "400");
                assert_eq!(party, Some(17));
                assert_eq!(description.as_deref(), Some("cash"));
            }
            _ => panic!("expected record"),
        }
    }
}
