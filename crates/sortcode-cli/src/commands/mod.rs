//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `categorize` - CSV categorization and JSON report output
//! - `categories` - Catalog listing per business type
//! - `audit` - Reasonableness checks over a categorized CSV

pub mod audit;
pub mod categories;
pub mod categorize;

// Re-export command functions for main.rs
pub use audit::*;
pub use categories::*;
pub use categorize::*;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use sortcode_core::{Transaction, TransactionType};

/// One CSV row as produced by the spreadsheet-parsing side.
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    description: String,
    amount: f64,
    #[serde(rename = "type")]
    transaction_type: String,
    #[serde(default)]
    date: Option<String>,
}

/// Load transactions from a CSV file with headers
/// `id,description,amount,type[,date]`.
pub(crate) fn load_transactions(file: &Path) -> Result<Vec<Transaction>> {
    let mut reader = csv::Reader::from_path(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let mut transactions = Vec::new();
    for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = record.with_context(|| format!("Bad CSV record at line {}", index + 2))?;
        let transaction_type: TransactionType = row
            .transaction_type
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Bad transaction type at line {}", index + 2))?;
        let date = match row.date.as_deref().filter(|d| !d.is_empty()) {
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .with_context(|| format!("Bad date at line {} (use YYYY-MM-DD)", index + 2))?,
            ),
            None => None,
        };

        transactions.push(Transaction {
            id: row.id,
            description: row.description,
            amount: row.amount,
            transaction_type,
            date,
            category: None,
        });
    }

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_load_transactions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,description,amount,type,date").unwrap();
        writeln!(file, "t1,shell garage fuel,30.00,expense,2026-04-12").unwrap();
        writeln!(file, "t2,client invoice 44,900.00,income,").unwrap();
        file.flush().unwrap();

        let transactions = load_transactions(file.path()).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].transaction_type, TransactionType::Expense);
        assert!(transactions[0].date.is_some());
        assert_eq!(transactions[1].transaction_type, TransactionType::Income);
        assert!(transactions[1].date.is_none());
    }

    #[test]
    fn test_load_transactions_rejects_bad_type() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,description,amount,type,date").unwrap();
        writeln!(file, "t1,fuel,30.00,standing-order,").unwrap();
        file.flush().unwrap();

        assert!(load_transactions(file.path()).is_err());
    }
}
