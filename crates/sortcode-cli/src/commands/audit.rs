//! Audit command implementation

use std::path::Path;

use anyhow::{bail, Result};
use sortcode_core::{audit, AuditSeverity, BatchOptions, BatchOrchestrator, Categorizer};

use super::load_transactions;

/// Categorize a CSV locally and run reasonableness checks over the result.
pub async fn cmd_audit(file: &Path, business_type: Option<&str>) -> Result<()> {
    let transactions = load_transactions(file)?;
    if transactions.is_empty() {
        bail!("{} contains no transactions", file.display());
    }

    let engine = Categorizer::in_memory();
    let options = BatchOptions {
        business_type: business_type.map(str::to_string),
        row_delay: std::time::Duration::from_millis(0),
        batch_delay: std::time::Duration::from_millis(0),
        ..BatchOptions::default()
    };
    let orchestrator = BatchOrchestrator::new(&engine, None, options);
    let outcome = orchestrator.run(&transactions).await?;

    let report = audit(&transactions, &outcome.results);

    println!(
        "Income {:.2}, expenses {:.2}{}",
        report.total_income,
        report.total_expenses,
        match report.expense_to_income_ratio {
            Some(ratio) => format!(", expense ratio {:.0}%", ratio * 100.0),
            None => String::new(),
        }
    );

    if report.flags.is_empty() {
        println!("✅ No reasonableness flags");
        return Ok(());
    }

    println!("\n{} flag(s):", report.flags.len());
    for flag in &report.flags {
        let marker = match flag.severity {
            AuditSeverity::High => "🔴",
            AuditSeverity::Medium => "🟡",
            AuditSeverity::Low => "⚪",
        };
        match &flag.transaction_id {
            Some(id) => println!("  {} [{}] {}: {}", marker, flag.code, id, flag.message),
            None => println!("  {} [{}] {}", marker, flag.code, flag.message),
        }
    }

    Ok(())
}
