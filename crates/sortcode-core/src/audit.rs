//! Reasonableness auditing
//!
//! Post-hoc aggregate checks over a categorized period: expense-to-income
//! ratios and per-transaction outlier flags. Advisory only; the auditor
//! never blocks or alters categorization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{CategorizationResult, Transaction, TransactionType};

/// Overall expense ratio above this is flagged.
const HIGH_EXPENSE_RATIO: f64 = 0.9;
/// Cost-of-goods share of income above this is flagged.
const HIGH_COST_OF_GOODS_RATIO: f64 = 0.8;
/// Travel share of income above this is flagged.
const HIGH_TRAVEL_RATIO: f64 = 0.3;
/// Single transactions above this are flagged as high value.
const HIGH_VALUE_AMOUNT: f64 = 10_000.0;
/// Round-amount flag floor.
const ROUND_AMOUNT_FLOOR: f64 = 500.0;
/// Uncategorized spend above this is flagged.
const UNCATEGORIZED_FLOOR: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Low,
    Medium,
    High,
}

/// One advisory finding. `transaction_id` is set for per-transaction flags
/// and absent for period-level ratio flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditFlag {
    pub code: String,
    pub severity: AuditSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl AuditFlag {
    fn period(code: &str, severity: AuditSeverity, message: String) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message,
            transaction_id: None,
        }
    }

    fn transaction(
        code: &str,
        severity: AuditSeverity,
        message: String,
        transaction_id: &str,
    ) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message,
            transaction_id: Some(transaction_id.to_string()),
        }
    }
}

/// Ratio and outlier report for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub total_income: f64,
    pub total_expenses: f64,
    /// `None` when the period has no income.
    pub expense_to_income_ratio: Option<f64>,
    pub flags: Vec<AuditFlag>,
}

/// Audit a categorized period. Categories come from the paired results
/// (matched by transaction id), falling back to any category already on
/// the transaction.
pub fn audit(transactions: &[Transaction], results: &[CategorizationResult]) -> AuditReport {
    let categories: HashMap<&str, &str> = results
        .iter()
        .filter_map(|r| {
            r.category
                .as_deref()
                .map(|category| (r.transaction_id.as_str(), category))
        })
        .collect();
    let category_of = |tx: &Transaction| -> Option<String> {
        categories
            .get(tx.id.as_str())
            .map(|c| c.to_string())
            .or_else(|| tx.category.clone())
    };

    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut by_category: HashMap<String, f64> = HashMap::new();
    let mut flags = Vec::new();

    for tx in transactions {
        match tx.transaction_type {
            TransactionType::Income => total_income += tx.amount,
            TransactionType::Expense => {
                total_expenses += tx.amount;
                if let Some(category) = category_of(tx) {
                    *by_category.entry(category).or_insert(0.0) += tx.amount;
                }
            }
        }
        flag_transaction(tx, category_of(tx).as_deref(), &mut flags);
    }

    let ratio = if total_income > 0.0 {
        Some(total_expenses / total_income)
    } else {
        None
    };

    match ratio {
        Some(r) if r > HIGH_EXPENSE_RATIO => {
            flags.push(AuditFlag::period(
                "high_expense_ratio",
                AuditSeverity::High,
                format!(
                    "Expenses are {:.0}% of income; HMRC may query margins this thin",
                    r * 100.0
                ),
            ));
        }
        // No income at all but money going out reads the same way.
        None if total_expenses > 0.0 => {
            flags.push(AuditFlag::period(
                "high_expense_ratio",
                AuditSeverity::High,
                "Expenses recorded against a period with no income".to_string(),
            ));
        }
        _ => {}
    }

    if total_income > 0.0 {
        if let Some(&cost_of_goods) = by_category.get("costOfGoods") {
            if cost_of_goods / total_income > HIGH_COST_OF_GOODS_RATIO {
                flags.push(AuditFlag::period(
                    "high_cost_of_goods",
                    AuditSeverity::Medium,
                    format!(
                        "Cost of goods is {:.0}% of income",
                        cost_of_goods / total_income * 100.0
                    ),
                ));
            }
        }
        if let Some(&travel) = by_category.get("travelCosts") {
            if travel / total_income > HIGH_TRAVEL_RATIO {
                flags.push(AuditFlag::period(
                    "high_travel_costs",
                    AuditSeverity::Medium,
                    format!("Travel costs are {:.0}% of income", travel / total_income * 100.0),
                ));
            }
        }
    }

    debug!(
        total_income,
        total_expenses,
        flag_count = flags.len(),
        "reasonableness audit complete"
    );

    AuditReport {
        total_income,
        total_expenses,
        expense_to_income_ratio: ratio,
        flags,
    }
}

fn flag_transaction(tx: &Transaction, category: Option<&str>, flags: &mut Vec<AuditFlag>) {
    if tx.amount > HIGH_VALUE_AMOUNT {
        flags.push(AuditFlag::transaction(
            "high_value",
            AuditSeverity::Medium,
            format!("Transaction of {:.2} is unusually large", tx.amount),
            &tx.id,
        ));
    }
    if tx.amount > ROUND_AMOUNT_FLOOR && is_multiple_of(tx.amount, 100.0) {
        flags.push(AuditFlag::transaction(
            "round_amount",
            AuditSeverity::Low,
            format!("Round amount of {:.2} may be an estimate", tx.amount),
            &tx.id,
        ));
    }
    if category == Some("other") && tx.amount > UNCATEGORIZED_FLOOR {
        flags.push(AuditFlag::transaction(
            "uncategorized_high_value",
            AuditSeverity::High,
            format!("Uncategorized spend of {:.2} needs a proper category", tx.amount),
            &tx.id,
        ));
    }
}

fn is_multiple_of(amount: f64, unit: f64) -> bool {
    let remainder = (amount / unit).fract().abs();
    remainder < 1e-9 || remainder > 1.0 - 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reason;

    fn tx(id: &str, amount: f64, transaction_type: TransactionType) -> Transaction {
        Transaction {
            id: id.to_string(),
            description: "test".to_string(),
            amount,
            transaction_type,
            date: None,
            category: None,
        }
    }

    fn result(id: &str, category: &str) -> CategorizationResult {
        CategorizationResult::new(
            id,
            Some(category.to_string()),
            0.8,
            Reason::KeywordMatch,
            "test",
        )
    }

    #[test]
    fn test_healthy_period_has_no_flags() {
        let transactions = vec![
            tx("i1", 9_875.5, TransactionType::Income),
            tx("e1", 312.55, TransactionType::Expense),
        ];
        let results = vec![result("e1", "adminCosts")];
        let report = audit(&transactions, &results);
        assert!(report.flags.is_empty());
        let expected = 312.55 / 9_875.5;
        assert!((report.expense_to_income_ratio.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_high_expense_ratio() {
        let transactions = vec![
            tx("i1", 1_000.0, TransactionType::Income),
            tx("e1", 950.33, TransactionType::Expense),
        ];
        let report = audit(&transactions, &[result("e1", "adminCosts")]);
        let flag = report
            .flags
            .iter()
            .find(|f| f.code == "high_expense_ratio")
            .unwrap();
        assert_eq!(flag.severity, AuditSeverity::High);
        assert!(flag.transaction_id.is_none());
    }

    #[test]
    fn test_no_income_with_expenses_flags_ratio() {
        let transactions = vec![tx("e1", 42.17, TransactionType::Expense)];
        let report = audit(&transactions, &[result("e1", "adminCosts")]);
        assert!(report.expense_to_income_ratio.is_none());
        assert!(report.flags.iter().any(|f| f.code == "high_expense_ratio"));
    }

    #[test]
    fn test_category_ratio_flags() {
        let transactions = vec![
            tx("i1", 1_000.0, TransactionType::Income),
            tx("e1", 810.75, TransactionType::Expense),
        ];
        let report = audit(&transactions, &[result("e1", "costOfGoods")]);
        assert!(report.flags.iter().any(|f| f.code == "high_cost_of_goods"));

        let report = audit(&transactions, &[result("e1", "travelCosts")]);
        assert!(report.flags.iter().any(|f| f.code == "high_travel_costs"));
    }

    #[test]
    fn test_per_transaction_flags() {
        let transactions = vec![
            tx("i1", 100_000.0, TransactionType::Income),
            tx("e1", 12_500.5, TransactionType::Expense),
            tx("e2", 700.0, TransactionType::Expense),
            tx("e3", 1_250.0, TransactionType::Expense),
        ];
        let results = vec![
            result("e1", "costOfGoods"),
            result("e2", "adminCosts"),
            result("e3", "other"),
        ];
        let report = audit(&transactions, &results);

        let codes_for = |id: &str| -> Vec<&str> {
            report
                .flags
                .iter()
                .filter(|f| f.transaction_id.as_deref() == Some(id))
                .map(|f| f.code.as_str())
                .collect()
        };
        assert_eq!(codes_for("e1"), vec!["high_value"]);
        assert_eq!(codes_for("e2"), vec!["round_amount"]);
        assert_eq!(codes_for("e3"), vec!["uncategorized_high_value"]);
    }

    #[test]
    fn test_round_amount_needs_floor() {
        // 500 exactly is not over the floor; 600 is.
        let report = audit(&[tx("e1", 500.0, TransactionType::Expense)], &[]);
        assert!(!report.flags.iter().any(|f| f.code == "round_amount"));

        let report = audit(&[tx("e1", 600.0, TransactionType::Expense)], &[]);
        assert!(report.flags.iter().any(|f| f.code == "round_amount"));
    }

    #[test]
    fn test_income_round_amounts_are_flagged_too() {
        let report = audit(&[tx("i1", 2_000.0, TransactionType::Income)], &[]);
        assert!(report.flags.iter().any(|f| f.code == "round_amount"));
    }
}
