//! Aggregate report export
//!
//! Serializable summary of one categorization run for downstream reporting
//! and persistence collaborators. Category totals use a `BTreeMap` so the
//! serialized output is stable across runs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{BatchSummary, CategorizationResult, Transaction, TransactionType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    pub engine_version: String,
}

/// Per-category totals across the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorySummary {
    pub count: usize,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizationReport {
    pub metadata: ReportMetadata,
    pub transactions: Vec<CategorizationResult>,
    pub category_summary: BTreeMap<String, CategorySummary>,
    pub processing_stats: BatchSummary,
}

impl CategorizationReport {
    /// Assemble a report from a finished run. Results are matched to their
    /// transactions by position; personal rows (no category) are excluded
    /// from the category summary.
    pub fn build(
        transactions: &[Transaction],
        results: &[CategorizationResult],
        summary: &BatchSummary,
        business_type: Option<&str>,
    ) -> Self {
        let mut category_summary: BTreeMap<String, CategorySummary> = BTreeMap::new();
        for (tx, result) in transactions.iter().zip(results) {
            if tx.transaction_type != TransactionType::Expense {
                continue;
            }
            if let Some(ref category) = result.category {
                let entry = category_summary.entry(category.clone()).or_default();
                entry.count += 1;
                entry.total_amount += tx.amount;
            }
        }

        Self {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                business_type: business_type.map(str::to_string),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            transactions: results.to_vec(),
            category_summary,
            processing_stats: summary.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reason;

    fn tx(id: &str, amount: f64) -> Transaction {
        Transaction {
            id: id.to_string(),
            description: "test".to_string(),
            amount,
            transaction_type: TransactionType::Expense,
            date: None,
            category: None,
        }
    }

    fn result(id: &str, category: Option<&str>) -> CategorizationResult {
        CategorizationResult::new(
            id,
            category.map(str::to_string),
            0.8,
            Reason::KeywordMatch,
            "test",
        )
    }

    #[test]
    fn test_category_totals() {
        let transactions = vec![tx("t1", 10.0), tx("t2", 15.5), tx("t3", 99.0)];
        let results = vec![
            result("t1", Some("travelCosts")),
            result("t2", Some("travelCosts")),
            result("t3", None),
        ];
        let summary = BatchSummary {
            total: 3,
            categorized: 2,
            personal: 1,
            ..BatchSummary::default()
        };
        let report =
            CategorizationReport::build(&transactions, &results, &summary, Some("services"));

        assert_eq!(report.transactions.len(), 3);
        assert_eq!(report.category_summary.len(), 1);
        let travel = &report.category_summary["travelCosts"];
        assert_eq!(travel.count, 2);
        assert!((travel.total_amount - 25.5).abs() < f64::EPSILON);
        assert_eq!(report.metadata.business_type.as_deref(), Some("services"));
    }

    #[test]
    fn test_serializes_to_json() {
        let report = CategorizationReport::build(
            &[tx("t1", 10.0)],
            &[result("t1", Some("adminCosts"))],
            &BatchSummary::default(),
            None,
        );
        let json = report.to_json().unwrap();
        assert!(json.contains("\"category_summary\""));
        assert!(json.contains("\"adminCosts\""));
        assert!(!json.contains("\"business_type\""));
    }
}
