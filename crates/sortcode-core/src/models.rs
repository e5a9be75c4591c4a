//! Core data model for the categorization engine
//!
//! Transactions come in from external importers (CSV, spreadsheets); results
//! go out to external persistence/reporting. Both sides are plain serde
//! types. A `CategorizationResult` is created once per categorization call
//! and never mutated afterwards; re-running a transaction produces a new
//! result that supersedes the old one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a transaction. Amounts are stored as positive magnitudes;
/// this field carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "credit_in" => Ok(TransactionType::Income),
            "expense" | "debit" => Ok(TransactionType::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// A single bank/spreadsheet transaction row as produced by the (external)
/// import collaborator.
///
/// Invariants enforced at the pipeline boundary: `amount` is a strictly
/// positive magnitude, `description` and `id` are non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    /// Positive magnitude; direction lives in `transaction_type`.
    pub amount: f64,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Prior category, if the caller already has one (e.g. a re-run).
    #[serde(default)]
    pub category: Option<String>,
}

/// Declared business type, used to bias category eligibility and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    Retail,
    Wholesale,
    Services,
    Construction,
    Property,
    Freelancer,
}

impl BusinessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessType::Retail => "retail",
            BusinessType::Wholesale => "wholesale",
            BusinessType::Services => "services",
            BusinessType::Construction => "construction",
            BusinessType::Property => "property",
            BusinessType::Freelancer => "freelancer",
        }
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BusinessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retail" => Ok(BusinessType::Retail),
            "wholesale" => Ok(BusinessType::Wholesale),
            "services" => Ok(BusinessType::Services),
            "construction" => Ok(BusinessType::Construction),
            "property" => Ok(BusinessType::Property),
            "freelancer" => Ok(BusinessType::Freelancer),
            _ => Err(format!("Unknown business type: {}", s)),
        }
    }
}

/// Machine-readable tag explaining how a result was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// A category keyword cleared the scoring threshold.
    KeywordMatch,
    /// Personal or otherwise non-deductible spend.
    NonAllowable,
    /// Long-lived asset purchase; capital allowances apply.
    CapitalExpenditure,
    /// Generic payment/refund language, no category evidence.
    Fallback,
    /// Nothing matched at all.
    NoMatch,
    /// Exact match against the user's correction history.
    UserLearning,
    /// Fuzzy match against the user's correction history.
    SimilarUserPattern,
    /// The external AI classifier supplied the category.
    AiClassifier,
    /// The external AI classifier asked for a human decision.
    ManualReview,
    /// The row failed; see `warnings` for detail.
    Error,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::KeywordMatch => "keyword_match",
            Reason::NonAllowable => "non_allowable",
            Reason::CapitalExpenditure => "capital_expenditure",
            Reason::Fallback => "fallback",
            Reason::NoMatch => "no_match",
            Reason::UserLearning => "user_learning",
            Reason::SimilarUserPattern => "similar_user_pattern",
            Reason::AiClassifier => "ai_classifier",
            Reason::ManualReview => "manual_review",
            Reason::Error => "error",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A runner-up category suggestion from the keyword scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub category: String,
    pub score: f64,
}

/// Apportionment guidance for expenses with both business and personal
/// benefit (home office, mobile phone, vehicle running costs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixedUse {
    /// The term in the description that triggered the guidance.
    pub trigger: String,
    pub guidance: String,
}

/// The outcome of categorizing one transaction.
///
/// `category == None` means personal spend or capital expenditure; check
/// `is_personal` and `reason` to tell them apart. Confidence is in
/// [0.0, 1.0], rounded to 2 decimal places; rule-based paths never exceed
/// 0.95.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub transaction_id: String,
    pub category: Option<String>,
    pub confidence: f64,
    pub reason: Reason,
    pub explanation: String,
    /// Up to 3 ranked runner-up suggestions.
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub mixed_use: Option<MixedUse>,
    pub is_personal: bool,
    pub requires_manual_review: bool,
}

impl CategorizationResult {
    /// A skeleton result with the given category/confidence/reason; the
    /// pipeline fills in alternatives, warnings and flags afterwards.
    pub fn new(
        transaction_id: impl Into<String>,
        category: Option<String>,
        confidence: f64,
        reason: Reason,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            category,
            confidence,
            reason,
            explanation: explanation.into(),
            alternatives: Vec::new(),
            warnings: Vec::new(),
            mixed_use: None,
            is_personal: false,
            requires_manual_review: false,
        }
    }

    /// Error-shaped result used when a row fails inside a batch. The batch
    /// continues; this row is counted in `BatchSummary.errors`.
    pub fn error(transaction_id: impl Into<String>, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let mut result = Self::new(
            transaction_id,
            Some("other".to_string()),
            0.1,
            Reason::Error,
            "Categorization failed; defaulted to other",
        );
        result.warnings.push(detail);
        result.requires_manual_review = true;
        result
    }
}

/// Counts reported to batch callers alongside the partial results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub categorized: usize,
    pub personal: usize,
    pub manual_review: usize,
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_round_trip() {
        assert_eq!(TransactionType::Income.as_str(), "income");
        assert_eq!(
            TransactionType::from_str("expense").unwrap(),
            TransactionType::Expense
        );
        assert!(TransactionType::from_str("transfer").is_err());
    }

    #[test]
    fn test_business_type_parsing() {
        assert_eq!(
            BusinessType::from_str("Freelancer").unwrap(),
            BusinessType::Freelancer
        );
        assert!(BusinessType::from_str("bakery").is_err());
    }

    #[test]
    fn test_error_result_shape() {
        let result = CategorizationResult::error("tx-1", "boom");
        assert_eq!(result.category.as_deref(), Some("other"));
        assert_eq!(result.reason, Reason::Error);
        assert!(result.requires_manual_review);
        assert!((result.confidence - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reason_serialization() {
        let json = serde_json::to_string(&Reason::SimilarUserPattern).unwrap();
        assert_eq!(json, "\"similar_user_pattern\"");
    }
}
