//! Personal / capital expenditure screening
//!
//! Two independent checks run before any category scoring. If either fires,
//! the pipeline short-circuits: keyword scoring and business rules are
//! skipped entirely.

use tracing::debug;

use crate::catalog::{
    CAPITAL_KEYWORDS, EQUIPMENT_TERMS, LARGE_AMOUNT_THRESHOLD, NON_ALLOWABLE, PERSONAL_LIKE_TERMS,
};
use crate::models::{CategorizationResult, Reason, Transaction};

/// Confidence for an exact non-allowable keyword hit.
const NON_ALLOWABLE_CONFIDENCE: f64 = 0.9;
/// Confidence for the amount-plus-personal-terms heuristic.
const PERSONAL_HEURISTIC_CONFIDENCE: f64 = 0.6;
/// Confidence for an explicit capital keyword.
const CAPITAL_KEYWORD_CONFIDENCE: f64 = 0.8;
/// Confidence when only the amount-plus-equipment heuristic fires.
const CAPITAL_AMOUNT_CONFIDENCE: f64 = 0.6;

/// Detect personal and otherwise non-allowable spend.
///
/// First matching keyword group wins. A secondary heuristic flags large
/// amounts combined with personal-like terms at lower confidence.
pub fn check_non_allowable(transaction: &Transaction, cleaned: &str) -> Option<CategorizationResult> {
    for set in NON_ALLOWABLE {
        if let Some(keyword) = set.keywords.iter().find(|k| cleaned.contains(*k)) {
            debug!(
                transaction_id = %transaction.id,
                group = set.tag,
                keyword,
                "non-allowable keyword matched"
            );
            let mut result = CategorizationResult::new(
                &transaction.id,
                None,
                NON_ALLOWABLE_CONFIDENCE,
                Reason::NonAllowable,
                format!("'{}' indicates {} spend. {}", keyword, set.tag, set.guidance),
            );
            result.is_personal = true;
            return Some(result);
        }
    }

    // Large amounts with personal-sounding language are flagged even
    // without an exact keyword hit, at lower confidence.
    if transaction.amount > LARGE_AMOUNT_THRESHOLD {
        if let Some(term) = PERSONAL_LIKE_TERMS.iter().find(|t| cleaned.contains(*t)) {
            debug!(
                transaction_id = %transaction.id,
                term,
                amount = transaction.amount,
                "personal-like heuristic matched"
            );
            let mut result = CategorizationResult::new(
                &transaction.id,
                None,
                PERSONAL_HEURISTIC_CONFIDENCE,
                Reason::NonAllowable,
                format!(
                    "Large amount with personal-sounding term '{}'; likely not a business expense",
                    term
                ),
            );
            result.is_personal = true;
            result.requires_manual_review = true;
            return Some(result);
        }
    }

    None
}

/// Detect capital rather than revenue expenditure.
///
/// An explicit capital keyword classifies at 0.8; a large amount mentioning
/// equipment classifies at 0.6. Either way the recommendation is capital
/// allowances, not an expense category.
pub fn check_capital(transaction: &Transaction, cleaned: &str) -> Option<CategorizationResult> {
    if let Some(keyword) = CAPITAL_KEYWORDS.iter().find(|k| cleaned.contains(*k)) {
        debug!(transaction_id = %transaction.id, keyword, "capital keyword matched");
        return Some(capital_result(
            transaction,
            CAPITAL_KEYWORD_CONFIDENCE,
            format!(
                "'{}' indicates a long-lived asset; claim capital allowances instead of an expense",
                keyword
            ),
        ));
    }

    if transaction.amount > LARGE_AMOUNT_THRESHOLD {
        if let Some(term) = EQUIPMENT_TERMS.iter().find(|t| cleaned.contains(*t)) {
            debug!(
                transaction_id = %transaction.id,
                term,
                amount = transaction.amount,
                "capital amount heuristic matched"
            );
            return Some(capital_result(
                transaction,
                CAPITAL_AMOUNT_CONFIDENCE,
                format!(
                    "Amount over {:.0} with '{}' suggests an asset purchase; \
                     consider capital allowances (annual investment allowance)",
                    LARGE_AMOUNT_THRESHOLD, term
                ),
            ));
        }
    }

    None
}

fn capital_result(
    transaction: &Transaction,
    confidence: f64,
    explanation: String,
) -> CategorizationResult {
    CategorizationResult::new(
        &transaction.id,
        Some("capital_expenditure".to_string()),
        confidence,
        Reason::CapitalExpenditure,
        explanation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use crate::normalize::normalize;

    fn tx(description: &str, amount: f64) -> Transaction {
        Transaction {
            id: "t1".to_string(),
            description: description.to_string(),
            amount,
            transaction_type: TransactionType::Expense,
            date: None,
            category: None,
        }
    }

    #[test]
    fn test_groceries_are_personal() {
        let t = tx("Tesco groceries weekly shop", 45.30);
        let result = check_non_allowable(&t, &normalize(&t.description)).unwrap();
        assert!(result.is_personal);
        assert!(result.category.is_none());
        assert_eq!(result.reason, Reason::NonAllowable);
        assert!((result.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fine_is_non_allowable() {
        let t = tx("Parking fine Westminster", 80.0);
        let result = check_non_allowable(&t, &normalize(&t.description)).unwrap();
        assert!(result.explanation.contains("BIM42515"));
    }

    #[test]
    fn test_personal_heuristic_needs_large_amount() {
        let small = tx("wedding gift", 40.0);
        assert!(check_non_allowable(&small, &normalize(&small.description)).is_none());

        let large = tx("wedding gift", 800.0);
        let result = check_non_allowable(&large, &normalize(&large.description)).unwrap();
        assert!((result.confidence - 0.6).abs() < f64::EPSILON);
        assert!(result.requires_manual_review);
    }

    #[test]
    fn test_laptop_over_threshold_is_capital() {
        let t = tx("Dell laptop purchase", 650.0);
        let result = check_capital(&t, &normalize(&t.description)).unwrap();
        assert_eq!(result.category.as_deref(), Some("capital_expenditure"));
        assert!((result.confidence - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_capital_keyword_beats_amount() {
        let t = tx("Workshop extension building work", 300.0);
        let result = check_capital(&t, &normalize(&t.description)).unwrap();
        assert!((result.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cheap_laptop_is_not_capital() {
        let t = tx("laptop sleeve", 25.0);
        assert!(check_capital(&t, &normalize(&t.description)).is_none());
    }
}
