//! Weighted keyword scoring
//!
//! Each candidate category's keywords vote on the cleaned description.
//! Longer keywords carry more weight; scores are normalized by the size of
//! the category's keyword set so large sets don't dominate. Ties break to
//! the first category in table order, which is fixed (see `catalog`).

use tracing::debug;

use crate::business::CandidateFilter;
use crate::catalog::{KeywordSet, EXPENSE_KEYWORDS, INCOME_KEYWORDS};
use crate::models::{Alternative, Reason, TransactionType};

/// Minimum normalized score a category must exceed to win.
pub const SCORE_THRESHOLD: f64 = 0.1;
/// Rule-based confidence never exceeds this.
pub const MAX_RULE_CONFIDENCE: f64 = 0.95;
/// Keywords longer than this weigh double.
const LONG_KEYWORD_LEN: usize = 8;

/// Outcome of scoring one cleaned description.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    pub category: Option<&'static str>,
    pub confidence: f64,
    pub reason: Reason,
    /// Ranked runner-up suggestions, best first, at most 3.
    pub alternatives: Vec<Alternative>,
    /// Keywords that contributed to the winning category.
    pub matched_keywords: Vec<&'static str>,
}

impl ScoreOutcome {
    /// True when a category keyword actually cleared the threshold, as
    /// opposed to a fallback tier.
    pub fn is_keyword_match(&self) -> bool {
        self.reason == Reason::KeywordMatch
    }
}

fn keyword_weight(keyword: &str) -> f64 {
    if keyword.len() > LONG_KEYWORD_LEN {
        2.0
    } else {
        1.0
    }
}

fn tables_for(transaction_type: TransactionType) -> &'static [KeywordSet] {
    match transaction_type {
        TransactionType::Expense => EXPENSE_KEYWORDS,
        TransactionType::Income => INCOME_KEYWORDS,
    }
}

/// Score every permitted category against the cleaned description and pick
/// the best match, or fall back on generic payment language.
pub fn score(
    cleaned: &str,
    transaction_type: TransactionType,
    filter: &CandidateFilter,
) -> ScoreOutcome {
    let mut best: Option<(&'static KeywordSet, f64, Vec<&'static str>)> = None;
    let mut scored: Vec<(&'static str, f64)> = Vec::new();

    for set in tables_for(transaction_type) {
        if transaction_type == TransactionType::Expense && !filter.permits(set.category) {
            continue;
        }

        let mut raw = 0.0;
        let mut matched = Vec::new();
        for keyword in set.keywords {
            if cleaned.contains(keyword) {
                raw += keyword_weight(keyword);
                matched.push(*keyword);
            }
        }
        if raw == 0.0 {
            continue;
        }

        let normalized = raw / set.keywords.len() as f64;
        scored.push((set.category, normalized));

        // Strictly-greater keeps the first category in table order on ties.
        let replace = match &best {
            None => true,
            Some((_, best_score, _)) => normalized > *best_score,
        };
        if replace {
            best = Some((set, normalized, matched));
        }
    }

    if let Some((set, normalized, matched)) = best {
        if normalized > SCORE_THRESHOLD {
            debug!(
                category = set.category,
                score = normalized,
                keywords = ?matched,
                "keyword match"
            );
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            let alternatives = scored
                .iter()
                .filter(|(category, _)| *category != set.category)
                .take(3)
                .map(|(category, score)| Alternative {
                    category: (*category).to_string(),
                    score: *score,
                })
                .collect();
            return ScoreOutcome {
                category: Some(set.category),
                confidence: normalized.min(MAX_RULE_CONFIDENCE),
                reason: Reason::KeywordMatch,
                alternatives,
                matched_keywords: matched,
            };
        }
    }

    fallback(cleaned, transaction_type)
}

/// No category cleared the threshold; classify on generic payment language.
fn fallback(cleaned: &str, transaction_type: TransactionType) -> ScoreOutcome {
    let fallback_category = match transaction_type {
        TransactionType::Expense => "other",
        TransactionType::Income => "otherBusinessIncome",
    };

    let (confidence, reason) = if cleaned.contains("payment") || cleaned.contains("invoice") {
        (0.3, Reason::Fallback)
    } else if cleaned.contains("refund") || cleaned.contains("credit") {
        (0.4, Reason::Fallback)
    } else {
        (0.2, Reason::NoMatch)
    };

    ScoreOutcome {
        category: Some(fallback_category),
        confidence,
        reason,
        alternatives: Vec::new(),
        matched_keywords: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BusinessType;

    fn unrestricted() -> CandidateFilter {
        CandidateFilter::for_business_type(None)
    }

    #[test]
    fn test_accountant_scores_professional_fees() {
        let outcome = score("accountant quarterly fee", TransactionType::Expense, &unrestricted());
        assert_eq!(outcome.category, Some("professionalFees"));
        assert_eq!(outcome.reason, Reason::KeywordMatch);
        assert!(outcome.confidence > SCORE_THRESHOLD);
        assert!(outcome.matched_keywords.contains(&"accountant"));
    }

    #[test]
    fn test_long_keywords_weigh_double() {
        // "accountancy" (11 chars) weighs 2, "fuel" (4 chars) weighs 1.
        let long = score("accountancy", TransactionType::Expense, &unrestricted());
        let short = score("fuel", TransactionType::Expense, &unrestricted());
        let long_score = 2.0 / 7.0; // professionalFees has 7 keywords
        let short_score = 1.0 / 9.0; // travelCosts has 9 keywords
        assert!((long.confidence - long_score).abs() < 1e-9);
        assert!((short.confidence - short_score).abs() < 1e-9);
    }

    #[test]
    fn test_filter_restricts_candidates() {
        // "supplier" would score costOfGoods, but freelancers don't carry it.
        let filter = CandidateFilter::for_business_type(Some(BusinessType::Freelancer));
        let outcome = score("supplier delivery", TransactionType::Expense, &filter);
        assert_ne!(outcome.category, Some("costOfGoods"));
    }

    #[test]
    fn test_payment_fallback() {
        let outcome = score("payment", TransactionType::Expense, &unrestricted());
        assert_eq!(outcome.category, Some("other"));
        assert!((outcome.confidence - 0.3).abs() < f64::EPSILON);
        assert_eq!(outcome.reason, Reason::Fallback);
    }

    #[test]
    fn test_refund_fallback() {
        let outcome = score("refund received", TransactionType::Expense, &unrestricted());
        assert!((outcome.confidence - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_match() {
        let outcome = score("zzz qqq", TransactionType::Expense, &unrestricted());
        assert_eq!(outcome.reason, Reason::NoMatch);
        assert!((outcome.confidence - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_income_table() {
        let outcome = score("client payment for invoice 42", TransactionType::Income, &unrestricted());
        assert_eq!(outcome.category, Some("turnover"));
        assert_eq!(outcome.reason, Reason::KeywordMatch);
    }

    #[test]
    fn test_alternatives_are_ranked_and_capped() {
        // Hits travelCosts (fuel, parking), premisesCosts (insurance),
        // adminCosts (phone).
        let outcome = score(
            "fuel parking insurance phone",
            TransactionType::Expense,
            &unrestricted(),
        );
        assert!(outcome.alternatives.len() <= 3);
        for pair in outcome.alternatives.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
