//! Business-type candidate filtering
//!
//! A declared business type restricts the expense categories the scorer may
//! pick and raises the confidence baseline: business-specific rules are
//! considered more reliable than generic keyword hits. Without a declared
//! type the candidate set is unrestricted at a neutral confidence.

use crate::catalog::{business_type_rule, BusinessTypeRule, ALWAYS_PERMITTED};
use crate::models::BusinessType;

/// Neutral confidence when no business type is declared.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;
/// Baseline when a business type's rule entry applies.
pub const RULE_CONFIDENCE: f64 = 0.7;
/// Raised baseline when the transaction's prior category sits in the type's
/// typical-ratio list.
pub const TYPICAL_CATEGORY_CONFIDENCE: f64 = 0.8;

/// The candidate-category restriction for one categorization run.
#[derive(Debug, Clone, Copy)]
pub struct CandidateFilter {
    rule: Option<&'static BusinessTypeRule>,
}

impl CandidateFilter {
    /// Build the filter for an optional declared business type. An unknown
    /// type never reaches here; parsing happens at the batch boundary.
    pub fn for_business_type(business_type: Option<BusinessType>) -> Self {
        Self {
            rule: business_type.and_then(business_type_rule),
        }
    }

    /// Whether the filter restricts the candidate set at all.
    pub fn is_restricted(&self) -> bool {
        self.rule.is_some()
    }

    /// Whether an expense category is a permitted candidate. Unrestricted
    /// filters permit everything; restricted filters permit the type's
    /// primary list plus the always-permitted generic categories.
    pub fn permits(&self, category: &str) -> bool {
        match self.rule {
            None => true,
            Some(rule) => {
                rule.primary_expenses.contains(&category)
                    || ALWAYS_PERMITTED.contains(&category)
            }
        }
    }

    /// The business-rule confidence for a chosen category: neutral without a
    /// rule; the rule baseline with one; raised when the transaction's prior
    /// category is one of the type's typical-ratio categories.
    pub fn confidence_for(&self, prior_category: Option<&str>) -> f64 {
        match self.rule {
            None => NEUTRAL_CONFIDENCE,
            Some(rule) => {
                let typical = prior_category.is_some_and(|prior| {
                    rule.typical_ratios.iter().any(|(code, _, _)| *code == prior)
                });
                if typical {
                    TYPICAL_CATEGORY_CONFIDENCE
                } else {
                    RULE_CONFIDENCE
                }
            }
        }
    }

    /// The underlying rule entry, if a specific type applies.
    pub fn rule(&self) -> Option<&'static BusinessTypeRule> {
        self.rule
    }
}
