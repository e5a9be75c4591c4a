//! Categorization pipeline
//!
//! Wires the components together for a single transaction:
//! normalize -> personal/capital screening (short-circuit) -> business-type
//! filter -> keyword scoring -> confidence blend -> user-learning override.
//! Everything here is pure and synchronous; the external classifier only
//! enters through the batch orchestrator.

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::business::CandidateFilter;
use crate::catalog::{
    category_def, is_known_category, CategoryDef, MIXED_USE, PROPERTY_EXPENSES, PROPERTY_INCOME,
    SELF_EMPLOYMENT_EXPENSES, SELF_EMPLOYMENT_INCOME,
};
use crate::confidence::{blend, is_vague, round2};
use crate::error::{Error, Result};
use crate::learning::{Correction, LearningStore, MemoryLearningStore};
use crate::models::{
    BusinessType, CategorizationResult, MixedUse, Reason, Transaction, TransactionType,
};
use crate::normalize::normalize;
use crate::score::score;
use crate::screen::{check_capital, check_non_allowable};

/// Results below this confidence are flagged for manual review.
pub const REVIEW_THRESHOLD: f64 = 0.5;

/// Per-call options for single-transaction categorization.
#[derive(Debug, Clone, Default)]
pub struct CategorizeOptions {
    pub business_type: Option<BusinessType>,
    /// When set, the user's correction history is consulted and may
    /// override the rule-based result.
    pub user_id: Option<String>,
}

/// The catalog subset available to a business type.
#[derive(Debug, Clone)]
pub struct CatalogView {
    pub expenses: Vec<&'static CategoryDef>,
    pub income: Vec<&'static CategoryDef>,
}

/// The categorization engine. Holds the injected learning store; cheap to
/// share across tasks.
pub struct Categorizer {
    learning: Arc<dyn LearningStore>,
}

impl Categorizer {
    /// Create an engine around an injected learning store.
    pub fn new(learning: Arc<dyn LearningStore>) -> Self {
        Self { learning }
    }

    /// Convenience constructor with a fresh in-memory learning store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryLearningStore::new()))
    }

    /// Boundary validation for a transaction row. Rows failing here produce
    /// a per-row error, never a batch failure.
    pub fn validate(&self, transaction: &Transaction) -> Result<()> {
        if transaction.id.trim().is_empty() {
            return Err(Error::Validation("transaction id is required".into()));
        }
        if transaction.description.trim().is_empty() {
            return Err(Error::Validation(format!(
                "transaction {} has an empty description",
                transaction.id
            )));
        }
        if !transaction.amount.is_finite() || transaction.amount <= 0.0 {
            return Err(Error::Validation(format!(
                "transaction {} amount must be a positive magnitude",
                transaction.id
            )));
        }
        Ok(())
    }

    /// Categorize one transaction with local rules and learning data.
    pub fn categorize_transaction(
        &self,
        transaction: &Transaction,
        options: &CategorizeOptions,
    ) -> Result<CategorizationResult> {
        self.validate(transaction)?;
        let cleaned = normalize(&transaction.description);

        // Screening short-circuits: no scoring, no business rules.
        if let Some(result) = check_non_allowable(transaction, &cleaned) {
            return Ok(result);
        }
        if let Some(result) = check_capital(transaction, &cleaned) {
            return Ok(result);
        }

        let filter = CandidateFilter::for_business_type(options.business_type);
        let outcome = score(&cleaned, transaction.transaction_type, &filter);

        // The ordered blend only applies to real keyword matches; fallback
        // tiers keep their fixed confidences.
        let confidence = if outcome.is_keyword_match() {
            let business_confidence = filter.confidence_for(transaction.category.as_deref());
            blend(outcome.confidence, business_confidence, transaction.amount, &cleaned)
        } else {
            round2(outcome.confidence)
        };

        let explanation = match outcome.reason {
            Reason::KeywordMatch => {
                let code = outcome.category.unwrap_or("other");
                let reference = category_def(code).map(|def| def.hmrc_ref).unwrap_or("");
                format!(
                    "Matched {:?} for {} ({})",
                    outcome.matched_keywords, code, reference
                )
            }
            Reason::Fallback => "Generic payment language; no category evidence".to_string(),
            _ => "No category keywords matched".to_string(),
        };

        let mut result = CategorizationResult::new(
            &transaction.id,
            outcome.category.map(String::from),
            confidence,
            outcome.reason,
            explanation,
        );
        result.alternatives = outcome.alternatives;

        if transaction.transaction_type == TransactionType::Expense {
            result.mixed_use = detect_mixed_use(&cleaned);
            if let Some(ref mixed) = result.mixed_use {
                result
                    .warnings
                    .push(format!("Possible mixed business/personal use: {}", mixed.trigger));
            }
        }
        if is_vague(&cleaned) {
            result
                .warnings
                .push("Description is vague; categorization is low-signal".to_string());
        }

        // Learned result takes over unless the rule-based confidence is
        // strictly higher; ties go to the learned category since it reflects
        // explicit user intent.
        if let Some(ref user_id) = options.user_id {
            if let Some(learned) = self.learning.lookup(user_id, &cleaned, Utc::now())? {
                let learned_confidence = round2(learned.confidence);
                if learned_confidence >= result.confidence {
                    debug!(
                        transaction_id = %transaction.id,
                        category = %learned.category,
                        confidence = learned_confidence,
                        "user learning override"
                    );
                    result.category = Some(learned.category.clone());
                    result.confidence = learned_confidence;
                    result.reason = learned.reason;
                    result.explanation =
                        "Matched this user's previous corrections".to_string();
                }
            }
        }

        if result.confidence < REVIEW_THRESHOLD {
            result.requires_manual_review = true;
        }

        Ok(result)
    }

    /// Record a user correction so future lookups prefer it.
    pub fn learn_from_user_corrections(
        &self,
        user_id: &str,
        transaction: &Transaction,
        original_category: Option<&str>,
        corrected_category: &str,
    ) -> Result<()> {
        if !is_known_category(corrected_category) && corrected_category != "capital_expenditure" {
            return Err(Error::Validation(format!(
                "unknown corrected category: {}",
                corrected_category
            )));
        }

        let cleaned = normalize(&transaction.description);
        self.learning.record_correction(
            user_id,
            Correction {
                description: cleaned,
                original_category: original_category.map(String::from),
                corrected_category: corrected_category.to_string(),
                corrected_at: Utc::now(),
            },
        )
    }

    /// The catalog subset a business type may use.
    pub fn available_categories(&self, business_type: Option<BusinessType>) -> CatalogView {
        let filter = CandidateFilter::for_business_type(business_type);
        let expenses = SELF_EMPLOYMENT_EXPENSES
            .iter()
            .chain(PROPERTY_EXPENSES)
            .filter(|def| filter.permits(def.code))
            .collect();
        let income = match business_type {
            Some(BusinessType::Property) => PROPERTY_INCOME.iter().collect(),
            Some(_) => SELF_EMPLOYMENT_INCOME.iter().collect(),
            None => SELF_EMPLOYMENT_INCOME.iter().chain(PROPERTY_INCOME).collect(),
        };
        CatalogView { expenses, income }
    }
}

/// Scan for mixed-use triggers; first match wins.
fn detect_mixed_use(cleaned: &str) -> Option<MixedUse> {
    MIXED_USE
        .iter()
        .find(|rule| cleaned.contains(rule.trigger))
        .map(|rule| MixedUse {
            trigger: rule.trigger.to_string(),
            guidance: rule.guidance.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn expense_options(business_type: Option<BusinessType>) -> CategorizeOptions {
        CategorizeOptions {
            business_type,
            user_id: None,
        }
    }

    #[test]
    fn test_validation_rejects_bad_rows() {
        let engine = Categorizer::in_memory();
        let mut bad = tx("fuel", 10.0);
        bad.id = "".to_string();
        assert!(matches!(
            engine.categorize_transaction(&bad, &expense_options(None)),
            Err(Error::Validation(_))
        ));

        let mut bad = tx("", 10.0);
        bad.id = "t2".to_string();
        assert!(engine.validate(&bad).is_err());

        let bad = tx("fuel", 0.0);
        assert!(engine.validate(&bad).is_err());
    }

    #[test]
    fn test_groceries_short_circuit() {
        let engine = Categorizer::in_memory();
        let result = engine
            .categorize_transaction(&tx("Tesco groceries weekly shop", 45.30), &expense_options(None))
            .unwrap();
        assert!(result.is_personal);
        assert!(result.category.is_none());
        assert_eq!(result.reason, Reason::NonAllowable);
    }

    #[test]
    fn test_laptop_is_capital() {
        let engine = Categorizer::in_memory();
        let result = engine
            .categorize_transaction(&tx("Dell laptop purchase", 650.0), &expense_options(None))
            .unwrap();
        assert_eq!(result.category.as_deref(), Some("capital_expenditure"));
        assert_eq!(result.reason, Reason::CapitalExpenditure);
    }

    #[test]
    fn test_freelancer_accountant_fee() {
        let engine = Categorizer::in_memory();
        let result = engine
            .categorize_transaction(
                &tx("Accountant quarterly fee", 150.0),
                &expense_options(Some(BusinessType::Freelancer)),
            )
            .unwrap();
        assert_eq!(result.category.as_deref(), Some("professionalFees"));
        assert!(result.confidence >= 0.7);
        assert!(!result.requires_manual_review);
    }

    #[test]
    fn test_reference_noise_falls_back_to_other() {
        let engine = Categorizer::in_memory();
        let result = engine
            .categorize_transaction(&tx("XYZ123 REF:88812 payment", 20.0), &expense_options(None))
            .unwrap();
        assert_eq!(result.category.as_deref(), Some("other"));
        assert_eq!(result.confidence, 0.3);
        assert!(result.requires_manual_review);
    }

    #[test]
    fn test_confidence_bounds_and_rounding() {
        let engine = Categorizer::in_memory();
        let samples = [
            tx("accountancy retainer and bookkeeping services for the year", 1000.0),
            tx("fuel", 12.34),
            tx("misc", 7.0),
            tx("mobile phone contract", 30.0),
        ];
        for sample in samples {
            let result = engine
                .categorize_transaction(&sample, &expense_options(Some(BusinessType::Services)))
                .unwrap();
            assert!(result.confidence >= 0.0 && result.confidence <= 0.95);
            let scaled = result.confidence * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-9, "not 2dp: {}", result.confidence);
        }
    }

    #[test]
    fn test_mixed_use_guidance_attached() {
        let engine = Categorizer::in_memory();
        let result = engine
            .categorize_transaction(&tx("Vodafone mobile contract", 35.0), &expense_options(None))
            .unwrap();
        let mixed = result.mixed_use.expect("mobile should flag mixed use");
        assert_eq!(mixed.trigger, "mobile");
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_learning_overrides_weak_rule_result() {
        let engine = Categorizer::in_memory();
        let t = tx("ACME subscription renewal", 42.0);
        engine
            .learn_from_user_corrections("u1", &t, Some("other"), "adminCosts")
            .unwrap();

        let options = CategorizeOptions {
            business_type: None,
            user_id: Some("u1".to_string()),
        };
        let result = engine.categorize_transaction(&t, &options).unwrap();
        assert_eq!(result.category.as_deref(), Some("adminCosts"));
        assert_eq!(result.reason, Reason::UserLearning);
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_learning_rejects_unknown_category() {
        let engine = Categorizer::in_memory();
        let t = tx("anything", 10.0);
        assert!(engine
            .learn_from_user_corrections("u1", &t, None, "notACategory")
            .is_err());
    }

    #[test]
    fn test_stronger_rule_beats_weaker_learned_result() {
        // A fuzzy learned match (0.72) loses to a keyword result blended to
        // a business baseline of 0.8.
        let engine = Categorizer::in_memory();
        let learned_tx = tx("hmrc office stationery order", 10.0);
        engine
            .learn_from_user_corrections("u1", &learned_tx, None, "other")
            .unwrap();

        let mut strong = tx("hmrc office stationery ordered", 150.0);
        strong.category = Some("adminCosts".to_string());
        let options = CategorizeOptions {
            business_type: Some(BusinessType::Services),
            user_id: Some("u1".to_string()),
        };
        let result = engine.categorize_transaction(&strong, &options).unwrap();
        assert_eq!(result.category.as_deref(), Some("adminCosts"));
        assert_eq!(result.reason, Reason::KeywordMatch);
    }

    #[test]
    fn test_available_categories_respects_business_type() {
        let engine = Categorizer::in_memory();

        let all = engine.available_categories(None);
        assert!(all.expenses.iter().any(|def| def.code == "propertyRepairs"));

        let freelancer = engine.available_categories(Some(BusinessType::Freelancer));
        assert!(freelancer.expenses.iter().any(|def| def.code == "professionalFees"));
        assert!(!freelancer.expenses.iter().any(|def| def.code == "costOfGoods"));
        assert!(freelancer.income.iter().any(|def| def.code == "turnover"));

        let property = engine.available_categories(Some(BusinessType::Property));
        assert!(property.income.iter().any(|def| def.code == "rentIncome"));
    }
}
