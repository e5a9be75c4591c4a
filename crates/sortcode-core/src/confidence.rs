//! Confidence blending
//!
//! Fuses the keyword score, the business-rule baseline, amount-pattern
//! signals and description-quality signals into one probability. The blend
//! is order-sensitive: each cap/floor applies at its own step, so the
//! adjustments must run in the stated order.

use crate::score::MAX_RULE_CONFIDENCE;

/// Generic terms that make a description "vague".
const VAGUE_TERMS: &[&str] = &["payment", "transaction", "transfer", "misc", "other", "various"];
/// Descriptions shorter than this are vague regardless of wording.
const VAGUE_LENGTH: usize = 10;
/// Descriptions longer than this earn a small detail bonus.
const DETAILED_LENGTH: usize = 50;

/// Round to 2 decimal places; every confidence leaves the engine rounded.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// True when the amount lands on a round 10 or 25 multiple ("exact amount
/// pattern" - invoiced or contracted amounts rather than shop totals).
pub fn is_exact_amount(amount: f64) -> bool {
    is_multiple_of(amount, 10.0) || is_multiple_of(amount, 25.0)
}

pub(crate) fn is_multiple_of(amount: f64, base: f64) -> bool {
    let multiple = (amount / base).round();
    multiple > 0.0 && (amount - multiple * base).abs() < 0.005
}

/// True when the cleaned description carries no classifiable signal.
pub fn is_vague(cleaned: &str) -> bool {
    cleaned.len() < VAGUE_LENGTH || VAGUE_TERMS.iter().any(|term| cleaned.contains(term))
}

/// Blend the keyword confidence with the remaining signals, in order:
///
/// 1. raise to at least the business-rule confidence (max, not sum)
/// 2. +0.1 (capped 0.95) for an exact amount pattern
/// 3. -0.2 (floor 0.1) for a vague description
/// 4. +0.05 (capped 0.95) for a detailed description
///
/// The result is rounded to 2 decimal places.
pub fn blend(
    keyword_confidence: f64,
    business_rule_confidence: f64,
    amount: f64,
    cleaned: &str,
) -> f64 {
    let mut confidence = keyword_confidence.max(business_rule_confidence);

    if is_exact_amount(amount) {
        confidence = (confidence + 0.1).min(MAX_RULE_CONFIDENCE);
    }
    if is_vague(cleaned) {
        confidence = (confidence - 0.2).max(0.1);
    }
    if cleaned.len() > DETAILED_LENGTH {
        confidence = (confidence + 0.05).min(MAX_RULE_CONFIDENCE);
    }

    round2(confidence)
}
