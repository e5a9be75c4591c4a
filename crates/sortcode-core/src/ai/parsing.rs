//! Verdict parsing for classifier responses
//!
//! Models return free text; the contract says the text must resolve to a
//! known category code, `PERSONAL`, or `MANUAL_REVIEW`. The parser tolerates
//! quoting, punctuation and surrounding prose, but anything that does not
//! resolve is a classification error (and goes through the retry path).

use crate::error::{Error, Result};

/// A resolved classifier verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A known catalog category code (canonical casing).
    Category(String),
    /// Private spend; no category applies.
    Personal,
    /// A human should decide.
    ManualReview,
}

/// Resolve a raw classifier response into a verdict.
pub fn parse_verdict(response: &str) -> Result<Verdict> {
    // Fast path: the whole trimmed response is a single token.
    if let Some(verdict) = resolve_token(response.trim()) {
        return Ok(verdict);
    }

    // Tolerant path: scan tokens, preferring an explicit category code over
    // the sentinel words; prose like "not PERSONAL, use adminCosts" names
    // the sentinel it is rejecting.
    let mut sentinel = None;
    for token in response.split_whitespace() {
        match resolve_token(token) {
            Some(Verdict::Category(code)) => return Ok(Verdict::Category(code)),
            Some(other) if sentinel.is_none() => sentinel = Some(other),
            _ => {}
        }
    }
    if let Some(verdict) = sentinel {
        return Ok(verdict);
    }

    // Truncate on char boundaries; responses are arbitrary model text.
    let mut truncated: String = response.chars().take(200).collect();
    if truncated.len() < response.len() {
        truncated.push_str("...");
    }
    Err(Error::Classification(format!(
        "unrecognized classifier verdict: {}",
        truncated
    )))
}

fn resolve_token(token: &str) -> Option<Verdict> {
    let token = token.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_');
    if token.is_empty() {
        return None;
    }

    match token.to_uppercase().as_str() {
        "PERSONAL" => return Some(Verdict::Personal),
        "MANUAL_REVIEW" | "MANUALREVIEW" => return Some(Verdict::ManualReview),
        _ => {}
    }

    // Category codes are camelCase; match case-insensitively and return the
    // canonical catalog casing.
    category_def_case_insensitive(token).map(|code| Verdict::Category(code.to_string()))
}

fn category_def_case_insensitive(token: &str) -> Option<&'static str> {
    use crate::catalog::{
        PROPERTY_EXPENSES, PROPERTY_INCOME, SELF_EMPLOYMENT_EXPENSES, SELF_EMPLOYMENT_INCOME,
    };
    SELF_EMPLOYMENT_EXPENSES
        .iter()
        .chain(SELF_EMPLOYMENT_INCOME)
        .chain(PROPERTY_EXPENSES)
        .chain(PROPERTY_INCOME)
        .map(|def| def.code)
        .find(|code| code.eq_ignore_ascii_case(token))
}
