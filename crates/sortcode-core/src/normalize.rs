//! Description normalizer
//!
//! Strips transaction-system noise (bank reference codes, embedded dates,
//! long alphanumeric IDs, payment-system prefixes) from free-text
//! descriptions before any matching runs. Normalization is idempotent and
//! never fails: empty input yields an empty string.

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    /// Transaction-system prefixes at the start of the text: DD:, SO:, BP:,
    /// FPI:, POS, CARD PAYMENT TO, PAYMENT TO, DIRECT DEBIT.
    prefixes: Regex,
    /// Reference markers: REF:456, TXN 123, TRANS-789.
    references: Regex,
    /// Short letter+digit codes: TXN123, XYZ123.
    codes: Regex,
    /// Embedded numeric dates: 12/01/2024, 12-1-24, 12/01.
    dates: Regex,
    /// Long alphanumeric runs; only removed when they contain a digit.
    long_ids: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        prefixes: Regex::new(
            r"^(?:(?:dd|so|bp|fpi|fpo|pos|tfr)[:\s]+|card payment to\s+|payment to\s+|direct debit\s+)+",
        )
        .expect("prefix pattern is valid"),
        references: Regex::new(r"\b(?:ref|txn|trans)\b[:.\-]?\s*[a-z0-9]*\d[a-z0-9]*\b")
            .expect("reference pattern is valid"),
        codes: Regex::new(r"\b[a-z]{2,4}\d{2,}\b").expect("code pattern is valid"),
        dates: Regex::new(r"\b\d{1,2}[/\-]\d{1,2}(?:[/\-]\d{2,4})?\b")
            .expect("date pattern is valid"),
        long_ids: Regex::new(r"\b[a-z0-9]{10,}\b").expect("id pattern is valid"),
        whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
    })
}

/// Normalize a raw transaction description.
///
/// Lowercases, strips bank noise, collapses whitespace. Idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(description: &str) -> String {
    let p = patterns();

    let text = description.to_lowercase();
    let text = p.prefixes.replace(&text, " ");
    let text = p.references.replace_all(&text, " ");
    let text = p.codes.replace_all(&text, " ");
    let text = p.dates.replace_all(&text, " ");
    // Long runs are only noise when they carry digits; "accountancy" stays.
    let text = p.long_ids.replace_all(&text, |caps: &regex::Captures<'_>| {
        let m = &caps[0];
        if m.chars().any(|c| c.is_ascii_digit()) {
            String::new()
        } else {
            m.to_string()
        }
    });

    p.whitespace.replace_all(&text, " ").trim().to_string()
}
