//! Per-user correction learning
//!
//! Every manual correction is appended to the user's correction log and
//! upserted into a pattern cache keyed by a 50-character prefix of the
//! cleaned description. Lookups try an exact prefix match first (only
//! patterns used within the last 6 months), then fall back to fuzzy
//! edit-distance similarity over the whole cache at reduced confidence.
//!
//! The store is injected into the engine at construction so tests can use
//! isolated instances and deployments can substitute a shared backend.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Reason;

/// Corrections kept per user after a trim.
const LOG_KEEP: usize = 500;
/// Log length that triggers a trim.
const LOG_CAP: usize = 1000;
/// Pattern cache key length (cleaned-description prefix).
const PATTERN_KEY_LEN: usize = 50;
/// Days a pattern stays eligible for exact-key matching.
const ACTIVE_WINDOW_DAYS: i64 = 183;
/// Confidence stored for every learned pattern.
const LEARNED_CONFIDENCE: f64 = 0.9;
/// Minimum similarity for a fuzzy match.
const SIMILARITY_THRESHOLD: f64 = 0.7;
/// Fuzzy matches return the stored confidence scaled by this factor.
const SIMILARITY_DISCOUNT: f64 = 0.8;

/// One recorded user correction.
#[derive(Debug, Clone)]
pub struct Correction {
    pub description: String,
    pub original_category: Option<String>,
    pub corrected_category: String,
    pub corrected_at: DateTime<Utc>,
}

/// A cached learned pattern.
#[derive(Debug, Clone)]
pub struct LearnedPattern {
    pub category: String,
    pub confidence: f64,
    pub last_used: DateTime<Utc>,
}

/// Result of a learning lookup.
#[derive(Debug, Clone)]
pub struct LearnedMatch {
    pub category: String,
    pub confidence: f64,
    pub reason: Reason,
}

/// Storage seam for per-user learning data.
///
/// The in-memory implementation below suits a single process; multi-instance
/// deployments can back this with a shared key-value store.
pub trait LearningStore: Send + Sync {
    /// Record a correction and refresh the pattern cache.
    fn record_correction(&self, user_id: &str, correction: Correction) -> Result<()>;

    /// Find a learned category for a cleaned description, if any applies.
    fn lookup(
        &self,
        user_id: &str,
        cleaned_description: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LearnedMatch>>;
}

#[derive(Default)]
struct UserEntry {
    corrections: VecDeque<Correction>,
    patterns: HashMap<String, LearnedPattern>,
}

/// In-process learning store backed by Mutex-guarded maps.
#[derive(Default)]
pub struct MemoryLearningStore {
    users: Mutex<HashMap<String, UserEntry>>,
}

impl MemoryLearningStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of corrections currently retained for a user.
    pub fn correction_count(&self, user_id: &str) -> usize {
        self.users
            .lock()
            .map(|users| users.get(user_id).map_or(0, |e| e.corrections.len()))
            .unwrap_or(0)
    }
}

fn pattern_key(cleaned: &str) -> String {
    cleaned.chars().take(PATTERN_KEY_LEN).collect()
}

impl LearningStore for MemoryLearningStore {
    fn record_correction(&self, user_id: &str, correction: Correction) -> Result<()> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| Error::Internal("learning store lock poisoned".into()))?;
        let entry = users.entry(user_id.to_string()).or_default();

        let key = pattern_key(&correction.description);
        entry.patterns.insert(
            key,
            LearnedPattern {
                category: correction.corrected_category.clone(),
                confidence: LEARNED_CONFIDENCE,
                last_used: correction.corrected_at,
            },
        );

        entry.corrections.push_back(correction);
        if entry.corrections.len() > LOG_CAP {
            while entry.corrections.len() > LOG_KEEP {
                entry.corrections.pop_front();
            }
            debug!(user_id, "correction log trimmed to {} entries", LOG_KEEP);
        }

        Ok(())
    }

    fn lookup(
        &self,
        user_id: &str,
        cleaned_description: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<LearnedMatch>> {
        let users = self
            .users
            .lock()
            .map_err(|_| Error::Internal("learning store lock poisoned".into()))?;
        let Some(entry) = users.get(user_id) else {
            return Ok(None);
        };

        let key = pattern_key(cleaned_description);
        let window = Duration::days(ACTIVE_WINDOW_DAYS);

        // Exact prefix match, only while the pattern is in active use.
        if let Some(pattern) = entry.patterns.get(&key) {
            if now - pattern.last_used <= window {
                debug!(user_id, category = %pattern.category, "exact learned pattern match");
                return Ok(Some(LearnedMatch {
                    category: pattern.category.clone(),
                    confidence: pattern.confidence,
                    reason: Reason::UserLearning,
                }));
            }
        }

        // Fuzzy scan over the whole cache, expired patterns included; they
        // are retired from exact matching but still useful as evidence.
        let mut best: Option<(f64, &LearnedPattern)> = None;
        for (stored_key, pattern) in &entry.patterns {
            let sim = similarity(&key, stored_key);
            if sim > SIMILARITY_THRESHOLD {
                let replace = best.map_or(true, |(best_sim, _)| sim > best_sim);
                if replace {
                    best = Some((sim, pattern));
                }
            }
        }

        if let Some((sim, pattern)) = best {
            debug!(
                user_id,
                category = %pattern.category,
                similarity = sim,
                "fuzzy learned pattern match"
            );
            return Ok(Some(LearnedMatch {
                category: pattern.category.clone(),
                confidence: pattern.confidence * SIMILARITY_DISCOUNT,
                reason: Reason::SimilarUserPattern,
            }));
        }

        Ok(None)
    }
}

/// Normalized edit-distance similarity: `1 - levenshtein(a,b) / max(len)`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let longest = a_len.max(b_len);
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Levenshtein distance over chars, two-row dynamic programming.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (prev[j + 1] + 1) // deletion
                .min(current[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b_chars.len()]
}
