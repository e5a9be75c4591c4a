//! Batch orchestration
//!
//! Drives large transaction sets through the pipeline in fixed-size batches
//! with inter-row and inter-batch delays (the external classifier is a
//! shared local model; don't flood it). Rows whose local result is
//! inconclusive go to the external classifier with an in-process response
//! cache and an explicit retry policy. One bad row never aborts the batch:
//! failures become error-shaped results and are counted in the summary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ai::{
    build_prompt, parse_verdict, ClassificationRequest, ClassifierBackend, ClassifierClient,
    Verdict,
};
use crate::engine::{Categorizer, CategorizeOptions, REVIEW_THRESHOLD};
use crate::error::{Error, Result};
use crate::models::{BatchSummary, BusinessType, CategorizationResult, Reason, Transaction};
use crate::normalize::normalize;

/// Confidence assigned to a category verdict from the external classifier.
const AI_CONFIDENCE: f64 = 0.75;
/// Confidence assigned to an AI PERSONAL verdict.
const AI_PERSONAL_CONFIDENCE: f64 = 0.7;
/// Confidence carried by a MANUAL_REVIEW verdict.
const MANUAL_REVIEW_CONFIDENCE: f64 = 0.3;
/// Cache key prefix length over the cleaned description.
const CACHE_KEY_LEN: usize = 50;

/// Progress callback: (rows processed, total rows).
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Explicit retry policy for external classifier calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the given retry: `base_delay × attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Cooperative cancellation checked between batches, never mid-row.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Business type tag; parsed at entry, unknown tags raise a
    /// configuration error before any row runs.
    pub business_type: Option<String>,
    pub user_id: Option<String>,
    pub batch_size: usize,
    /// Inter-row delay (rate limiting towards the external classifier).
    pub row_delay: Duration,
    /// Delay between batches.
    pub batch_delay: Duration,
    /// External call timeout.
    pub ai_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            business_type: None,
            user_id: None,
            batch_size: 10,
            row_delay: Duration::from_millis(200),
            batch_delay: Duration::from_millis(500),
            ai_timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }
}

/// Results plus summary counts for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub results: Vec<CategorizationResult>,
    pub summary: BatchSummary,
}

type CacheKey = (String, i64, String);

/// Drives the engine over a transaction set, consulting the external
/// classifier for inconclusive rows.
pub struct BatchOrchestrator<'a> {
    categorizer: &'a Categorizer,
    ai: Option<&'a ClassifierClient>,
    options: BatchOptions,
    /// Per-run response cache keyed by (business type, rounded amount,
    /// description prefix); avoids redundant external calls.
    ai_cache: Mutex<HashMap<CacheKey, Verdict>>,
    progress: Option<ProgressCallback>,
    cancel: Option<CancellationToken>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(
        categorizer: &'a Categorizer,
        ai: Option<&'a ClassifierClient>,
        options: BatchOptions,
    ) -> Self {
        Self {
            categorizer,
            ai,
            options,
            ai_cache: Mutex::new(HashMap::new()),
            progress: None,
            cancel: None,
        }
    }

    /// Attach a progress callback called after every row.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Attach a cancellation token checked before each batch.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Run the batch. Returns partial results plus counts; only caller
    /// misuse (an unknown business type) fails the whole call.
    pub async fn run(&self, transactions: &[Transaction]) -> Result<BatchOutcome> {
        let business_type = match self.options.business_type.as_deref() {
            None => None,
            Some(tag) => Some(
                tag.parse::<BusinessType>()
                    .map_err(Error::Configuration)?,
            ),
        };
        let row_options = CategorizeOptions {
            business_type,
            user_id: self.options.user_id.clone(),
        };

        let total = transactions.len();
        let mut results = Vec::with_capacity(total);
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        let mut processed = 0usize;

        info!(
            total,
            batch_size = self.options.batch_size,
            business_type = ?self.options.business_type,
            "starting batch categorization"
        );

        for batch in transactions.chunks(self.options.batch_size.max(1)) {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                info!(processed, total, "batch categorization cancelled");
                break;
            }

            for transaction in batch {
                if processed > 0 {
                    tokio::time::sleep(self.options.row_delay).await;
                }

                let result = self.categorize_row(transaction, &row_options).await;
                tally(&mut summary, &result);
                results.push(result);

                processed += 1;
                if let Some(ref progress) = self.progress {
                    progress(processed, total);
                }
            }

            if processed < total {
                tokio::time::sleep(self.options.batch_delay).await;
            }
        }

        info!(
            categorized = summary.categorized,
            personal = summary.personal,
            manual_review = summary.manual_review,
            errors = summary.errors,
            "batch categorization finished"
        );

        Ok(BatchOutcome { results, summary })
    }

    /// One row, end to end. Failures are contained into an error-shaped
    /// result here; nothing propagates to the batch.
    async fn categorize_row(
        &self,
        transaction: &Transaction,
        options: &CategorizeOptions,
    ) -> CategorizationResult {
        let local = match self.categorizer.categorize_transaction(transaction, options) {
            Ok(result) => result,
            Err(err) => {
                warn!(transaction_id = %transaction.id, %err, "row failed validation");
                return CategorizationResult::error(&transaction.id, err.to_string());
            }
        };

        if !needs_external_classifier(&local) {
            return local;
        }
        let Some(ai) = self.ai else {
            return local;
        };

        match self.classify_externally(ai, transaction, options).await {
            Ok(verdict) => apply_verdict(local, verdict),
            Err(err) => {
                warn!(
                    transaction_id = %transaction.id,
                    %err,
                    "external classification failed; returning error result"
                );
                CategorizationResult::error(&transaction.id, err.to_string())
            }
        }
    }

    /// Call the external classifier with caching and retry/backoff.
    async fn classify_externally(
        &self,
        ai: &ClassifierClient,
        transaction: &Transaction,
        options: &CategorizeOptions,
    ) -> Result<Verdict> {
        let cleaned = normalize(&transaction.description);
        let key = self.cache_key(transaction, &cleaned);

        if let Ok(cache) = self.ai_cache.lock() {
            if let Some(verdict) = cache.get(&key) {
                debug!(transaction_id = %transaction.id, "classifier cache hit");
                return Ok(verdict.clone());
            }
        }

        let view = self.categorizer.available_categories(options.business_type);
        let allowed: Vec<_> = view.expenses.iter().chain(view.income.iter()).copied().collect();
        let request = ClassificationRequest {
            prompt: build_prompt(transaction, &cleaned, options.business_type, &allowed),
            business_type: options
                .business_type
                .map(|bt| bt.to_string())
                .unwrap_or_default(),
            timeout_ms: self.options.ai_timeout.as_millis() as u64,
        };

        let mut last_error: Option<Error> = None;
        for attempt in 1..=self.options.retry.max_attempts {
            match ai.classify(&request).await.and_then(|raw| parse_verdict(&raw)) {
                Ok(verdict) => {
                    if let Ok(mut cache) = self.ai_cache.lock() {
                        cache.insert(key, verdict.clone());
                    }
                    return Ok(verdict);
                }
                Err(err) => {
                    warn!(
                        transaction_id = %transaction.id,
                        attempt,
                        max_attempts = self.options.retry.max_attempts,
                        %err,
                        "external classifier attempt failed"
                    );
                    last_error = Some(err);
                    if attempt < self.options.retry.max_attempts {
                        tokio::time::sleep(self.options.retry.delay_for(attempt)).await;
                    }
                }
            }
        }

        Err(Error::Classification(format!(
            "external classifier exhausted {} attempts: {}",
            self.options.retry.max_attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    fn cache_key(&self, transaction: &Transaction, cleaned: &str) -> CacheKey {
        (
            self.options.business_type.clone().unwrap_or_default(),
            transaction.amount.round() as i64,
            cleaned.chars().take(CACHE_KEY_LEN).collect(),
        )
    }
}

/// Local rules are inconclusive when the result is a low-confidence
/// rule-based guess; screening verdicts and learned matches stand.
fn needs_external_classifier(result: &CategorizationResult) -> bool {
    result.confidence < REVIEW_THRESHOLD
        && matches!(result.reason, Reason::KeywordMatch | Reason::Fallback | Reason::NoMatch)
}

/// Fold an external verdict into the local result.
fn apply_verdict(mut result: CategorizationResult, verdict: Verdict) -> CategorizationResult {
    match verdict {
        Verdict::Category(code) => {
            result.category = Some(code.clone());
            result.confidence = AI_CONFIDENCE;
            result.reason = Reason::AiClassifier;
            result.explanation = format!("External classifier assigned {}", code);
            result.requires_manual_review = false;
        }
        Verdict::Personal => {
            result.category = None;
            result.confidence = AI_PERSONAL_CONFIDENCE;
            result.reason = Reason::AiClassifier;
            result.explanation = "External classifier judged this personal spend".to_string();
            result.is_personal = true;
            result.requires_manual_review = false;
        }
        Verdict::ManualReview => {
            result.category = None;
            result.confidence = MANUAL_REVIEW_CONFIDENCE;
            result.reason = Reason::ManualReview;
            result.explanation = "External classifier deferred to a human".to_string();
            result.requires_manual_review = true;
        }
    }
    result
}

fn tally(summary: &mut BatchSummary, result: &CategorizationResult) {
    if result.reason == Reason::Error {
        summary.errors += 1;
    } else if result.is_personal {
        summary.personal += 1;
    } else if result.requires_manual_review {
        summary.manual_review += 1;
    } else {
        summary.categorized += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;

    fn tx(id: &str, description: &str, amount: f64) -> Transaction {
        Transaction {
            id: id.to_string(),
            description: description.to_string(),
            amount,
            transaction_type: TransactionType::Expense,
            date: None,
            category: None,
        }
    }

    fn fast_options() -> BatchOptions {
        BatchOptions {
            batch_size: 2,
            row_delay: Duration::from_millis(0),
            batch_delay: Duration::from_millis(0),
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(0),
            },
            ..BatchOptions::default()
        }
    }

    #[test]
    fn test_retry_policy_backoff_grows() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_unknown_business_type_is_configuration_error() {
        let engine = Categorizer::in_memory();
        let options = BatchOptions {
            business_type: Some("bakery".to_string()),
            ..fast_options()
        };
        let orchestrator = BatchOrchestrator::new(&engine, None, options);
        let err = orchestrator.run(&[tx("t1", "fuel", 10.0)]).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_local_rules_without_ai() {
        let engine = Categorizer::in_memory();
        let orchestrator = BatchOrchestrator::new(&engine, None, fast_options());
        let transactions = vec![
            tx("t1", "Accountant quarterly fee", 150.0),
            tx("t2", "Tesco groceries", 45.30),
            tx("t3", "zzz unknowable", 9.99),
        ];
        let outcome = orchestrator.run(&transactions).await.unwrap();
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.summary.total, 3);
        assert_eq!(outcome.summary.personal, 1);
        assert_eq!(outcome.summary.errors, 0);
    }

    #[tokio::test]
    async fn test_invalid_row_becomes_error_result() {
        let engine = Categorizer::in_memory();
        let orchestrator = BatchOrchestrator::new(&engine, None, fast_options());
        let transactions = vec![tx("t1", "fuel", 10.0), tx("t2", "", 5.0)];
        let outcome = orchestrator.run(&transactions).await.unwrap();
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.summary.errors, 1);
        assert_eq!(outcome.results[1].reason, Reason::Error);
    }

    #[tokio::test]
    async fn test_failing_classifier_yields_error_result_not_batch_failure() {
        let engine = Categorizer::in_memory();
        let ai = ClassifierClient::Mock(crate::ai::MockBackend::failing());
        let orchestrator = BatchOrchestrator::new(&engine, Some(&ai), fast_options());
        let transactions = vec![
            tx("t1", "Accountant quarterly fee", 150.0),
            tx("t2", "zzz unknowable", 9.99),
        ];
        let outcome = orchestrator.run(&transactions).await.unwrap();
        assert_eq!(outcome.results.len(), 2);
        // t1 is conclusive locally; only t2 went external and failed.
        assert_eq!(outcome.summary.errors, 1);
        assert_eq!(outcome.results[1].reason, Reason::Error);
        assert_eq!(outcome.results[1].category.as_deref(), Some("other"));
        assert!((outcome.results[1].confidence - 0.1).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_ai_verdict_applies_to_inconclusive_row() {
        let engine = Categorizer::in_memory();
        let ai = ClassifierClient::Mock(crate::ai::MockBackend::with_response("travelCosts"));
        let orchestrator = BatchOrchestrator::new(&engine, Some(&ai), fast_options());
        let outcome = orchestrator
            .run(&[tx("t1", "zzz unknowable", 9.99)])
            .await
            .unwrap();
        let result = &outcome.results[0];
        assert_eq!(result.category.as_deref(), Some("travelCosts"));
        assert_eq!(result.reason, Reason::AiClassifier);
    }

    #[tokio::test]
    async fn test_manual_review_verdict() {
        let engine = Categorizer::in_memory();
        let ai = ClassifierClient::Mock(crate::ai::MockBackend::with_response("MANUAL_REVIEW"));
        let orchestrator = BatchOrchestrator::new(&engine, Some(&ai), fast_options());
        let outcome = orchestrator
            .run(&[tx("t1", "cheque 000421", 77.31)])
            .await
            .unwrap();
        assert!(outcome.results[0].requires_manual_review);
        assert_eq!(outcome.summary.manual_review, 1);
    }

    #[tokio::test]
    async fn test_cancellation_stops_between_batches() {
        let engine = Categorizer::in_memory();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let orchestrator = BatchOrchestrator::new(&engine, None, fast_options())
            .with_cancellation(cancel);
        let outcome = orchestrator
            .run(&[tx("t1", "fuel", 10.0), tx("t2", "fuel", 10.0)])
            .await
            .unwrap();
        assert!(outcome.results.is_empty());
    }

    #[tokio::test]
    async fn test_progress_callback_reports_every_row() {
        use std::sync::atomic::AtomicUsize;

        let engine = Categorizer::in_memory();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let orchestrator = BatchOrchestrator::new(&engine, None, fast_options()).with_progress(
            Box::new(move |done, total| {
                assert!(done <= total);
                seen.store(done, Ordering::Relaxed);
            }),
        );
        let transactions = vec![
            tx("t1", "fuel", 10.0),
            tx("t2", "fuel", 10.0),
            tx("t3", "fuel", 10.0),
        ];
        orchestrator.run(&transactions).await.unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 3);
    }
}
