//! Sortcode Core Library
//!
//! Shared functionality for the sortcode transaction categorization tool:
//! - HMRC category catalogs and business-type rule tables
//! - Description normalizer for bank-statement noise
//! - Personal and capital-expenditure screening
//! - Keyword scorer with business-rule candidate filtering
//! - Confidence blending from amount and description signals
//! - Per-user correction learning with fuzzy recall
//! - Pluggable external AI classifier backends (Ollama-style HTTP, mock)
//! - Batch orchestration with caching, retries, and progress reporting
//! - Reasonableness auditing and aggregate report export

pub mod ai;
pub mod audit;
pub mod batch;
pub mod business;
pub mod catalog;
pub mod confidence;
pub mod engine;
pub mod error;
pub mod learning;
pub mod models;
pub mod normalize;
pub mod report;
pub mod score;
pub mod screen;

/// Test utilities including the mock classifier server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    build_prompt, parse_verdict, ClassificationRequest, ClassifierBackend, ClassifierClient,
    HttpBackend, MockBackend, Verdict,
};
pub use audit::{audit, AuditFlag, AuditReport, AuditSeverity};
pub use batch::{
    BatchOptions, BatchOrchestrator, BatchOutcome, CancellationToken, ProgressCallback,
    RetryPolicy,
};
pub use catalog::{category_def, CategoryDef};
pub use engine::{CatalogView, CategorizeOptions, Categorizer};
pub use error::{Error, Result};
pub use learning::{Correction, LearnedMatch, LearningStore, MemoryLearningStore};
pub use models::{
    Alternative, BatchSummary, BusinessType, CategorizationResult, MixedUse, Reason, Transaction,
    TransactionType,
};
pub use normalize::normalize;
pub use report::{CategorizationReport, CategorySummary, ReportMetadata};
