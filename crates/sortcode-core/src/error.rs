//! Error types for sortcode

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A transaction failed boundary validation. Fails the single row, never
    /// the batch.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The external classifier exhausted its retries or returned an
    /// unparseable verdict. Downgraded to a low-confidence result inside
    /// batch processing.
    #[error("Classification error: {0}")]
    Classification(String),

    /// Caller misuse at a top-level entry point (e.g. an unknown business
    /// type tag). Raised immediately.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An internal storage fault (e.g. a poisoned learning-store lock).
    /// Not attributable to the transaction row or the caller.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
