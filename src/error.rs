//! Structured error types for request validation and fetching.

use thiserror::Error;

/// Errors from request construction and the fetch pipeline.
///
/// `InvalidArgument` is raised synchronously at construction time and is not
/// retryable until the request description is corrected. The fetch-time
/// variants carry the upstream failure through unmodified — this layer adds
/// no retry, recovery, or reclassification.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("ticker not found: {ticker}")]
    TickerNotFound { ticker: String },

    #[error("provider error for {ticker}: {code}: {description}")]
    Upstream {
        ticker: String,
        code: String,
        description: String,
    },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("dataframe error: {0}")]
    Frame(String),
}
