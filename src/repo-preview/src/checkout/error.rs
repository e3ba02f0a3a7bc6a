//! Checkout error types.

use thiserror::Error;

/// Errors that can occur while checking out a repository.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Clone failed.
    #[error("Failed to clone repository: {message}")]
    CloneFailed { message: String },

    /// Clone did not finish in time.
    #[error("Clone timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The requested document path escapes the repository.
    #[error("Document path '{path}' must be relative and stay inside the repository")]
    InvalidDocumentPath { path: String },
}
