//! Capture error types.

use thiserror::Error;

/// Errors that can occur while capturing a document.
///
/// [`CaptureError::Launch`] is fatal to a run; every other variant only fails
/// the target being captured.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The browser process could not be started.
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// A page could not be opened in the shared browser.
    #[error("Failed to open page: {0}")]
    Page(String),

    /// Navigation to the document failed.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The document did not become ready in time.
    #[error("Document not ready after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The screenshot call failed.
    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    /// The document path cannot be turned into a URL.
    #[error("Invalid document path '{path}'")]
    Document { path: String },

    /// Failed to read a document from disk.
    #[error("Failed to read document '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The blocking capture task panicked or was cancelled.
    #[error("Capture task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
