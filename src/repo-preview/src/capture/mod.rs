//! Document capture.
//!
//! A [`CaptureEngine`] turns a [`RenderedDocument`] into the bytes of the
//! artifact written for a target. [`ChromeCapture`] screenshots documents in
//! headless Chrome; [`MarkupPreview`] returns the HTML itself and is used for
//! dry runs.

mod chrome;
mod error;
mod readiness;

pub use chrome::ChromeCapture;
pub use error::CaptureError;
pub use readiness::ReadinessPolicy;

use crate::targets::RepositoryIdentifier;
use crate::templates::{Canvas, RenderedDocument};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the browser-backed engine.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Viewport and screenshot size.
    pub canvas: Canvas,
    /// When a page counts as ready.
    pub readiness: ReadinessPolicy,
    /// Upper bound for navigation and readiness.
    pub navigation_timeout: Duration,
    /// Chrome binary to use instead of auto-detection.
    pub chrome_path: Option<PathBuf>,
    /// Whether to keep Chrome's sandbox enabled.
    pub sandbox: bool,
}

/// Produces artifacts from rendered documents.
///
/// One engine instance is shared by all targets of a run and released with
/// [`CaptureEngine::shutdown`] exactly once at the end.
#[async_trait]
pub trait CaptureEngine: Send + Sync {
    /// File extension of the produced artifacts.
    fn extension(&self) -> &'static str;

    /// Captures one document.
    async fn capture(
        &self,
        identifier: &RepositoryIdentifier,
        document: &RenderedDocument,
    ) -> Result<Vec<u8>, CaptureError>;

    /// Releases the engine.
    async fn shutdown(self)
    where
        Self: Sized;
}

/// Engine returning the document's HTML, for previewing cards without a
/// browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupPreview;

#[async_trait]
impl CaptureEngine for MarkupPreview {
    fn extension(&self) -> &'static str {
        "html"
    }

    async fn capture(
        &self,
        _identifier: &RepositoryIdentifier,
        document: &RenderedDocument,
    ) -> Result<Vec<u8>, CaptureError> {
        match document {
            RenderedDocument::Markup { html, .. } => Ok(html.clone().into_bytes()),
            RenderedDocument::File { path, .. } => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| CaptureError::IoError {
                        path: path.display().to_string(),
                        source,
                    })
            }
        }
    }

    async fn shutdown(self) {}
}
