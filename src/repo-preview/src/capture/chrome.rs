//! Headless Chrome capture backend.

use super::{CaptureEngine, CaptureError, CaptureOptions, ReadinessPolicy};
use crate::targets::RepositoryIdentifier;
use crate::templates::{Canvas, RenderedDocument};
use async_trait::async_trait;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Span};
use url::Url;

/// Interval between `document.readyState` polls.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Extra time the async wrapper allows beyond the navigation timeout, and
/// again for a timed-out task to close its tab.
const TASK_GRACE: Duration = Duration::from_secs(15);

/// How long the browser may sit idle between targets before the connection
/// is dropped.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(600);

/// Captures documents with a single headless Chrome process.
///
/// Every capture runs in its own tab, which is closed afterwards so console
/// state and navigation history never carry over between targets.
pub struct ChromeCapture {
    browser: Browser,
    options: CaptureOptions,
}

impl ChromeCapture {
    /// Launches the browser.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Launch`] if Chrome cannot be started.
    pub fn launch(options: CaptureOptions) -> Result<Self, CaptureError> {
        let Canvas { width, height } = options.canvas;
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(options.sandbox)
            .window_size(Some((width, height)))
            .path(options.chrome_path.clone())
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| CaptureError::Launch(format!("invalid launch options: {e}")))?;

        let browser =
            Browser::new(launch_options).map_err(|e| CaptureError::Launch(e.to_string()))?;

        info!(
            width,
            height,
            readiness = options.readiness.as_str(),
            "Launched headless browser"
        );
        Ok(Self { browser, options })
    }
}

#[async_trait]
impl CaptureEngine for ChromeCapture {
    fn extension(&self) -> &'static str {
        "png"
    }

    async fn capture(
        &self,
        identifier: &RepositoryIdentifier,
        document: &RenderedDocument,
    ) -> Result<Vec<u8>, CaptureError> {
        let RenderedDocument::File { path, canvas } = document else {
            return Err(CaptureError::Document {
                path: "<inline markup>".to_string(),
            });
        };

        let url = document_url(path)?;
        let browser = self.browser.clone();
        let options = self.options.clone();
        let canvas = *canvas;
        let repo = identifier.to_string();
        let span = Span::current();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);

        let mut task = tokio::task::spawn_blocking(move || {
            span.in_scope(|| {
                capture_in_new_tab(&browser, &options, canvas, &url, repo, &worker_cancelled)
            })
        });

        let limit = self.options.navigation_timeout + TASK_GRACE;
        if let Ok(joined) = tokio::time::timeout(limit, &mut task).await {
            return joined?;
        }

        // Let the worker close its tab before the next target starts.
        cancelled.store(true, Ordering::SeqCst);
        if tokio::time::timeout(TASK_GRACE, &mut task).await.is_err() {
            warn!("Capture task did not stop after cancellation");
        }
        Err(CaptureError::Timeout {
            timeout_secs: self.options.navigation_timeout.as_secs(),
        })
    }

    async fn shutdown(self) {
        drop(self.browser);
        info!("Closed headless browser");
    }
}

/// Converts a document path into a `file://` URL.
fn document_url(path: &Path) -> Result<Url, CaptureError> {
    let absolute = std::fs::canonicalize(path).map_err(|source| CaptureError::IoError {
        path: path.display().to_string(),
        source,
    })?;

    Url::from_file_path(&absolute).map_err(|()| CaptureError::Document {
        path: absolute.display().to_string(),
    })
}

/// Opens a tab, captures the document and always closes the tab again.
fn capture_in_new_tab(
    browser: &Browser,
    options: &CaptureOptions,
    canvas: Canvas,
    url: &Url,
    repo: String,
    cancelled: &AtomicBool,
) -> Result<Vec<u8>, CaptureError> {
    let tab = browser
        .new_tab()
        .map_err(|e| CaptureError::Page(e.to_string()))?;

    let deadline = Deadline {
        at: Instant::now() + options.navigation_timeout,
        timeout: options.navigation_timeout,
        cancelled,
    };
    let result = capture_in_tab(&tab, options.readiness, canvas, url, repo, &deadline);

    if let Err(e) = tab.close(true) {
        debug!(error = %e, "Failed to close tab");
    }

    result
}

/// The shared time budget of one capture.
struct Deadline<'a> {
    at: Instant,
    timeout: Duration,
    cancelled: &'a AtomicBool,
}

impl Deadline<'_> {
    /// Time left for the next step, or a timeout once the budget is spent or
    /// the capture was abandoned.
    fn remaining(&self) -> Result<Duration, CaptureError> {
        let left = self.at.saturating_duration_since(Instant::now());
        if left.is_zero() || self.cancelled.load(Ordering::SeqCst) {
            return Err(CaptureError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            });
        }
        Ok(left)
    }
}

fn capture_in_tab(
    tab: &Arc<Tab>,
    readiness: ReadinessPolicy,
    canvas: Canvas,
    url: &Url,
    repo: String,
    deadline: &Deadline<'_>,
) -> Result<Vec<u8>, CaptureError> {
    attach_diagnostics(tab, repo);

    debug!(url = %url, "Navigating to document");
    tab.set_default_timeout(deadline.remaining()?);
    tab.navigate_to(url.as_str())
        .map_err(|e| CaptureError::Navigation(e.to_string()))?;

    wait_until_ready(tab, readiness, deadline)?;
    deadline.remaining()?;

    let clip = Page::Viewport {
        x: 0.0,
        y: 0.0,
        width: f64::from(canvas.width),
        height: f64::from(canvas.height),
        scale: 1.0,
    };

    tab.capture_screenshot(
        Page::CaptureScreenshotFormatOption::Png,
        None,
        Some(clip),
        true,
    )
    .map_err(|e| CaptureError::Screenshot(e.to_string()))
}

/// Forwards console output and script errors of the page to the log.
///
/// Diagnostics never fail a capture on their own.
fn attach_diagnostics(tab: &Arc<Tab>, repo: String) {
    if let Err(e) = tab.enable_log() {
        debug!(error = %e, "Failed to enable log domain");
    }
    if let Err(e) = tab.enable_runtime() {
        debug!(error = %e, "Failed to enable runtime domain");
    }

    let listener = Arc::new(move |event: &Event| match event {
        Event::RuntimeExceptionThrown(thrown) => {
            warn!(
                repo = %repo,
                message = %thrown.params.exception_details.text,
                "Page script error"
            );
        }
        Event::RuntimeConsoleAPICalled(called) => {
            let text = called
                .params
                .args
                .iter()
                .filter_map(|arg| arg.value.as_ref())
                .map(|value| match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            debug!(repo = %repo, message = %text, "Page console output");
        }
        Event::LogEntryAdded(added) => {
            debug!(
                repo = %repo,
                level = ?added.params.entry.level,
                message = %added.params.entry.text,
                "Page log entry"
            );
        }
        _ => {}
    });

    if let Err(e) = tab.add_event_listener(listener) {
        debug!(error = %e, "Failed to attach page listener");
    }
}

/// Blocks until the document satisfies `policy` or the deadline passes.
fn wait_until_ready(
    tab: &Arc<Tab>,
    policy: ReadinessPolicy,
    deadline: &Deadline<'_>,
) -> Result<(), CaptureError> {
    if policy == ReadinessPolicy::NetworkIdle {
        tab.set_default_timeout(deadline.remaining()?);
        tab.wait_until_navigated()
            .map_err(|e| CaptureError::Navigation(e.to_string()))?;
    }

    let accepted = policy.accepted_ready_states();
    loop {
        deadline.remaining()?;

        let state = tab
            .evaluate(policy.ready_state_script(), false)
            .ok()
            .and_then(|object| object.value)
            .and_then(|value| value.as_str().map(str::to_owned));

        if state.as_deref().is_some_and(|s| accepted.contains(&s)) {
            return Ok(());
        }

        std::thread::sleep(READY_POLL_INTERVAL);
    }
}
