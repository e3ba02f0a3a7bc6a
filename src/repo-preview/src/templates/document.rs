//! Rendered documents handed to the capture engine.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name used when inline markup is written to disk.
const MARKUP_FILE_NAME: &str = "card.html";

/// Pixel size of a preview image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Canvas {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
}

impl Canvas {
    /// The Open Graph image size, 1200x630.
    pub const OPEN_GRAPH: Self = Self {
        width: 1200,
        height: 630,
    };
}

impl Default for Canvas {
    fn default() -> Self {
        Self::OPEN_GRAPH
    }
}

/// A document sized to a fixed canvas, ready to be captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedDocument {
    /// Self-contained markup and styling.
    Markup { html: String, canvas: Canvas },
    /// A local HTML file, e.g. taken from a cloned repository.
    File { path: PathBuf, canvas: Canvas },
}

impl RenderedDocument {
    /// Canvas the document is laid out for.
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        match self {
            Self::Markup { canvas, .. } | Self::File { canvas, .. } => *canvas,
        }
    }

    /// Inline markup, if the document is not file-backed.
    #[must_use]
    pub fn markup(&self) -> Option<&str> {
        match self {
            Self::Markup { html, .. } => Some(html),
            Self::File { .. } => None,
        }
    }

    /// Writes inline markup into `dir` and returns the file-backed document.
    /// File-backed documents are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn materialize(self, dir: &Path) -> std::io::Result<Self> {
        match self {
            Self::Markup { html, canvas } => {
                let path = dir.join(MARKUP_FILE_NAME);
                std::fs::write(&path, html)?;
                Ok(Self::File { path, canvas })
            }
            file @ Self::File { .. } => Ok(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn materialize_writes_markup() {
        let temp = TempDir::new().unwrap();
        let document = RenderedDocument::Markup {
            html: "<p>hi</p>".to_string(),
            canvas: Canvas::OPEN_GRAPH,
        };

        let materialized = document.materialize(temp.path()).unwrap();

        let RenderedDocument::File { path, canvas } = materialized else {
            panic!("expected a file-backed document");
        };
        assert_eq!(canvas, Canvas::OPEN_GRAPH);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn materialize_keeps_files() {
        let temp = TempDir::new().unwrap();
        let document = RenderedDocument::File {
            path: temp.path().join("index.html"),
            canvas: Canvas::OPEN_GRAPH,
        };

        assert_eq!(document.clone().materialize(temp.path()).unwrap(), document);
    }
}
