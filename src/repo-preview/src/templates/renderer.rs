//! Preview card renderer.

use super::colors::language_color;
use super::document::{Canvas, RenderedDocument};
use super::TemplateError;
use crate::metadata::RepositoryMetadata;
use handlebars::Handlebars;
use serde_json::json;
use std::path::Path;

/// Name the card template is registered under.
const CARD_TEMPLATE: &str = "card";

/// Built-in card template.
const DEFAULT_CARD: &str = include_str!("card.html.hbs");

/// Longest description rendered before truncation, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 180;

/// Longest name rendered before truncation, in characters.
pub const MAX_NAME_CHARS: usize = 48;

/// Number of lines the description is clamped to.
pub const DESCRIPTION_LINES: u32 = 3;

/// Creates the Handlebars registry used for cards.
///
/// HTML escaping stays enabled (the default escape function) so repository
/// names and descriptions cannot inject markup. Strict mode rejects templates
/// referencing unknown fields.
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.set_strict_mode(true);
    hbs
}

/// Renders repository metadata into a fixed-size HTML card.
///
/// Rendering is pure: identical metadata always produces identical markup.
pub struct CardRenderer {
    handlebars: Handlebars<'static>,
    canvas: Canvas,
}

impl CardRenderer {
    /// Creates a renderer using the built-in card template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to register.
    pub fn new(canvas: Canvas) -> Result<Self, TemplateError> {
        Self::with_template(canvas, DEFAULT_CARD)
    }

    /// Creates a renderer with a custom Handlebars template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not parse.
    pub fn with_template(canvas: Canvas, template: &str) -> Result<Self, TemplateError> {
        let mut handlebars = create_handlebars_registry();
        handlebars.register_template_string(CARD_TEMPLATE, template)?;
        Ok(Self { handlebars, canvas })
    }

    /// Creates a renderer with a template loaded from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn from_template_file(canvas: Canvas, path: &Path) -> Result<Self, TemplateError> {
        let template = std::fs::read_to_string(path).map_err(|source| TemplateError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        Self::with_template(canvas, &template)
    }

    /// Canvas every rendered document is sized to.
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Renders the card for one repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the template references data the card does not
    /// provide.
    pub fn render(&self, metadata: &RepositoryMetadata) -> Result<RenderedDocument, TemplateError> {
        let data = json!({
            "name": truncate_chars(&metadata.name, MAX_NAME_CHARS),
            "description": truncate_chars(&metadata.description, MAX_DESCRIPTION_CHARS),
            "language": metadata.language,
            "accent": language_color(&metadata.language),
            "stars": format_count(metadata.stars),
            "forks": format_count(metadata.forks),
            "updated": metadata.updated_at.format("%b %-d, %Y").to_string(),
            "url": metadata.url,
            "canvas": self.canvas,
            "description_lines": DESCRIPTION_LINES,
        });

        let html = self.handlebars.render(CARD_TEMPLATE, &data)?;
        Ok(RenderedDocument::Markup {
            html,
            canvas: self.canvas,
        })
    }
}

/// Shortens `text` to at most `max` characters, ending in an ellipsis when cut.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max.saturating_sub(1)).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push('…');
    truncated
}

/// Formats a count compactly: `42`, `1.2k`, `3.4m`.
fn format_count(count: u64) -> String {
    fn scaled(count: u64, unit: u64, suffix: char) -> String {
        let tenths = count * 10 / unit;
        if tenths % 10 == 0 || tenths >= 100 {
            format!("{}{suffix}", tenths / 10)
        } else {
            format!("{}.{}{suffix}", tenths / 10, tenths % 10)
        }
    }

    match count {
        0..=999 => count.to_string(),
        1_000..=999_999 => scaled(count, 1_000, 'k'),
        _ => scaled(count, 1_000_000, 'm'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn demo() -> RepositoryMetadata {
        RepositoryMetadata {
            name: "demo".to_string(),
            description: "x".repeat(500),
            language: "Go".to_string(),
            stars: 42,
            forks: 3,
            updated_at: Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap(),
            url: "https://github.com/acme/demo".to_string(),
        }
    }

    fn html(document: &RenderedDocument) -> &str {
        document.markup().unwrap()
    }

    #[test]
    fn renders_fields_and_truncates_description() {
        let renderer = CardRenderer::new(Canvas::OPEN_GRAPH).unwrap();
        let document = renderer.render(&demo()).unwrap();
        let html = html(&document);

        assert!(html.contains("demo"));
        assert!(html.contains("42"));
        assert!(html.contains("Go"));
        assert!(html.contains("Mar 4, 2025"));
        assert!(html.contains("#00add8"));
        assert!(!html.contains(&"x".repeat(500)));
        assert!(html.contains(&format!("{}…", "x".repeat(MAX_DESCRIPTION_CHARS - 1))));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = CardRenderer::new(Canvas::OPEN_GRAPH).unwrap();

        let first = renderer.render(&demo()).unwrap();
        let second = renderer.render(&demo()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn canvas_is_fixed_regardless_of_description() {
        let renderer = CardRenderer::new(Canvas::OPEN_GRAPH).unwrap();

        for length in [0, 10, 180, 5_000] {
            let mut metadata = demo();
            metadata.description = "word ".repeat(length);
            let document = renderer.render(&metadata).unwrap();
            let html = html(&document);

            assert_eq!(document.canvas(), Canvas::OPEN_GRAPH);
            assert!(html.contains("width: 1200px; height: 630px; overflow: hidden;"));
            assert!(html.contains("-webkit-line-clamp: 3;"));
        }
    }

    #[test]
    fn escapes_interpolated_text() {
        let renderer = CardRenderer::new(Canvas::OPEN_GRAPH).unwrap();
        let mut metadata = demo();
        metadata.name = "<script>alert('x')</script>".to_string();
        metadata.description = "\"><img src=x onerror=alert(1)>".to_string();

        let document = renderer.render(&metadata).unwrap();
        let html = html(&document);

        assert!(!html.contains("<script>alert"));
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn unknown_language_uses_neutral_accent() {
        let renderer = CardRenderer::new(Canvas::OPEN_GRAPH).unwrap();
        let mut metadata = demo();
        metadata.language = "Unknown".to_string();

        let document = renderer.render(&metadata).unwrap();

        assert!(html(&document).contains(super::super::colors::NEUTRAL_COLOR));
    }

    #[test]
    fn custom_template_is_strict() {
        let renderer = CardRenderer::with_template(Canvas::OPEN_GRAPH, "{{name}} {{nope}}").unwrap();
        assert!(matches!(
            renderer.render(&demo()),
            Err(TemplateError::RenderError(_))
        ));

        let renderer = CardRenderer::with_template(
            Canvas { width: 800, height: 400 },
            "{{name}} {{canvas.width}}x{{canvas.height}}",
        )
        .unwrap();
        assert_eq!(html(&renderer.render(&demo()).unwrap()), "demo 800x400");
    }

    #[test]
    fn invalid_template_fails_registration() {
        assert!(matches!(
            CardRenderer::with_template(Canvas::OPEN_GRAPH, "{{#if name}}"),
            Err(TemplateError::RegistrationError(_))
        ));
    }

    #[test]
    fn truncates_on_character_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("ééééé", 3), "éé…");
        assert_eq!(truncate_chars("ab   cd", 5), "ab…");
    }

    #[test]
    fn formats_counts_compactly() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(42), "42");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1k");
        assert_eq!(format_count(1_250), "1.2k");
        assert_eq!(format_count(15_400), "15k");
        assert_eq!(format_count(3_400_000), "3.4m");
    }
}
