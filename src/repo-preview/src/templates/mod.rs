//! Preview card rendering using Handlebars.
//!
//! Turns [`RepositoryMetadata`](crate::metadata::RepositoryMetadata) into a
//! self-contained HTML document laid out on a fixed canvas.

mod colors;
mod document;
mod error;
mod renderer;

pub use colors::{language_color, NEUTRAL_COLOR};
pub use document::{Canvas, RenderedDocument};
pub use error::TemplateError;
pub use renderer::{
    create_handlebars_registry, CardRenderer, DESCRIPTION_LINES, MAX_DESCRIPTION_CHARS,
    MAX_NAME_CHARS,
};
