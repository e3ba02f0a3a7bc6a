//! Run configuration.
//!
//! Settings come from an optional TOML file and are validated once before a
//! run starts. Nothing downstream reads configuration from the environment.

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::PreviewSettings;
