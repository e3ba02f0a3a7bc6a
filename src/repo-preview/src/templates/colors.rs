//! Accent colors for primary languages.

/// Accent used for languages without a dedicated color.
pub const NEUTRAL_COLOR: &str = "#8b949e";

/// Returns the accent color for a language name, ignoring case.
#[must_use]
pub fn language_color(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "rust" => "#dea584",
        "go" => "#00add8",
        "python" => "#3572a5",
        "javascript" => "#f1e05a",
        "typescript" => "#3178c6",
        "java" => "#b07219",
        "kotlin" => "#a97bff",
        "swift" => "#f05138",
        "c" => "#555555",
        "c++" => "#f34b7d",
        "c#" => "#178600",
        "ruby" => "#701516",
        "php" => "#4f5d95",
        "shell" => "#89e051",
        "html" => "#e34c26",
        "css" => "#563d7c",
        "dart" => "#00b4ab",
        "elixir" => "#6e4a7e",
        "haskell" => "#5e5086",
        "lua" => "#000080",
        "nix" => "#7e7eff",
        "scala" => "#c22d40",
        "zig" => "#ec915c",
        "jupyter notebook" => "#da5b0b",
        "dockerfile" => "#384d54",
        "vue" => "#41b883",
        _ => NEUTRAL_COLOR,
    }
}
