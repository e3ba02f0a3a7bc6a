//! CLI for repo-preview.
//!
//! Generates social-preview images for the repositories of a GitHub
//! organization and writes them to a flat output directory.

use clap::Parser;
use repo_preview::{
    ConfigError, PreviewSettings, ProcessingResult, ReadinessPolicy, RunSummary, Runner,
    RunnerConfig, RunnerError, TargetStrategy,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// repo-preview - Render Open Graph preview images for GitHub repositories.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Organization owning the repositories.
    #[arg(long, env = "GITHUB_ORG")]
    organization: Option<String>,

    /// Target source: static, organization or authenticated.
    #[arg(long)]
    strategy: Option<TargetStrategy>,

    /// Repository to process with the static strategy (repeatable).
    #[arg(long = "repository", value_name = "NAME")]
    repositories: Vec<String>,

    /// Repository to skip with the listing strategies (repeatable).
    #[arg(long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,

    /// Directory receiving the images. Cleared on every run.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Page readiness policy: network-idle or dom-content-loaded.
    #[arg(long)]
    readiness: Option<ReadinessPolicy>,

    /// Write the HTML cards instead of launching a browser.
    #[arg(long)]
    dry_run: bool,

    /// Chrome or Chromium binary to use.
    #[arg(long, env = "CHROME")]
    chrome_path: Option<PathBuf>,

    /// Disable Chrome's sandbox (needed in some containers).
    #[arg(long)]
    no_sandbox: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // octocrab brings in ring as well, so rustls cannot pick a provider alone
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        error!("Failed to install the TLS crypto provider");
        return ExitCode::from(1);
    }

    // Parse arguments
    let args = Args::parse();

    // Run the main logic
    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(1)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let (settings, source) = load_settings(&args)?;
    let config = RunnerConfig::new(settings, source, args.token)?
        .with_dry_run(args.dry_run)
        .with_chrome_path(args.chrome_path)
        .with_sandbox(!args.no_sandbox);

    let runner = Runner::new(config)?;
    runner.run().await
}

/// Loads the settings file, if any, and applies command-line overrides.
fn load_settings(args: &Args) -> Result<(PreviewSettings, String), ConfigError> {
    let (mut settings, source) = match &args.config {
        Some(path) => (PreviewSettings::load(path)?, path.display().to_string()),
        None => (PreviewSettings::default(), "command line".to_string()),
    };

    if let Some(organization) = &args.organization {
        settings.organization = organization.clone();
    }
    if let Some(strategy) = args.strategy {
        settings.strategy = strategy;
    }
    if !args.repositories.is_empty() {
        settings.repositories = args.repositories.clone();
    }
    if !args.exclude.is_empty() {
        settings.exclude.extend(args.exclude.iter().cloned());
    }
    if let Some(output_dir) = &args.output_dir {
        settings.output_dir = output_dir.clone();
    }
    if let Some(readiness) = args.readiness {
        settings.readiness = readiness;
    }

    Ok((settings, source))
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Targets resolved: {}", summary.targets_resolved);
    println!("  Images written: {}", summary.captured);
    println!("  Placeholder metadata: {}", summary.degraded);
    println!("  Failed: {}", summary.failed);

    if summary.has_failures() {
        for result in &summary.results {
            if let ProcessingResult::Failed { repository, error } = result {
                println!("    {repository}: {error}");
            }
        }
    }
}
