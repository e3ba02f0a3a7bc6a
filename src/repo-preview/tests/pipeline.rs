use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use repo_preview::{
    CaptureEngine, CaptureError, CardRenderer, FetchedMetadata, MarkupPreview, MetadataFetcher,
    Pipeline, PreviewSettings, ProcessingResult, RenderedDocument, RepositoryIdentifier,
    RepositoryMetadata, RepositoryResponse, RunnerConfig, RunnerError, TargetResolver,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct FixedTargets(Vec<RepositoryIdentifier>);

#[async_trait]
impl TargetResolver for FixedTargets {
    async fn resolve(&self) -> Vec<RepositoryIdentifier> {
        self.0.clone()
    }
}

/// Returns canned metadata, or a placeholder for names listed as unavailable.
struct CannedMetadata {
    unavailable: Vec<&'static str>,
}

#[async_trait]
impl MetadataFetcher for CannedMetadata {
    async fn fetch(&self, identifier: &RepositoryIdentifier) -> FetchedMetadata {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        if self.unavailable.contains(&identifier.as_str()) {
            return FetchedMetadata {
                metadata: RepositoryMetadata::placeholder("acme", identifier, now),
                degraded: true,
            };
        }

        let response = RepositoryResponse {
            description: Some(format!("The {identifier} project")),
            language: Some("Rust".to_string()),
            stargazers_count: Some(42),
            ..Default::default()
        };
        FetchedMetadata {
            metadata: RepositoryMetadata::from_response("acme", identifier, response, now),
            degraded: false,
        }
    }
}

/// Pretends to screenshot by prefixing the document's bytes; times out for
/// the configured repository.
#[derive(Clone, Default)]
struct FakeEngine {
    timeout_for: Option<&'static str>,
    documents: Arc<Mutex<Vec<PathBuf>>>,
    shut_down: Arc<AtomicBool>,
}

#[async_trait]
impl CaptureEngine for FakeEngine {
    fn extension(&self) -> &'static str {
        "png"
    }

    async fn capture(
        &self,
        identifier: &RepositoryIdentifier,
        document: &RenderedDocument,
    ) -> Result<Vec<u8>, CaptureError> {
        let RenderedDocument::File { path, .. } = document else {
            panic!("documents must be materialized before capture");
        };
        self.documents.lock().unwrap().push(path.clone());

        if self.timeout_for == Some(identifier.as_str()) {
            return Err(CaptureError::Timeout { timeout_secs: 30 });
        }

        let mut bytes = b"PNG:".to_vec();
        bytes.extend(fs::read(path).unwrap());
        Ok(bytes)
    }

    async fn shutdown(self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

fn ids(names: &[&str]) -> Vec<RepositoryIdentifier> {
    names
        .iter()
        .map(|name| RepositoryIdentifier::new(*name).unwrap())
        .collect()
}

fn config(root: &Path) -> RunnerConfig {
    let settings = PreviewSettings {
        organization: "acme".to_string(),
        repositories: vec!["placeholder".to_string()],
        output_dir: root.join("out"),
        work_dir: root.join("work"),
        ..Default::default()
    };
    RunnerConfig::new(settings, "test", Some("test-token".to_string())).unwrap()
}

fn output_names(config: &RunnerConfig) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(config.output_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn empty_target_list_is_a_clean_no_op() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    fs::create_dir_all(config.output_dir()).unwrap();
    fs::write(config.output_dir().join("stale.png"), b"old").unwrap();

    let renderer = CardRenderer::new(config.settings().canvas()).unwrap();
    let resolver = FixedTargets(Vec::new());
    let fetcher = CannedMetadata {
        unavailable: Vec::new(),
    };
    let engine = FakeEngine::default();
    let shut_down = engine.shut_down.clone();

    let summary = Pipeline::new(&config, &renderer, &resolver, &fetcher)
        .run(move || Ok(engine))
        .await
        .unwrap();

    assert_eq!(summary.targets_resolved, 0);
    assert_eq!(summary.captured, 0);
    assert!(!summary.has_failures());
    assert!(output_names(&config).is_empty());
    assert!(!config.work_dir().exists());
    assert!(shut_down.load(Ordering::SeqCst));
}

#[tokio::test]
async fn capture_timeout_only_skips_that_target() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    let renderer = CardRenderer::new(config.settings().canvas()).unwrap();
    let resolver = FixedTargets(ids(&["alpha", "broken-repo", "gamma"]));
    let fetcher = CannedMetadata {
        unavailable: Vec::new(),
    };
    let engine = FakeEngine {
        timeout_for: Some("broken-repo"),
        ..Default::default()
    };
    let documents = engine.documents.clone();

    let summary = Pipeline::new(&config, &renderer, &resolver, &fetcher)
        .run(move || Ok(engine))
        .await
        .unwrap();

    assert_eq!(summary.targets_resolved, 3);
    assert_eq!(summary.captured, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(output_names(&config), vec!["alpha.png", "gamma.png"]);

    let order: Vec<_> = summary
        .results
        .iter()
        .map(|result| result.repository().as_str())
        .collect();
    assert_eq!(order, vec!["alpha", "broken-repo", "gamma"]);
    assert!(matches!(
        &summary.results[1],
        ProcessingResult::Failed { error, .. } if error.contains("not ready")
    ));

    // Per-target scratch directories are gone, including the failed one.
    let documents = documents.lock().unwrap();
    assert_eq!(documents.len(), 3);
    assert!(documents.iter().all(|path| !path.exists()));
    assert!(!config.work_dir().exists());
}

#[tokio::test]
async fn unavailable_metadata_still_produces_a_card() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    let renderer = CardRenderer::new(config.settings().canvas()).unwrap();
    let resolver = FixedTargets(ids(&["alpha", "beta"]));
    let fetcher = CannedMetadata {
        unavailable: vec!["beta"],
    };

    let summary = Pipeline::new(&config, &renderer, &resolver, &fetcher)
        .run(|| Ok(FakeEngine::default()))
        .await
        .unwrap();

    assert_eq!(summary.captured, 2);
    assert_eq!(summary.degraded, 1);
    assert!(!summary.has_failures());

    let beta = fs::read_to_string(config.output_dir().join("beta.png")).unwrap();
    assert!(beta.contains("Could not fetch repository details"));
    let alpha = fs::read_to_string(config.output_dir().join("alpha.png")).unwrap();
    assert!(alpha.contains("The alpha project"));
    assert!(alpha.contains("42"));
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    let renderer = CardRenderer::new(config.settings().canvas()).unwrap();
    let resolver = FixedTargets(ids(&["alpha", "beta"]));
    let fetcher = CannedMetadata {
        unavailable: Vec::new(),
    };
    let pipeline = Pipeline::new(&config, &renderer, &resolver, &fetcher);

    pipeline.run(|| Ok(FakeEngine::default())).await.unwrap();
    let first = fs::read(config.output_dir().join("alpha.png")).unwrap();
    assert!(!config.work_dir().exists());

    pipeline.run(|| Ok(FakeEngine::default())).await.unwrap();
    let second = fs::read(config.output_dir().join("alpha.png")).unwrap();

    assert_eq!(first, second);
    assert_eq!(output_names(&config), vec!["alpha.png", "beta.png"]);
    assert!(!config.work_dir().exists());
}

#[tokio::test]
async fn launch_failure_aborts_without_artifacts() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path());
    let renderer = CardRenderer::new(config.settings().canvas()).unwrap();
    let resolver = FixedTargets(ids(&["alpha"]));
    let fetcher = CannedMetadata {
        unavailable: Vec::new(),
    };

    let result = Pipeline::new(&config, &renderer, &resolver, &fetcher)
        .run(|| Err::<FakeEngine, _>(CaptureError::Launch("no chrome".to_string())))
        .await;

    assert!(matches!(
        result,
        Err(RunnerError::Capture(CaptureError::Launch(_)))
    ));
    assert!(output_names(&config).is_empty());
    assert!(!config.work_dir().exists());
}

#[tokio::test]
async fn missing_token_aborts_before_launch() {
    let temp = TempDir::new().unwrap();
    let settings = PreviewSettings {
        organization: "acme".to_string(),
        repositories: vec!["alpha".to_string()],
        output_dir: temp.path().join("out"),
        work_dir: temp.path().join("work"),
        ..Default::default()
    };
    let config = RunnerConfig::new(settings, "test", None).unwrap();
    let renderer = CardRenderer::new(config.settings().canvas()).unwrap();
    let resolver = FixedTargets(ids(&["alpha"]));
    let fetcher = CannedMetadata {
        unavailable: Vec::new(),
    };
    let launched = AtomicBool::new(false);

    let result = Pipeline::new(&config, &renderer, &resolver, &fetcher)
        .run(|| {
            launched.store(true, Ordering::SeqCst);
            Ok(FakeEngine::default())
        })
        .await;

    assert!(matches!(
        result,
        Err(RunnerError::MissingCredential { ref reason }) if reason == "fetching repository metadata"
    ));
    assert!(!launched.load(Ordering::SeqCst));
    assert!(!config.output_dir().exists());
}

#[tokio::test]
async fn dry_run_writes_escaped_html_cards() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path()).with_dry_run(true);
    let renderer = CardRenderer::new(config.settings().canvas()).unwrap();
    let resolver = FixedTargets(ids(&["alpha"]));

    struct HostileMetadata;

    #[async_trait]
    impl MetadataFetcher for HostileMetadata {
        async fn fetch(&self, identifier: &RepositoryIdentifier) -> FetchedMetadata {
            let response = RepositoryResponse {
                description: Some("<script>alert(1)</script>".to_string()),
                ..Default::default()
            };
            FetchedMetadata {
                metadata: RepositoryMetadata::from_response("acme", identifier, response, Utc::now()),
                degraded: false,
            }
        }
    }

    let summary = Pipeline::new(&config, &renderer, &resolver, &HostileMetadata)
        .run(|| Ok(MarkupPreview))
        .await
        .unwrap();

    assert!(summary.dry_run);
    assert_eq!(output_names(&config), vec!["alpha.html"]);
    let html = fs::read_to_string(config.output_dir().join("alpha.html")).unwrap();
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>alert"));
}
