//! Run summary types.

use super::result::ProcessingResult;

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of targets resolved.
    pub targets_resolved: usize,

    /// Number of artifacts written.
    pub captured: usize,

    /// Number of artifacts rendered from placeholder metadata.
    pub degraded: usize,

    /// Number of targets without an artifact.
    pub failed: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Per-target results in processing order.
    pub results: Vec<ProcessingResult>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: ProcessingResult) {
        match &result {
            ProcessingResult::Captured { degraded, .. } => {
                self.captured += 1;
                if *degraded {
                    self.degraded += 1;
                }
            }
            ProcessingResult::Failed { .. } => self.failed += 1,
        }
        self.results.push(result);
    }

    /// Returns true if any target failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::RepositoryIdentifier;
    use std::path::PathBuf;

    fn id(name: &str) -> RepositoryIdentifier {
        RepositoryIdentifier::new(name).unwrap()
    }

    #[test]
    fn can_record_results() {
        let mut summary = RunSummary::new(false);

        summary.record_result(ProcessingResult::Captured {
            repository: id("a"),
            path: PathBuf::from("previews/a.png"),
            degraded: false,
        });
        summary.record_result(ProcessingResult::Captured {
            repository: id("b"),
            path: PathBuf::from("previews/b.png"),
            degraded: true,
        });
        summary.record_result(ProcessingResult::Failed {
            repository: id("c"),
            error: "timed out".to_string(),
        });

        assert_eq!(summary.captured, 2);
        assert_eq!(summary.degraded, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.has_failures());
        assert_eq!(summary.results[2].repository(), &id("c"));
    }

    #[test]
    fn empty_summary_is_successful() {
        let summary = RunSummary::new(true);

        assert!(!summary.has_failures());
        assert_eq!(summary.targets_resolved, 0);
    }
}
