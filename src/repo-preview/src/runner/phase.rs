//! Run phases.

use tracing::debug;

/// Phase of a preview run.
///
/// ```text
/// Idle -> Initializing -> Resolving -> ProcessingTarget* -> Finalizing -> Done
///              |              |
///              +--------------+--> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Initializing,
    Resolving,
    ProcessingTarget,
    Finalizing,
    Done,
    Aborted,
}

impl RunPhase {
    /// Whether moving from `self` to `next` is a valid transition.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        use RunPhase::*;

        matches!(
            (self, next),
            (Idle, Initializing)
                | (Initializing, Resolving)
                | (Initializing | Resolving, Aborted)
                | (Resolving | ProcessingTarget, ProcessingTarget)
                | (Resolving | ProcessingTarget, Finalizing)
                | (Finalizing, Done)
        )
    }
}

/// Tracks the current phase and logs transitions.
#[derive(Debug)]
pub(crate) struct PhaseTracker {
    current: RunPhase,
}

impl PhaseTracker {
    pub(crate) fn new() -> Self {
        Self {
            current: RunPhase::Idle,
        }
    }

    pub(crate) fn advance(&mut self, next: RunPhase) {
        debug_assert!(
            self.current.can_advance_to(next),
            "invalid run phase transition {:?} -> {next:?}",
            self.current
        );
        debug!(from = ?self.current, to = ?next, "Run phase");
        self.current = next;
    }
}
