#![forbid(unsafe_code)]

use crate::engine::EngineOutput;
use crate::target::Target;
use std::collections::HashSet;

/// The per-target record produced by a worker.
///
/// An absent field means that scan type was disabled for the run or the
/// target was never scanned (skipped after an earlier failure, or its own
/// engine call faulted). Both fields absent does not by itself mean failure;
/// consult [`ScanReport::failures`].
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub target: Target,
    pub cve: Option<EngineOutput>,
    pub standard: Option<EngineOutput>,
}

impl ScanOutcome {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            cve: None,
            standard: None,
        }
    }
}

/// One entry in the failure set. `Interrupted` is the operator-cancellation
/// sentinel; it is never a target and is excluded from the failure count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Failure {
    Target(Target),
    Interrupted,
}

/// Everything a finished run produced, clean or not.
///
/// Outcomes are in completion order, which for a concurrent run bears no
/// relation to the input order.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub outcomes: Vec<ScanOutcome>,
    pub failures: HashSet<Failure>,
}

impl ScanReport {
    /// Whether the operator cancelled the run before the queue drained.
    pub fn interrupted(&self) -> bool {
        self.failures.contains(&Failure::Interrupted)
    }

    /// Number of targets that failed or were abandoned, sentinel excluded.
    pub fn failed_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|failure| matches!(failure, Failure::Target(_)))
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
