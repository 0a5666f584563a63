#![forbid(unsafe_code)]

mod cpe;
mod oscap;

pub use oscap::OscapEngine;

use crate::error::Error;
use crate::target::Target;
use async_trait::async_trait;
use std::fmt;

/// The two evaluations a worker may run against one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanMode {
    /// OVAL evaluation against a CVE definitions feed.
    Cve,
    /// XCCDF evaluation against a compliance datastream.
    Standard,
}

impl ScanMode {
    /// Suffix tag used in result file names.
    pub fn file_tag(&self) -> &'static str {
        match self {
            ScanMode::Cve => "cve",
            ScanMode::Standard => "std",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Cve => write!(f, "cve"),
            ScanMode::Standard => write!(f, "standard"),
        }
    }
}

/// A platform identity tag (CPE) detected on a target, used to narrow which
/// scan content applies to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpeHint(String);

impl CpeHint {
    pub fn new(cpe: impl Into<String>) -> Self {
        Self(cpe.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CpeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything one engine invocation produced.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// The result document the engine wrote (may be empty if it produced
    /// none before exiting).
    pub results: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl EngineOutput {
    /// Classify the exit code the way the oscap tool family defines it:
    /// 0 is a clean pass, 2 means the evaluation ran and reported findings
    /// (a normal outcome), anything else means the engine could not run.
    pub fn status(&self) -> EngineStatus {
        match self.exit_code {
            0 => EngineStatus::Clean,
            2 => EngineStatus::Findings,
            _ => EngineStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Clean,
    Findings,
    Failed,
}

/// The external scanning engine, as seen by the worker pool.
///
/// Both calls are synchronous from the caller's point of view and may take
/// arbitrarily long; implementations that shell out must not block the
/// runtime (see [`OscapEngine`]). An `Err` from either call marks the target
/// as failed; a nonzero exit code inside a successful [`scan`] call does not.
///
/// [`scan`]: ScanEngine::scan
#[async_trait]
pub trait ScanEngine: Send + Sync {
    /// Detect platform identity hints for a target.
    async fn detect_platform_hints(&self, target: &Target) -> Result<Vec<CpeHint>, Error>;

    /// Run one evaluation of `mode` against the target.
    async fn scan(
        &self,
        target: &Target,
        mode: ScanMode,
        hints: &[CpeHint],
    ) -> Result<EngineOutput, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_classify_like_oscap() {
        let output = |exit_code| EngineOutput {
            results: String::new(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code,
        };
        assert_eq!(output(0).status(), EngineStatus::Clean);
        assert_eq!(output(2).status(), EngineStatus::Findings);
        assert_eq!(output(1).status(), EngineStatus::Failed);
        assert_eq!(output(-1).status(), EngineStatus::Failed);
    }
}
