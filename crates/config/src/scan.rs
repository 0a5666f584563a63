use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Scan {
    /// Number of scan workers running concurrently. Each worker pulls one
    /// target at a time off the shared queue and evaluates it end to end, so
    /// this bounds how many engine processes can be alive at once. The
    /// command line `--jobs` flag overrides this value.
    ///
    /// # Note
    ///
    /// A value of 0 is treated as 1. Scans are dominated by the external
    /// engine, not by scapscan itself, so raising this mostly trades memory
    /// and I/O pressure for wall-clock time.
    pub jobs: usize,

    /// Whether each target gets a CVE (vulnerability) evaluation. Requires a
    /// configured `engine.cve_feed`; without one every target fails. Can be
    /// switched off per run with `--no-cve-scan`.
    pub cve: bool,

    /// Whether each target gets a standard compliance evaluation against the
    /// configured (or platform-detected) datastream. Can be switched off per
    /// run with `--no-standard-compliance`.
    pub standard: bool,

    /// Upper bound on a single engine call. **Measured in seconds**.
    ///
    /// # Note
    ///
    /// Unset means no limit: a hung engine call occupies its worker slot for
    /// as long as it takes, which matches the classic evaluator behavior.
    /// When set, a call that exceeds the limit marks its target as failed;
    /// the underlying engine process is not killed, only abandoned.
    #[serde_as(as = "Option<serde_with::DurationSeconds>")]
    pub call_timeout: Option<Duration>,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            jobs: 4,
            cve: true,
            standard: true,
            call_timeout: None,
        }
    }
}
