#![forbid(unsafe_code)]

use crate::engine::ScanMode;
use crate::error::Error;
use crate::report::ScanReport;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutputSummary {
    pub files_written: usize,
}

/// Write one result file per produced result, named
/// `<sanitized-target>-<tag>.xml`, into an existing directory.
///
/// Outcomes whose fields are absent (disabled scan type, skipped or failed
/// target) produce no file; results from targets that did succeed are
/// written even when the run as a whole failed.
pub fn write_results(report: &ScanReport, dir: &Path) -> Result<OutputSummary, Error> {
    let mut summary = OutputSummary::default();
    for outcome in &report.outcomes {
        let produced = [
            (ScanMode::Cve, outcome.cve.as_ref()),
            (ScanMode::Standard, outcome.standard.as_ref()),
        ];
        for (mode, output) in produced {
            let Some(output) = output else {
                continue;
            };
            let name = format!("{}-{}.xml", outcome.target.sanitized_name(), mode.file_tag());
            std::fs::write(dir.join(&name), &output.results)?;
            debug!(file = %name, "wrote scan result");
            summary.files_written += 1;
        }
    }
    Ok(summary)
}
