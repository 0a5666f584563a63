#![forbid(unsafe_code)]

use crate::engine::{CpeHint, EngineOutput, ScanEngine, ScanMode, cpe};
use crate::error::Error;
use crate::target::Target;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::debug;

/// Production [`ScanEngine`] shelling out to the oscap tool family.
///
/// Local targets use `oscap` directly, chroot targets `oscap-chroot`, and
/// remote targets `oscap-ssh`; the wrappers are resolved next to the
/// configured `oscap` binary. Each call runs to completion inside
/// `spawn_blocking`, so a slow evaluation occupies one worker slot and
/// nothing else.
#[derive(Debug, Clone)]
pub struct OscapEngine {
    engine: config::Engine,
}

impl OscapEngine {
    pub fn new(engine: config::Engine) -> Self {
        Self { engine }
    }

    /// Resolve a sibling tool (`oscap-chroot`, `oscap-ssh`) next to the
    /// configured `oscap` binary; a bare name stays bare for PATH lookup.
    fn tool_path(&self, tool: &str) -> PathBuf {
        match self.engine.oscap_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(tool),
            _ => PathBuf::from(tool),
        }
    }

    fn target_command(&self, target: &Target) -> Result<Command, Error> {
        match target {
            Target::Local => Ok(Command::new(&self.engine.oscap_path)),
            Target::Chroot(root) => {
                let mut cmd = Command::new(self.tool_path("oscap-chroot"));
                cmd.arg(root);
                Ok(cmd)
            }
            Target::Remote(host) => {
                let mut cmd = Command::new(self.tool_path("oscap-ssh"));
                cmd.arg(format!("{}@{}", self.engine.ssh_user, host))
                    .arg(self.engine.ssh_port.to_string());
                Ok(cmd)
            }
            // Meta descriptors are resolved away before dispatch; one
            // reaching the engine is a caller bug, not an engine failure.
            Target::ChrootsInDir(_) => Err(Error::InvalidTarget(target.to_string())),
        }
    }

    fn scan_command(
        &self,
        target: &Target,
        mode: ScanMode,
        hints: &[CpeHint],
    ) -> Result<(Command, NamedTempFile), Error> {
        let results = tempfile::Builder::new()
            .prefix("scapscan-")
            .suffix(".xml")
            .tempfile()?;
        let mut cmd = self.target_command(target)?;
        match mode {
            ScanMode::Cve => {
                let feed = self.engine.cve_feed.as_ref().ok_or(Error::MissingCveFeed)?;
                cmd.arg("oval")
                    .arg("eval")
                    .arg("--results")
                    .arg(results.path())
                    .arg(feed);
            }
            ScanMode::Standard => {
                let datastream = self.standard_content(hints)?;
                cmd.arg("xccdf")
                    .arg("eval")
                    .arg("--results-arf")
                    .arg(results.path());
                if let Some(profile) = &self.engine.profile {
                    cmd.arg("--profile").arg(profile);
                }
                cmd.arg(datastream);
            }
        }
        Ok((cmd, results))
    }

    /// Datastream for the standard compliance evaluation: the configured one,
    /// or the first content file matching a detected platform.
    fn standard_content(&self, hints: &[CpeHint]) -> Result<PathBuf, Error> {
        if let Some(datastream) = &self.engine.datastream {
            return Ok(datastream.clone());
        }
        hints
            .iter()
            .find_map(|hint| content_for_cpe(&self.engine.content_dir, hint))
            .ok_or(Error::MissingDatastream)
    }
}

/// Map `cpe:/o:<vendor>:<product>:<version>` to a shipped datastream,
/// trying the versioned name first (`ssg-rhel9-ds.xml`) and then the plain
/// product name (`ssg-fedora-ds.xml`).
fn content_for_cpe(content_dir: &Path, hint: &CpeHint) -> Option<PathBuf> {
    let mut parts = hint.as_str().strip_prefix("cpe:/o:")?.split(':');
    let _vendor = parts.next()?;
    let product = parts.next()?;
    let version = parts.next();

    if let Some(version) = version {
        let major = version.split('.').next().unwrap_or(version);
        let candidate = content_dir.join(format!("ssg-{product}{major}-ds.xml"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    let candidate = content_dir.join(format!("ssg-{product}-ds.xml"));
    candidate.is_file().then_some(candidate)
}

#[async_trait]
impl ScanEngine for OscapEngine {
    async fn detect_platform_hints(&self, target: &Target) -> Result<Vec<CpeHint>, Error> {
        match target {
            Target::Local => cpe::detect_root(Path::new("/")),
            Target::Chroot(root) => cpe::detect_root(root),
            // No probing over SSH; remote content must come from config.
            Target::Remote(_) => Ok(Vec::new()),
            Target::ChrootsInDir(_) => Err(Error::InvalidTarget(target.to_string())),
        }
    }

    async fn scan(
        &self,
        target: &Target,
        mode: ScanMode,
        hints: &[CpeHint],
    ) -> Result<EngineOutput, Error> {
        let (mut cmd, results) = self.scan_command(target, mode, hints)?;
        let command_line = format!("{cmd:?}");
        debug!(target = %target, mode = %mode, command = %command_line, "invoking scan engine");

        let output = tokio::task::spawn_blocking(move || cmd.output()).await?;
        let output = output.map_err(|source| Error::EngineSpawn {
            command: command_line,
            source,
        })?;

        // The engine may exit without writing results; that still counts as
        // an invocation, classified by its exit code.
        let results = std::fs::read_to_string(results.path()).unwrap_or_default();

        Ok(EngineOutput {
            results,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
