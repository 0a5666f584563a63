use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// scapscan: concurrent SCAP compliance and vulnerability evaluator
///
/// scapscan expands a list of scan targets (the local host, offline chroots,
/// remote hosts), fans them out across a bounded pool of workers driving the
/// oscap engine, and collects one result document per target and scan type.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// If not provided, the default locations are checked. They are
    /// `/etc/scapscan/config.toml` and `/etc/scapscan/config.d/*.toml`,
    /// where the latter being a glob pattern. If they don't exist, the
    /// default configuration is used.
    #[arg(short, long, global = true, value_parser = validate_file)]
    pub conffile: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Evaluate one or more targets concurrently and write result documents.
    Scan(ScanArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ScanArgs {
    /// Target descriptors to scan.
    ///
    /// `localhost` scans the local system, `chroot://PATH` an offline
    /// chroot tree, and a bare hostname a remote machine over SSH.
    /// `chroots-in-dir://PATH` expands to one chroot target per directory
    /// found directly under PATH.
    #[arg(long, num_args = 1.., default_value = "localhost")]
    pub targets: Vec<String>,

    /// Number of concurrent scan workers.
    ///
    /// Overrides `scan.jobs` from the configuration file.
    #[arg(short, long, value_parser = validate_jobs)]
    pub jobs: Option<usize>,

    /// Skip the CVE (vulnerability) evaluation for every target.
    #[arg(long)]
    pub no_cve_scan: bool,

    /// Skip the standard compliance evaluation for every target.
    #[arg(long)]
    pub no_standard_compliance: bool,

    /// Directory that receives one result file per target and scan type.
    ///
    /// Must already exist.
    #[arg(short, long, value_parser = validate_output_dir)]
    pub output: PathBuf,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

/// Worker count must be a positive integer.
#[inline(always)]
fn validate_jobs(jobs: &str) -> Result<usize, String> {
    let jobs: usize = jobs
        .parse()
        .map_err(|_| format!("`{jobs}` is not a valid worker count"))?;
    if jobs > 0 {
        Ok(jobs)
    } else {
        Err("Worker count must be greater than 0".to_string())
    }
}

/// The output directory must already exist.
#[inline(always)]
fn validate_output_dir(dir: &str) -> Result<PathBuf, String> {
    let path = Path::new(dir);
    if path.is_dir() {
        Ok(path.to_owned())
    } else {
        Err(format!("Output directory not found: {:?}", path))
    }
}
