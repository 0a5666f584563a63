use clap::Parser;
use config::Config;
use dispatch::{Dispatcher, OscapEngine, ScanOptions, Target, expand_targets, write_results};
use scapscan::{
    cli::{Cli, Command, ScanArgs},
    signals::cancel_on_signal,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // NOTE: The verbosity flag takes precedence over the environment
    // variable for log control. `SCAPSCAN_LOG=warn scapscan -vvv scan ...`
    // still logs at the trace level; the environment variable can only set
    // per-crate levels, e.g. `SCAPSCAN_LOG=dispatch=debug`.
    let env_filter = EnvFilter::builder()
        .with_env_var("SCAPSCAN_LOG")
        .from_env()?
        .add_directive(cli.verbosity.log_level_filter().as_str().parse()?);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .init();

    // load config
    let config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        _ => {
            let mut candidates = glob::glob("/etc/scapscan/config.d/*.toml")?
                .filter_map(Result::ok)
                .collect::<Vec<_>>();
            candidates.insert(0, "/etc/scapscan/config.toml".into());
            trace!(?candidates, "config file candidates");
            Config::load_multiple(candidates)?
        }
    };
    debug!(?config, ?cli);

    match cli.command {
        Command::Scan(args) => run_scan(args, config).await,
    }
}

async fn run_scan(args: ScanArgs, config: Config) -> anyhow::Result<()> {
    let descriptors = args
        .targets
        .iter()
        .map(|descriptor| descriptor.parse::<Target>())
        .collect::<Result<Vec<_>, _>>()?;

    // Expansion failures are fatal before any work starts.
    let targets = expand_targets(&descriptors)?;
    if targets.is_empty() {
        warn!("target list expanded to nothing, no scans to run");
        return Ok(());
    }

    let options = ScanOptions {
        jobs: args.jobs.unwrap_or(config.scan.jobs),
        cve_scan: config.scan.cve && !args.no_cve_scan,
        standard_scan: config.scan.standard && !args.no_standard_compliance,
        call_timeout: config.scan.call_timeout,
    };
    info!(
        targets = targets.len(),
        jobs = options.jobs,
        cve = options.cve_scan,
        standard = options.standard_scan,
        "starting scan"
    );

    // install signal handler
    let cancel = CancellationToken::new();
    let signal_handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = cancel_on_signal(cancel).await {
                error!(%err, "signal handler failed");
            }
        })
    };

    let engine = Arc::new(OscapEngine::new(config.engine.clone()));
    let dispatcher = Dispatcher::new(engine, options);
    let report = dispatcher.run(targets, cancel).await;
    signal_handle.abort();

    // Results that were produced are written even when the run failed.
    let summary = write_results(&report, &args.output)?;
    info!(
        scanned = report.outcomes.len(),
        files_written = summary.files_written,
        output = %args.output.display(),
        "scan finished"
    );

    let failed = report.failed_count();
    if failed > 0 {
        warn!(failed, "targets failed or were never attempted");
    }
    if report.interrupted() {
        anyhow::bail!("scan interrupted by operator ({failed} targets failed)");
    }
    if failed > 0 {
        anyhow::bail!("{failed} of the requested targets failed");
    }
    Ok(())
}
