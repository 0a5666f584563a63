#![forbid(unsafe_code)]

use crate::engine::{EngineOutput, EngineStatus, ScanEngine, ScanMode};
use crate::error::Error;
use crate::queue::WorkQueue;
use crate::report::{Failure, ScanOutcome, ScanReport};
use crate::target::Target;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Per-run knobs handed to every worker.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Worker pool size; clamped to at least 1.
    pub jobs: usize,
    /// Run the CVE (vulnerability) evaluation for each target.
    pub cve_scan: bool,
    /// Run the standard compliance evaluation for each target.
    pub standard_scan: bool,
    /// Optional upper bound on one engine call. On expiry the target is
    /// recorded as failed; the engine process itself is left to finish.
    pub call_timeout: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            jobs: 4,
            cve_scan: true,
            standard_scan: true,
            call_timeout: None,
        }
    }
}

/// Everything the workers share for the lifetime of one run.
struct RunState {
    queue: WorkQueue,
    total: usize,
    /// Fast fail-fast flag mirroring "failures is non-empty". Read with
    /// Relaxed ordering: a stale read only lets a target start scanning
    /// just after a failure landed elsewhere, which is tolerated.
    any_failed: AtomicBool,
    failures: Mutex<HashSet<Failure>>,
    outcomes: Mutex<Vec<ScanOutcome>>,
    completed: AtomicUsize,
}

impl RunState {
    fn new(targets: Vec<Target>) -> Self {
        let total = targets.len();
        Self {
            queue: WorkQueue::new(targets),
            total,
            any_failed: AtomicBool::new(false),
            failures: Mutex::new(HashSet::new()),
            outcomes: Mutex::new(Vec::with_capacity(total)),
            completed: AtomicUsize::new(0),
        }
    }

    fn has_failure(&self) -> bool {
        self.any_failed.load(Ordering::Relaxed)
    }

    fn record_failure(&self, failure: Failure) {
        self.any_failed.store(true, Ordering::Relaxed);
        lock(&self.failures).insert(failure);
    }

    /// Close out one dequeued unit: append its outcome, log progress, and
    /// acknowledge the queue. Called exactly once per taken target.
    fn finish_target(&self, outcome: ScanOutcome) {
        let target = outcome.target.clone();
        lock(&self.outcomes).push(outcome);
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        let percent = if self.total == 0 {
            100
        } else {
            completed * 100 / self.total
        };
        info!(target = %target, completed, total = self.total, percent, "target processed");
        self.queue.mark_done();
    }

    fn take_outcomes(&self) -> Vec<ScanOutcome> {
        std::mem::take(&mut *lock(&self.outcomes))
    }

    fn take_failures(&self) -> HashSet<Failure> {
        std::mem::take(&mut *lock(&self.failures))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Owns one scan run: expands nothing, retries nothing — it fans the
/// already-expanded target list out across a fixed pool of workers and
/// waits for the queue to drain or the operator to cancel.
pub struct Dispatcher {
    engine: Arc<dyn ScanEngine>,
    options: ScanOptions,
}

impl Dispatcher {
    pub fn new(engine: Arc<dyn ScanEngine>, options: ScanOptions) -> Self {
        Self { engine, options }
    }

    /// Run the pool to completion and collect every outcome.
    ///
    /// Per-target faults never escape: they land in the report's failure
    /// set. Cancellation is cooperative — the sentinel goes into the failure
    /// set, pending targets drain through the fail-fast path, and scans
    /// already in flight finish undisturbed.
    pub async fn run(&self, targets: Vec<Target>, cancel: CancellationToken) -> ScanReport {
        let jobs = self.options.jobs.max(1);
        let state = Arc::new(RunState::new(targets));
        debug!(targets = state.total, jobs, "starting scan workers");

        let workers: Vec<JoinHandle<()>> = (0..jobs)
            .map(|slot| {
                let state = Arc::clone(&state);
                let engine = Arc::clone(&self.engine);
                let options = self.options.clone();
                tokio::spawn(worker_loop(slot, state, engine, options))
            })
            .collect();

        tokio::select! {
            _ = state.queue.join() => {}
            _ = cancel.cancelled() => {
                warn!("scan interrupted, waiting for in-flight targets to finish");
                state.record_failure(Failure::Interrupted);
            }
        }

        // Workers exit on their own once the queue deque is empty; after an
        // interruption the fail-fast path drains it without new scans.
        for worker in workers {
            if let Err(err) = worker.await {
                warn!(%err, "scan worker aborted");
            }
        }

        ScanReport {
            outcomes: state.take_outcomes(),
            failures: state.take_failures(),
        }
    }
}

async fn worker_loop(
    slot: usize,
    state: Arc<RunState>,
    engine: Arc<dyn ScanEngine>,
    options: ScanOptions,
) {
    while let Some(target) = state.queue.try_take() {
        // Fail-fast: after the first recorded failure, later-dequeued
        // targets are marked failed without ever reaching the engine. The
        // check is intentionally racy (see RunState::any_failed).
        if state.has_failure() {
            debug!(target = %target, "skipping target after earlier failure");
            state.record_failure(Failure::Target(target.clone()));
            state.finish_target(ScanOutcome::new(target));
            continue;
        }

        let outcome = match evaluate_target(&target, engine.as_ref(), &options).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(target = %target, %err, "target evaluation failed");
                state.record_failure(Failure::Target(target.clone()));
                // A fault suppresses any result the target produced.
                ScanOutcome::new(target)
            }
        };
        state.finish_target(outcome);
    }
    trace!(slot, "worker finished, queue empty");
}

async fn evaluate_target(
    target: &Target,
    engine: &dyn ScanEngine,
    options: &ScanOptions,
) -> Result<ScanOutcome, Error> {
    let hints = bounded(options.call_timeout, engine.detect_platform_hints(target)).await?;
    debug!(target = %target, hints = hints.len(), "platform hints detected");

    let mut outcome = ScanOutcome::new(target.clone());
    if options.cve_scan {
        let output = bounded(
            options.call_timeout,
            engine.scan(target, ScanMode::Cve, &hints),
        )
        .await?;
        log_engine_exit(target, ScanMode::Cve, &output);
        outcome.cve = Some(output);
    }
    if options.standard_scan {
        let output = bounded(
            options.call_timeout,
            engine.scan(target, ScanMode::Standard, &hints),
        )
        .await?;
        log_engine_exit(target, ScanMode::Standard, &output);
        outcome.standard = Some(output);
    }
    Ok(outcome)
}

/// Apply the optional per-call limit to one engine call.
async fn bounded<T, F>(limit: Option<Duration>, call: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| Error::EngineTimeout(limit))?,
        None => call.await,
    }
}

/// A nonzero engine exit is an outcome, not a worker failure: 2 means the
/// evaluation ran and reported findings, anything else means the engine
/// could not run and is worth a warning.
fn log_engine_exit(target: &Target, mode: ScanMode, output: &EngineOutput) {
    match output.status() {
        EngineStatus::Clean => {
            debug!(target = %target, mode = %mode, "engine finished cleanly");
        }
        EngineStatus::Findings => {
            info!(target = %target, mode = %mode, "engine reported findings");
        }
        EngineStatus::Failed => {
            warn!(
                target = %target,
                mode = %mode,
                exit_code = output.exit_code,
                stderr = %output.stderr.trim(),
                "engine could not complete the scan"
            );
        }
    }
}
