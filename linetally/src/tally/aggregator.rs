use crossbeam_channel::{bounded, select, Receiver, Sender};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::matcher::LineMatcher;
use super::scanner::scan_with;
use crate::errors::TallyResult;
use crate::results::{FileTally, TallySummary};

/// Index of a worker within one run
pub type WorkerId = usize;

/// One unit of work: a file and the target to count in it
#[derive(Debug, Clone)]
pub struct Job {
    pub worker: WorkerId,
    pub path: PathBuf,
    pub matcher: Arc<LineMatcher>,
}

/// A worker's single result for its job
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub tally: FileTally,
}

/// Sent by a worker after its report; carries only the worker's identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSignal {
    pub worker: WorkerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    Running,
    Reported,
    Finished,
}

/// Runs one worker per file and sums their counts.
///
/// Workers execute on a dedicated thread pool. Every run creates its own pair
/// of zero-capacity conduits: one for [`WorkerReport`]s and one for
/// [`CompletionSignal`]s. A worker sends its report first and its completion
/// signal second. Because both sends are rendezvous handoffs, the report has
/// already been received by the collect loop by the time the completion
/// signal can be, so closing the result conduit after the last completion
/// never drops a report.
///
/// The collect loop runs on the caller's thread and is the only owner of the
/// running total.
pub struct Aggregator {
    pool: ThreadPool,
}

impl Aggregator {
    /// Creates an aggregator whose workers run on `threads` pool threads
    pub fn new(threads: NonZeroUsize) -> TallyResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .thread_name(|i| format!("linetally-worker-{}", i))
            .panic_handler(|_| error!("Tally worker panicked before signalling completion"))
            .build()?;
        Ok(Self { pool })
    }

    /// Creates an aggregator sized to the number of CPUs
    pub fn with_default_threads() -> TallyResult<Self> {
        Self::new(NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Counts lines containing `target` across `paths` and returns the total.
    ///
    /// Files that cannot be opened or read contribute 0.
    pub fn run(&self, paths: &[PathBuf], target: &str) -> u64 {
        self.run_detailed(paths, target).total
    }

    /// Like [`Aggregator::run`], but also returns each file's outcome.
    ///
    /// # Panics
    ///
    /// Panics if called from one of this aggregator's own pool threads, or if
    /// a worker breaks the report-then-complete protocol.
    pub fn run_detailed(&self, paths: &[PathBuf], target: &str) -> TallySummary {
        assert!(
            self.pool.current_thread_index().is_none(),
            "Aggregator::run must not be called from its own worker pool"
        );

        if paths.is_empty() {
            debug!("No input files, returning empty tally");
            return TallySummary::new();
        }

        info!("Starting tally of {} files for {:?}", paths.len(), target);

        let (result_tx, result_rx) = bounded::<WorkerReport>(0);
        let (done_tx, done_rx) = bounded::<CompletionSignal>(0);
        let matcher = Arc::new(LineMatcher::new(target));

        for (worker, path) in paths.iter().enumerate() {
            let job = Job {
                worker,
                path: path.clone(),
                matcher: Arc::clone(&matcher),
            };
            let result_tx = result_tx.clone();
            let done_tx = done_tx.clone();
            self.pool.spawn(move || run_worker(job, &result_tx, &done_tx));
        }

        // Only workers hold senders from here on, so a worker that dies
        // without signalling shows up as a disconnect instead of a hang.
        drop(result_tx);
        drop(done_tx);

        let summary = collect(paths.len(), result_rx, done_rx);

        info!(
            "Tally complete. Found {} matching lines in {} files ({} failed)",
            summary.total, summary.files_with_matches, summary.files_failed
        );

        summary
    }
}

/// A worker given this path panics instead of scanning
#[cfg(test)]
const PANIC_PATH: &str = "linetally-test-worker-panic";

fn run_worker(job: Job, results: &Sender<WorkerReport>, done: &Sender<CompletionSignal>) {
    #[cfg(test)]
    if job.path.as_os_str() == PANIC_PATH {
        panic!("worker {} told to panic", job.worker);
    }

    let outcome = scan_with(&job.path, &job.matcher);
    let report = WorkerReport {
        worker: job.worker,
        tally: FileTally::new(job.path, outcome),
    };

    // Sends only fail once the collector has gone away, in which case nobody
    // is left to read either message.
    if results.send(report).is_err() {
        debug!("Collector gone, dropping report from worker {}", job.worker);
        return;
    }
    if done.send(CompletionSignal { worker: job.worker }).is_err() {
        debug!("Collector gone, dropping completion from worker {}", job.worker);
    }
}

/// Drains both conduits until `workers` completion signals have arrived.
///
/// Each worker must deliver exactly one report followed by exactly one
/// completion signal. Anything else is a bug in the caller and panics.
pub(crate) fn collect(
    workers: usize,
    results: Receiver<WorkerReport>,
    completions: Receiver<CompletionSignal>,
) -> TallySummary {
    let mut states = vec![WorkerState::Running; workers];
    let mut summary = TallySummary::new();
    let mut finished = 0;

    while finished < workers {
        select! {
            recv(results) -> msg => {
                let report = msg.unwrap_or_else(|_| {
                    panic!(
                        "Result conduit disconnected with {} of {} workers unfinished",
                        workers - finished,
                        workers
                    )
                });
                let state = worker_state(&mut states, report.worker);
                assert_eq!(
                    *state,
                    WorkerState::Running,
                    "Worker {} sent more than one report",
                    report.worker
                );
                *state = WorkerState::Reported;

                debug!(
                    "Worker {} reported {:?} for {}",
                    report.worker,
                    report.tally.outcome,
                    report.tally.path.display()
                );
                summary.add_file_tally(report.tally);
            }
            recv(completions) -> msg => {
                let signal = msg.unwrap_or_else(|_| {
                    panic!(
                        "Completion conduit disconnected with {} of {} workers unfinished",
                        workers - finished,
                        workers
                    )
                });
                let state = worker_state(&mut states, signal.worker);
                assert_eq!(
                    *state,
                    WorkerState::Reported,
                    "Worker {} signalled completion without exactly one prior report",
                    signal.worker
                );
                *state = WorkerState::Finished;

                finished += 1;
                debug!("Worker {} finished ({}/{})", signal.worker, finished, workers);
            }
        }
    }

    // Every worker has finished, so no report can still be in flight.
    drop(results);
    summary
}

fn worker_state(states: &mut [WorkerState], worker: WorkerId) -> &mut WorkerState {
    let workers = states.len();
    states
        .get_mut(worker)
        .unwrap_or_else(|| panic!("Unknown worker id {} (run has {} workers)", worker, workers))
}
