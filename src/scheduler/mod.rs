//! Bounded fan-out of the per-address pipeline.
//!
//! Addresses go to a fixed-size worker pool chunk by chunk. Results are
//! gathered in completion order, progress is reported after each address,
//! and a [`CancelToken`] stops submission between chunks.

mod options;
mod progress;

pub use options::RunOptions;
pub use progress::{CancelToken, NoProgress, Progress, ProgressObserver};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::dns::{LookupMx, SystemResolver};
use crate::pipeline::{Classification, Pipeline};
use crate::report::RunReport;
use crate::smtp::{Probe, SmtpProber};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("cannot start worker pool: {source}")]
    Pool {
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

pub struct Scheduler<R = SystemResolver, P = SmtpProber> {
    pipeline: Pipeline<R, P>,
    options: RunOptions,
    pool: ThreadPool,
}

impl<R, P> Scheduler<R, P>
where
    R: LookupMx,
    P: Probe,
{
    /// Starts a dedicated pool of `options.workers` threads.
    pub fn new(pipeline: Pipeline<R, P>, options: RunOptions) -> Result<Self, SchedulerError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(options.workers())
            .thread_name(|index| format!("mailsweep-worker-{index}"))
            .build()
            .map_err(|source| SchedulerError::Pool { source })?;
        Ok(Self {
            pipeline,
            options,
            pool,
        })
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    pub fn pipeline(&self) -> &Pipeline<R, P> {
        &self.pipeline
    }

    /// Checks every address and returns one classification per submitted
    /// address, in completion order.
    ///
    /// Each chunk is drained before the next one is submitted. Cancellation
    /// is checked between chunks: probes already running finish (or time
    /// out) and the remaining addresses are listed in
    /// [`RunReport::unsubmitted`].
    pub fn run<S, O>(&self, addresses: &[S], observer: &O, cancel: &CancelToken) -> RunReport
    where
        S: AsRef<str> + Sync,
        O: ProgressObserver + ?Sized,
    {
        let total = addresses.len();
        let batch_size = self.options.batch_size();
        let completed = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<Classification>();
        let mut results = Vec::with_capacity(total);
        let mut unsubmitted = Vec::new();
        let started = Instant::now();

        info!(
            total,
            workers = self.options.workers(),
            batch_size,
            "run started"
        );

        for (index, chunk) in addresses.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                let offset = index * batch_size;
                unsubmitted = addresses[offset..]
                    .iter()
                    .map(|address| address.as_ref().trim().to_string())
                    .collect();
                warn!(
                    submitted = offset,
                    skipped = unsubmitted.len(),
                    "run cancelled"
                );
                break;
            }

            debug!(chunk = index, size = chunk.len(), "submitting chunk");
            self.pool.scope(|scope| {
                for address in chunk {
                    let tx = tx.clone();
                    let completed = &completed;
                    scope.spawn(move |_| {
                        let classification = self.check_isolated(address.as_ref());
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        observer.on_progress(Progress {
                            completed: done,
                            total,
                        });
                        // rx outlives the scope
                        let _ = tx.send(classification);
                    });
                }
            });
            results.extend(rx.try_iter());
        }
        drop(tx);
        results.extend(rx.try_iter());

        let report = RunReport::new(results, unsubmitted);
        info!(
            checked = report.results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "{}",
            report.summary()
        );
        report
    }

    /// Convenience wrapper without progress reporting or cancellation.
    pub fn run_all<S>(&self, addresses: &[S]) -> RunReport
    where
        S: AsRef<str> + Sync,
    {
        self.run(addresses, &NoProgress, &CancelToken::new())
    }

    /// A panic inside the pipeline becomes an `Invalid` row for that address
    /// only.
    fn check_isolated(&self, address: &str) -> Classification {
        match panic::catch_unwind(AssertUnwindSafe(|| self.pipeline.check(address))) {
            Ok(classification) => classification,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(address, %message, "pipeline panicked");
                Classification::invalid(address.trim(), format!("Unexpected error: {message}"))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
