//! `AccessRun` — dispatches origins over a worker pool.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use acc_core::{ModeRegistry, ObjectId};
use acc_network::{LocatedObject, Network, ObjectLayer};
use acc_search::{SearchEngine, SearchOutcome, SearchSettings, SearchStats};

use crate::{OriginReport, OriginStatus, ResultSink, RunError, RunResult};

// ── Summary ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunStatus {
    Completed,
    /// A sink error stopped the run.  Origins not yet started were skipped.
    Aborted { reason: String },
}

/// Counters returned by [`AccessRun::run`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub origins_total:  usize,
    /// Origins whose report reached the sink, failed ones included.
    pub origins_done:   usize,
    pub origins_failed: usize,
    pub records:        usize,
    pub status:         RunStatus,
    pub elapsed:        Duration,
}

impl RunSummary {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

// ── AccessRun ─────────────────────────────────────────────────────────────────

/// A validated run: network, modes, origins, destinations and search
/// settings.  Built by [`RunBuilder`](crate::RunBuilder).
pub struct AccessRun {
    pub(crate) network:      Network,
    pub(crate) modes:        ModeRegistry,
    pub(crate) origins:      ObjectLayer,
    pub(crate) destinations: ObjectLayer,
    pub(crate) settings:     SearchSettings,
    pub(crate) threads:      usize,
}

/// State shared by the workers of one run.
struct Shared<'s, S> {
    cursor:  AtomicUsize,
    fatal:   AtomicBool,
    reason:  Mutex<Option<String>>,
    done:    AtomicUsize,
    failed:  AtomicUsize,
    records: AtomicUsize,
    sink:    Mutex<&'s mut S>,
}

impl<S> Shared<'_, S> {
    fn abort(&self, reason: String) {
        log::error!("run aborted: {reason}");
        let mut slot = self.reason.lock().unwrap_or_else(PoisonError::into_inner);
        slot.get_or_insert(reason);
        self.fatal.store(true, Ordering::Release);
    }
}

impl AccessRun {
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn modes(&self) -> &ModeRegistry {
        &self.modes
    }

    pub fn origins(&self) -> &ObjectLayer {
        &self.origins
    }

    pub fn destinations(&self) -> &ObjectLayer {
        &self.destinations
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Search every origin and hand the reports to `sink`.
    ///
    /// Each worker owns one [`SearchEngine`] and claims origins from a
    /// shared cursor until none are left.  A panic inside one origin's
    /// search is reported as [`OriginStatus::Failed`] and the run goes on;
    /// a sink error stops every worker after its current origin.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::ThreadPool`] if the worker pool cannot start.
    /// Sink failures are not errors: they end the run with
    /// [`RunStatus::Aborted`].
    pub fn run<S: ResultSink>(&self, sink: &mut S) -> RunResult<RunSummary> {
        let started = Instant::now();
        let total   = self.origins.len();
        let workers = self.threads.min(total).max(1);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("acc-worker-{i}"))
            .build()
            .map_err(|e| RunError::ThreadPool(e.to_string()))?;

        log::info!("searching {total} origins on {workers} workers");

        let shared = Shared {
            cursor:  AtomicUsize::new(0),
            fatal:   AtomicBool::new(false),
            reason:  Mutex::new(None),
            done:    AtomicUsize::new(0),
            failed:  AtomicUsize::new(0),
            records: AtomicUsize::new(0),
            sink:    Mutex::new(sink),
        };

        pool.scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|_| self.work(&shared));
            }
        });

        let Shared { reason, done, failed, records, sink, .. } = shared;
        let mut summary = RunSummary {
            origins_total:  total,
            origins_done:   done.into_inner(),
            origins_failed: failed.into_inner(),
            records:        records.into_inner(),
            status:         match reason.into_inner().unwrap_or_else(PoisonError::into_inner) {
                Some(reason) => RunStatus::Aborted { reason },
                None => RunStatus::Completed,
            },
            elapsed:        started.elapsed(),
        };

        let sink = sink.into_inner().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = sink.on_run_end(&summary) {
            log::error!("run end: {e}");
            if summary.is_completed() {
                summary.status = RunStatus::Aborted { reason: e.to_string() };
            }
        }

        log::info!(
            "run finished: {}/{} origins, {} failed, {} records in {:.2?}",
            summary.origins_done,
            summary.origins_total,
            summary.origins_failed,
            summary.records,
            summary.elapsed,
        );
        Ok(summary)
    }

    fn work<S: ResultSink>(&self, shared: &Shared<'_, S>) {
        let mut engine = match SearchEngine::new(&self.network, &self.modes, self.settings.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                shared.abort(format!("worker could not start: {e}"));
                return;
            }
        };

        let origins = self.origins.as_slice();
        while !shared.fatal.load(Ordering::Acquire) {
            let i = shared.cursor.fetch_add(1, Ordering::Relaxed);
            let Some(origin) = origins.get(i) else { break };

            let report = match guarded(origin.id, || engine.search(origin, &self.destinations)) {
                Ok(outcome) => report_of(origin, outcome),
                Err(reason) => {
                    shared.failed.fetch_add(1, Ordering::Relaxed);
                    OriginReport {
                        origin:  origin.id,
                        weight:  origin.weight,
                        status:  OriginStatus::Failed { reason },
                        records: Vec::new(),
                        stats:   SearchStats::default(),
                    }
                }
            };

            let delivered = {
                let mut sink = shared.sink.lock().unwrap_or_else(PoisonError::into_inner);
                sink.on_origin(&report).and_then(|()| sink.on_origin_end(origin.id))
            };
            match delivered {
                Ok(()) => {
                    shared.done.fetch_add(1, Ordering::Relaxed);
                    shared.records.fetch_add(report.records.len(), Ordering::Relaxed);
                }
                Err(e) => shared.abort(format!("origin {}: {e}", origin.id)),
            }
        }
    }
}

fn report_of(origin: &LocatedObject, outcome: SearchOutcome) -> OriginReport {
    OriginReport {
        origin:  origin.id,
        weight:  origin.weight,
        status:  OriginStatus::Done,
        records: outcome.records,
        stats:   outcome.stats,
    }
}

/// Run one origin's search, turning a panic into an error message.
pub(crate) fn guarded<F>(origin: ObjectId, search: F) -> Result<SearchOutcome, String>
where
    F: FnOnce() -> SearchOutcome,
{
    panic::catch_unwind(AssertUnwindSafe(search)).map_err(|payload| {
        let reason = panic_message(payload.as_ref());
        log::error!("origin {origin} failed: {reason}");
        reason
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "search panicked".to_owned()
    }
}
