//! The boundary between the worker pool and whatever stores results.

use std::fmt;

use thiserror::Error;

use acc_core::ObjectId;
use acc_search::{AccessRecord, SearchStats};

use crate::RunSummary;

/// Raised by a [`ResultSink`].  Any sink error aborts the run.
#[derive(Debug, Error)]
#[error("result sink failed: {message}")]
pub struct SinkError {
    message: String,
}

impl SinkError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self { message: message.to_string() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError::new(e)
    }
}

/// How an origin's search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OriginStatus {
    Done,
    /// The search panicked.  `records` is empty.
    Failed { reason: String },
}

/// Everything one origin search produced.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OriginReport {
    pub origin:  ObjectId,
    /// The origin object's weight.
    pub weight:  f64,
    pub status:  OriginStatus,
    pub records: Vec<AccessRecord>,
    pub stats:   SearchStats,
}

impl OriginReport {
    pub fn is_done(&self) -> bool {
        self.status == OriginStatus::Done
    }
}

/// Receives per-origin results from the workers.
///
/// Calls are serialized: at most one worker is inside a sink method at a
/// time.  Origins arrive in completion order, not input order.
///
/// # Example — count records
///
/// ```rust,ignore
/// struct Counter(usize);
///
/// impl ResultSink for Counter {
///     fn on_origin(&mut self, report: &OriginReport) -> Result<(), SinkError> {
///         self.0 += report.records.len();
///         Ok(())
///     }
/// }
/// ```
pub trait ResultSink: Send {
    /// Called once per origin, failed ones included.
    fn on_origin(&mut self, report: &OriginReport) -> Result<(), SinkError>;

    /// Called right after `on_origin` for the same origin.
    fn on_origin_end(&mut self, _origin: ObjectId) -> Result<(), SinkError> {
        Ok(())
    }

    /// Called once after every worker has stopped.
    fn on_run_end(&mut self, _summary: &RunSummary) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A [`ResultSink`] that discards everything.
pub struct NoopSink;

impl ResultSink for NoopSink {
    fn on_origin(&mut self, _report: &OriginReport) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps every report in memory.
#[derive(Default)]
pub struct CollectingSink {
    pub reports:  Vec<OriginReport>,
    pub ended:    Vec<ObjectId>,
    pub finished: bool,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records ordered by origin, category, travel time, destination.
    pub fn records(&self) -> Vec<AccessRecord> {
        let mut all: Vec<AccessRecord> = self
            .reports
            .iter()
            .flat_map(|r| r.records.iter().cloned())
            .collect();
        all.sort_by(|a, b| {
            a.origin
                .cmp(&b.origin)
                .then(a.category.cmp(&b.category))
                .then(a.travel_time.total_cmp(&b.travel_time))
                .then(a.destination.cmp(&b.destination))
        });
        all
    }

    pub fn report(&self, origin: ObjectId) -> Option<&OriginReport> {
        self.reports.iter().find(|r| r.origin == origin)
    }
}

impl ResultSink for CollectingSink {
    fn on_origin(&mut self, report: &OriginReport) -> Result<(), SinkError> {
        self.reports.push(report.clone());
        Ok(())
    }

    fn on_origin_end(&mut self, origin: ObjectId) -> Result<(), SinkError> {
        self.ended.push(origin);
        Ok(())
    }

    fn on_run_end(&mut self, _summary: &RunSummary) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}
