//! `WriterSink<W>` — bridges `ResultSink` to an `OutputWriter`.

use acc_core::{ModeRegistry, ObjectId};
use acc_run::{OriginReport, ResultSink, RunSummary, SinkError};

use crate::row::{AccessRow, StatsRow};
use crate::writer::OutputWriter;

/// A [`ResultSink`] that flattens each origin's records and statistics and
/// hands them to any [`OutputWriter`] backend.
///
/// A write error is returned to the run, which then stops.
pub struct WriterSink<W: OutputWriter> {
    writer: W,
    modes:  ModeRegistry,
    rows:   usize,
}

impl<W: OutputWriter> WriterSink<W> {
    /// `modes` names the mode bits of the written records.
    pub fn new(writer: W, modes: &ModeRegistry) -> Self {
        Self {
            writer,
            modes: modes.clone(),
            rows:  0,
        }
    }

    /// Access rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: OutputWriter> ResultSink for WriterSink<W> {
    fn on_origin(&mut self, report: &OriginReport) -> Result<(), SinkError> {
        let rows: Vec<AccessRow> = report
            .records
            .iter()
            .map(|r| AccessRow::from_record(r, &self.modes))
            .collect();
        if !rows.is_empty() {
            self.writer.write_records(&rows).map_err(SinkError::new)?;
        }
        self.writer
            .write_stats(&StatsRow::from_report(report))
            .map_err(SinkError::new)?;
        self.rows += rows.len();
        Ok(())
    }

    fn on_origin_end(&mut self, origin: ObjectId) -> Result<(), SinkError> {
        log::trace!("origin {origin} written");
        Ok(())
    }

    fn on_run_end(&mut self, summary: &RunSummary) -> Result<(), SinkError> {
        self.writer.finish().map_err(SinkError::new)?;
        log::info!("{} access rows written for {} origins", self.rows, summary.origins_done);
        Ok(())
    }
}
