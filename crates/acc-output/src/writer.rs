//! The `OutputWriter` trait implemented by backend writers.

use crate::{AccessRow, OutputResult, StatsRow};

pub trait OutputWriter: Send {
    /// Write the access rows of one origin.
    fn write_records(&mut self, rows: &[AccessRow]) -> OutputResult<()>;

    /// Write one origin's search statistics.
    fn write_stats(&mut self, row: &StatsRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.  Writes after `finish` fail with
    /// [`OutputError::Finished`](crate::OutputError::Finished).
    fn finish(&mut self) -> OutputResult<()>;
}
