//! `acc-output` — result writers for accessibility runs.
//!
//! | Backend | Files created                        |
//! |---------|--------------------------------------|
//! | CSV     | `access.csv`, `search_stats.csv`     |
//!
//! Backends implement [`OutputWriter`] and are driven by [`WriterSink`],
//! which implements `acc_run::ResultSink`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use acc_output::{CsvWriter, WriterSink};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut sink = WriterSink::new(writer, run.modes());
//! let summary = run.run(&mut sink)?;
//! ```

pub mod csv;
pub mod error;
pub mod row;
pub mod sink;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::{AccessRow, StatsRow};
pub use sink::WriterSink;
pub use writer::OutputWriter;
