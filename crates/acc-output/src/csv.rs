//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `access.csv`
//! - `search_stats.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AccessRow, OutputError, OutputResult, StatsRow};

pub const ACCESS_HEADER: [&str; 16] = [
    "origin",
    "destination",
    "category",
    "distance_m",
    "travel_time_s",
    "value",
    "interchanges",
    "price",
    "kcal",
    "co2_g",
    "waiting_time_s",
    "transit_time_s",
    "interchange_time_s",
    "modes",
    "lines",
    "edges",
];

pub const STATS_HEADER: [&str; 9] = [
    "origin",
    "weight",
    "status",
    "records",
    "nodes_settled",
    "edges_relaxed",
    "labels_created",
    "bound_extended",
    "elapsed_ms",
];

/// Writes run output to two CSV files.
pub struct CsvWriter {
    access:   Writer<File>,
    stats:    Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut access = Writer::from_path(dir.join("access.csv"))?;
        access.write_record(ACCESS_HEADER)?;

        let mut stats = Writer::from_path(dir.join("search_stats.csv"))?;
        stats.write_record(STATS_HEADER)?;

        log::debug!("writing CSV output to {}", dir.display());
        Ok(Self {
            access,
            stats,
            finished: false,
        })
    }

    fn check_open(&self) -> OutputResult<()> {
        if self.finished { Err(OutputError::Finished) } else { Ok(()) }
    }
}

impl OutputWriter for CsvWriter {
    fn write_records(&mut self, rows: &[AccessRow]) -> OutputResult<()> {
        self.check_open()?;
        for row in rows {
            self.access.write_record(&[
                row.origin.to_string(),
                row.destination.to_string(),
                row.category.map(|c| c.to_string()).unwrap_or_default(),
                format!("{:.1}", row.distance),
                format!("{:.1}", row.travel_time),
                row.value.to_string(),
                row.interchanges.to_string(),
                format!("{:.2}", row.price),
                format!("{:.1}", row.kcal),
                format!("{:.1}", row.co2),
                format!("{:.1}", row.waiting_time),
                format!("{:.1}", row.transit_time),
                format!("{:.1}", row.interchange_time),
                row.modes.clone(),
                row.lines.clone(),
                row.edges.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_stats(&mut self, row: &StatsRow) -> OutputResult<()> {
        self.check_open()?;
        self.stats.write_record(&[
            row.origin.to_string(),
            row.weight.to_string(),
            row.status.to_owned(),
            row.records.to_string(),
            row.nodes_settled.to_string(),
            row.edges_relaxed.to_string(),
            row.labels_created.to_string(),
            (row.bound_extended as u8).to_string(),
            format!("{:.3}", row.elapsed_ms),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.access.flush()?;
        self.stats.flush()?;
        Ok(())
    }
}
