//! Flat row types written by output backends.

use acc_core::ModeRegistry;
use acc_run::{OriginReport, OriginStatus};
use acc_search::AccessRecord;

/// One origin → destination result.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRow {
    pub origin:           u64,
    pub destination:      u64,
    /// Empty unless the run uses destination categories.
    pub category:         Option<u16>,
    /// Metres.
    pub distance:         f64,
    /// Seconds.
    pub travel_time:      f64,
    pub value:            f64,
    pub interchanges:     u32,
    pub price:            f64,
    pub kcal:             f64,
    pub co2:              f64,
    pub waiting_time:     f64,
    pub transit_time:     f64,
    pub interchange_time: f64,
    /// Mode names, comma-separated.
    pub modes:            String,
    /// Line ids in riding order, `;`-separated.
    pub lines:            String,
    /// Number of edges on the path.
    pub edges:            usize,
}

impl AccessRow {
    pub fn from_record(record: &AccessRecord, modes: &ModeRegistry) -> Self {
        let m = &record.measures;
        Self {
            origin:           record.origin.0,
            destination:      record.destination.0,
            category:         record.category.map(|c| c.0),
            distance:         record.distance,
            travel_time:      record.travel_time,
            value:            record.value,
            interchanges:     m.interchanges,
            price:            m.price,
            kcal:             m.kcal,
            co2:              m.co2,
            waiting_time:     m.waiting_time,
            transit_time:     m.transit_time,
            interchange_time: m.interchange_time,
            modes:            modes.names(record.modes),
            lines:            record
                .lines
                .iter()
                .map(|l| l.0.to_string())
                .collect::<Vec<_>>()
                .join(";"),
            edges:            record.path.len(),
        }
    }
}

/// Search statistics of one origin.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRow {
    pub origin:         u64,
    pub weight:         f64,
    /// `"done"` or `"failed"`.
    pub status:         &'static str,
    pub records:        usize,
    pub nodes_settled:  u64,
    pub edges_relaxed:  u64,
    pub labels_created: u64,
    pub bound_extended: bool,
    pub elapsed_ms:     f64,
}

impl StatsRow {
    pub fn from_report(report: &OriginReport) -> Self {
        let s = &report.stats;
        Self {
            origin:         report.origin.0,
            weight:         report.weight,
            status:         match report.status {
                OriginStatus::Done => "done",
                OriginStatus::Failed { .. } => "failed",
            },
            records:        report.records.len(),
            nodes_settled:  s.nodes_settled,
            edges_relaxed:  s.edges_relaxed,
            labels_created: s.labels_created,
            bound_extended: s.bound_extended,
            elapsed_ms:     s.elapsed.as_secs_f64() * 1000.0,
        }
    }
}
