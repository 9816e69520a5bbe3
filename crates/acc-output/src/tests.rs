//! Integration tests for acc-output.

#[cfg(test)]
mod fixtures {
    use acc_core::{CategoryId, EdgeId, LineId, ModeRegistry, ObjectId};
    use acc_search::{AccessRecord, Measures};

    pub fn record(origin: u64, dest: u64) -> AccessRecord {
        let modes = ModeRegistry::standard();
        AccessRecord {
            origin:      ObjectId(origin),
            destination: ObjectId(dest),
            category:    Some(CategoryId(3)),
            distance:    1234.56,
            travel_time: 600.0,
            value:       2.5,
            measures:    Measures {
                interchanges: 1,
                price:        0.25,
                waiting_time: 90.0,
                ..Measures::default()
            },
            modes:       modes.resolve(&["foot", "transit"]).unwrap(),
            lines:       vec![LineId(7), LineId(12)],
            path:        vec![EdgeId(0), EdgeId(4), EdgeId(9)],
        }
    }
}

#[cfg(test)]
mod row_tests {
    use std::time::Duration;

    use acc_core::{ModeRegistry, ObjectId};
    use acc_run::{OriginReport, OriginStatus};
    use acc_search::SearchStats;

    use super::fixtures::record;
    use crate::{AccessRow, StatsRow};

    #[test]
    fn access_row_flattens_record() {
        let row = AccessRow::from_record(&record(1, 2), &ModeRegistry::standard());
        assert_eq!(row.origin, 1);
        assert_eq!(row.destination, 2);
        assert_eq!(row.category, Some(3));
        assert_eq!(row.modes, "foot,transit");
        assert_eq!(row.lines, "7;12");
        assert_eq!(row.edges, 3);
        assert_eq!(row.interchanges, 1);
    }

    #[test]
    fn stats_row_marks_failures() {
        let report = OriginReport {
            origin:  ObjectId(5),
            weight:  3.0,
            status:  OriginStatus::Failed { reason: "boom".into() },
            records: Vec::new(),
            stats:   SearchStats { elapsed: Duration::from_millis(4), ..SearchStats::default() },
        };
        let row = StatsRow::from_report(&report);
        assert_eq!(row.status, "failed");
        assert_eq!(row.records, 0);
        assert!((row.elapsed_ms - 4.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use acc_core::ModeRegistry;

    use super::fixtures::record;
    use crate::csv::{CsvWriter, ACCESS_HEADER, STATS_HEADER};
    use crate::writer::OutputWriter;
    use crate::{AccessRow, OutputError};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn read(dir: &TempDir, file: &str) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (access, rows) = read(&dir, "access.csv");
        assert_eq!(access, ACCESS_HEADER);
        assert!(rows.is_empty());
        let (stats, _) = read(&dir, "search_stats.csv");
        assert_eq!(stats, STATS_HEADER);
    }

    #[test]
    fn access_rows_written() {
        let dir = tmp();
        let modes = ModeRegistry::standard();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let rows: Vec<AccessRow> = [record(1, 2), record(1, 3)]
            .iter()
            .map(|r| AccessRow::from_record(r, &modes))
            .collect();
        w.write_records(&rows).unwrap();
        w.finish().unwrap();

        let (_, read_rows) = read(&dir, "access.csv");
        assert_eq!(read_rows.len(), 2);
        assert_eq!(&read_rows[0][0], "1");     // origin
        assert_eq!(&read_rows[1][1], "3");     // destination
        assert_eq!(&read_rows[0][2], "3");     // category
        assert_eq!(&read_rows[0][3], "1234.6"); // distance
        assert_eq!(&read_rows[0][13], "foot,transit");
        assert_eq!(&read_rows[0][14], "7;12");
    }

    #[test]
    fn finish_is_idempotent_and_final() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
        assert!(matches!(w.write_records(&[]), Err(OutputError::Finished)));
    }
}

#[cfg(test)]
mod sink_tests {
    use tempfile::TempDir;

    use acc_core::{Coord, ModeRegistry, ObjectId};
    use acc_network::{LocatedObject, NetworkBuilder};
    use acc_run::{ResultSink, RunBuilder, RunConfig};

    use crate::csv::CsvWriter;
    use crate::sink::WriterSink;

    #[test]
    fn run_written_to_csv() {
        let modes = ModeRegistry::standard();
        let foot  = modes.resolve(&["foot"]).unwrap();
        let mut b = NetworkBuilder::new();
        let n: Vec<_> = (0..4).map(|i| b.add_node(Coord::new(i as f64 * 100.0, 0.0))).collect();
        let e: Vec<_> = n.windows(2).map(|w| b.add_road(w[0], w[1], 100.0, 1.0, foot).0).collect();
        let net = b.build().unwrap();

        let origins = vec![
            LocatedObject::new(ObjectId(1), e[0], 0.0, 1.0),
            LocatedObject::new(ObjectId(2), e[2], 50.0, 1.0),
        ];
        let dests = vec![
            LocatedObject::new(ObjectId(10), e[1], 50.0, 1.0),
            LocatedObject::new(ObjectId(11), e[2], 100.0, 1.0),
        ];
        let run = RunBuilder::new(net, modes, origins, dests)
            .config(RunConfig::default().with_threads(2))
            .build()
            .unwrap();

        let dir: TempDir = tempfile::tempdir().unwrap();
        let mut sink = WriterSink::new(CsvWriter::new(dir.path()).unwrap(), run.modes());
        let summary = run.run(&mut sink).unwrap();
        assert!(summary.is_completed());
        assert_eq!(sink.rows_written(), summary.records);
        assert_eq!(summary.records, 4);

        let access = csv::Reader::from_path(dir.path().join("access.csv"))
            .unwrap()
            .records()
            .count();
        assert_eq!(access, 4);
        let stats = csv::Reader::from_path(dir.path().join("search_stats.csv"))
            .unwrap()
            .records()
            .count();
        assert_eq!(stats, 2);

        // Writer is finished; a late report is refused.
        let late = acc_run::OriginReport {
            origin:  ObjectId(3),
            weight:  1.0,
            status:  acc_run::OriginStatus::Done,
            records: Vec::new(),
            stats:   Default::default(),
        };
        assert!(sink.on_origin(&late).is_err());
    }
}
