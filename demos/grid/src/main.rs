//! grid — end-to-end accessibility run on a synthetic street grid.
//!
//! Every eastbound street block holds one origin (a residential block).
//! Shops and parks are scattered along the streets; each origin gets its
//! three nearest shops and every park within 20 minutes, travelling on foot
//! and by bus from 08:00.  Results go to `access.csv` and
//! `search_stats.csv` in the directory given as the first argument
//! (default `./output/grid`).
//!
//! Set `RUST_LOG=info` (or `debug`) to follow the run.

mod network;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use acc_core::{CategoryId, ModeRegistry, ObjectId};
use acc_network::LocatedObject;
use acc_output::{CsvWriter, WriterSink};
use acc_run::{CategoryConfig, RunBuilder, RunConfig, RunStatus};
use acc_search::{SearchBounds, WeightConfig, WeightKind};

use network::{build_grid, BLOCK_M, SIDE};

// ── Constants ─────────────────────────────────────────────────────────────────

const SHOPS:            CategoryId = CategoryId(1);
const PARKS:            CategoryId = CategoryId(2);
const NEAREST_SHOPS:    usize      = 3;
const PARK_LIMIT_SECS:  f64        = 20.0 * 60.0;
const START_CLOCK:      &str       = "08:00";

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output/grid"));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    // 1. Network.
    let modes = ModeRegistry::standard();
    let grid  = build_grid(&modes)?;
    println!(
        "Grid network: {} nodes, {} edges",
        grid.network.node_count(),
        grid.network.edge_count()
    );

    // 2. Origins: one per eastbound block, at its midpoint.
    let origins: Vec<LocatedObject> = grid
        .streets
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, &edge)| LocatedObject::new(ObjectId(i as u64), edge, BLOCK_M / 2.0, 1.0))
        .collect();

    // 3. Destinations: a shop on every third block, a park on every fifth.
    let mut destinations = Vec::new();
    let mut shops = Vec::new();
    let mut parks = Vec::new();
    for (i, &edge) in grid.streets.iter().flatten().enumerate() {
        if i % 3 == 0 {
            let id = ObjectId(1_000 + i as u64);
            destinations.push(LocatedObject::new(id, edge, BLOCK_M * 0.25, 1.0));
            shops.push(id);
        }
        if i % 5 == 0 {
            let id = ObjectId(2_000 + i as u64);
            destinations.push(LocatedObject::new(id, edge, BLOCK_M * 0.75, 1.0));
            parks.push(id);
        }
    }
    println!(
        "Origins: {}  |  Shops: {}  |  Parks: {}  |  Grid: {SIDE}×{SIDE}",
        origins.len(),
        shops.len(),
        parks.len()
    );

    // 4. Run configuration.
    let mut config = RunConfig::default()
        .with_modes(["foot", "transit"])
        .with_weight(WeightConfig::new(WeightKind::TravelTime))
        .with_start_clock(START_CLOCK)?;
    config.categories = vec![
        CategoryConfig {
            id:      SHOPS,
            bounds:  SearchBounds::default().with_max_destinations(NEAREST_SHOPS),
            members: shops,
        },
        CategoryConfig {
            id:      PARKS,
            bounds:  SearchBounds::default().with_max_travel_time(PARK_LIMIT_SECS),
            members: parks,
        },
    ];

    let run = RunBuilder::new(grid.network, modes, origins, destinations)
        .config(config)
        .build()?;

    // 5. Run and write.
    let writer   = CsvWriter::new(&out_dir)?;
    let mut sink = WriterSink::new(writer, run.modes());
    let summary  = run.run(&mut sink)?;

    println!();
    println!(
        "Origins searched: {}/{} ({} failed) on {} threads",
        summary.origins_done,
        summary.origins_total,
        summary.origins_failed,
        run.threads()
    );
    println!("Access rows:      {}", summary.records);
    println!("Elapsed:          {:.2?}", summary.elapsed);
    println!("Output:           {}", out_dir.display());

    if let RunStatus::Aborted { reason } = summary.status {
        anyhow::bail!("run aborted: {reason}");
    }
    Ok(())
}
