//! Synthetic city: a square street grid with one bus line across the middle.
//!
//! ```text
//!   (0,5) ── ── ── ── ── (5,5)
//!     │                    │
//!   (0,3) ═══ line 1/2 ═══ (5,3)    buses every 10 min, 06:00 – 22:00
//!     │                    │
//!   (0,0) ── ── ── ── ── (5,0)
//! ```

use anyhow::Result;

use acc_core::{Coord, EdgeId, LineId, ModeRegistry, NodeId, TripId};
use acc_network::{Connection, Network, NetworkBuilder, Timetable};

pub const SIDE:         usize = 6;
pub const BLOCK_M:      f64   = 250.0;
/// Street speed limit, 50 km/h.
const STREET_SPEED:     f64   = 50.0 / 3.6;
const BUS_ROW:          usize = 3;
const HOP_SECS:         f64   = 45.0;
const HEADWAY_SECS:     f64   = 600.0;
const FIRST_DEPARTURE:  f64   = 6.0 * 3600.0;
const LAST_DEPARTURE:   f64   = 22.0 * 3600.0;
const INTERCHANGE_SECS: f64   = 60.0;

pub struct Grid {
    pub network: Network,
    /// Eastbound street edges, row-major: `streets[row][col]` runs from
    /// `(col, row)` to `(col + 1, row)`.
    pub streets: Vec<Vec<EdgeId>>,
}

pub fn build_grid(modes: &ModeRegistry) -> Result<Grid> {
    let street_modes = modes.resolve(&["foot", "bicycle", "car"])?;
    let bus_modes    = modes.resolve(&["transit"])?;

    let mut b = NetworkBuilder::with_capacity(SIDE * SIDE, SIDE * SIDE * 6);
    let node = |col: usize, row: usize| NodeId((row * SIDE + col) as u32);

    for row in 0..SIDE {
        for col in 0..SIDE {
            b.add_node(Coord::new(col as f64 * BLOCK_M, row as f64 * BLOCK_M));
        }
    }

    let mut streets = vec![Vec::new(); SIDE];
    for row in 0..SIDE {
        for col in 0..SIDE - 1 {
            let (east, _) = b.add_straight_road(node(col, row), node(col + 1, row), STREET_SPEED, street_modes)?;
            streets[row].push(east);
        }
    }
    for col in 0..SIDE {
        for row in 0..SIDE - 1 {
            b.add_straight_road(node(col, row), node(col, row + 1), STREET_SPEED, street_modes)?;
        }
    }

    // Line 1 runs east, line 2 west.  Trip numbers are unique per line and
    // departure so a bus keeps its trip id along the whole row.
    let departures = ((LAST_DEPARTURE - FIRST_DEPARTURE) / HEADWAY_SECS) as u32 + 1;
    for (line, eastbound) in [(LineId(1), true), (LineId(2), false)] {
        for hop in 0..SIDE - 1 {
            let (from, to) = if eastbound {
                (node(hop, BUS_ROW), node(hop + 1, BUS_ROW))
            } else {
                (node(SIDE - 1 - hop, BUS_ROW), node(SIDE - 2 - hop, BUS_ROW))
            };
            let connections = (0..departures)
                .map(|k| {
                    let departure = FIRST_DEPARTURE + k as f64 * HEADWAY_SECS + hop as f64 * HOP_SECS;
                    Connection {
                        trip: TripId(line.0 * 10_000 + k),
                        line,
                        departure,
                        arrival: departure + HOP_SECS,
                    }
                })
                .collect();
            b.add_transit_edge(from, to, BLOCK_M, bus_modes, Timetable::new(connections));
        }
    }
    for col in 0..SIDE {
        let stop = node(col, BUS_ROW);
        b.set_interchange_time(stop, LineId(1), LineId(2), INTERCHANGE_SECS)?;
        b.set_interchange_time(stop, LineId(2), LineId(1), INTERCHANGE_SECS)?;
    }

    Ok(Grid { network: b.build()?, streets })
}
