//! Bounded multimodal label-correcting search.
//!
//! # Algorithm
//!
//! A generalized Dijkstra over [`PathLabel`]s ordered by the active
//! [`WeightFunction`]:
//!
//! 1. Seed the origin's edge forward from the origin offset and, when the
//!    opposite edge allows a start mode, backward along the opposite.
//! 2. Pop the best queue entry.  Skip it if it exceeds the current
//!    travel-time or distance limit, or if it is a label that is no longer
//!    the table entry for its `(node, mode)` key (lazy deletion).
//! 3. Relax every outgoing edge usable by the label's mode.  A new label
//!    replaces the table entry only if it is strictly better.
//! 4. Every relaxed label projects the destinations on its edge (and on the
//!    opposite edge), even when it loses at its end node.  Each projection
//!    is queued as an arrival under its own cost and reaches the store only
//!    when popped, so the store fills in comparator order.
//! 5. The first time the store reports `finished()`, the travel-time limit
//!    becomes twice the travel time of the entry just settled.  This
//!    happens at most once per search.
//! 6. Stop when the queue is empty, or, for time-ordered weights, as soon as
//!    a popped entry is over the limit.
//!
//! # Variants
//!
//! | Variant      | Used when                                   | Table key       |
//! |--------------|---------------------------------------------|-----------------|
//! | `Single`     | exactly one mode, not scheduled             | node            |
//! | `Intermodal` | anything else                               | `(node, mode)`  |
//!
//! Only the intermodal variant rides scheduled edges, branches on mode
//! switches, and changes mode where an edge disallows the current one.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use acc_core::{EdgeId, ModeId, ModeRegistry, ModeSet, NodeId, ObjectId};
use acc_network::{Connection, Edge, LocatedObject, Network, ObjectLayer};

use crate::label::{LabelArena, LabelId, PathLabel};
use crate::measures::{Measures, Step};
use crate::projection::{self, AccessRecord, Candidate};
use crate::store::{DestinationCategories, DestinationStore};
use crate::weight::{CostKey, WeightFunction};
use crate::{SearchBounds, SearchError, SearchResult};

// ── Settings ──────────────────────────────────────────────────────────────────

/// Everything a search needs besides the graph and the origin.
#[derive(Clone, Debug)]
pub struct SearchSettings {
    pub weight:              WeightFunction,
    /// Bounds of the single-category store.  Ignored when `categories` is set.
    pub bounds:              SearchBounds,
    /// Seconds after midnight at which every search starts.
    pub start_time:          f64,
    pub modes:               ModeSet,
    /// Transfer seconds used where a stop has no entry for a line pair.
    pub default_interchange: f64,
    /// Switches the store to one sub-store per category.
    pub categories:          Option<Arc<DestinationCategories>>,
}

impl SearchSettings {
    pub fn new(modes: ModeSet) -> Self {
        Self {
            weight:              WeightFunction::default(),
            bounds:              SearchBounds::default(),
            start_time:          0.0,
            modes,
            default_interchange: 0.0,
            categories:          None,
        }
    }

    pub fn with_weight(mut self, weight: WeightFunction) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_bounds(mut self, bounds: SearchBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_start_time(mut self, secs: f64) -> Self {
        self.start_time = secs;
        self
    }

    pub fn with_default_interchange(mut self, secs: f64) -> Self {
        self.default_interchange = secs;
        self
    }

    pub fn with_categories(mut self, categories: Arc<DestinationCategories>) -> Self {
        self.categories = Some(categories);
        self
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Counters of one search.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    pub nodes_settled:  u64,
    pub edges_relaxed:  u64,
    pub labels_created: u64,
    /// The one-time travel-time extension fired.
    pub bound_extended: bool,
    pub elapsed:        Duration,
}

/// Records and statistics of one origin's search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub origin:  ObjectId,
    pub records: Vec<AccessRecord>,
    pub stats:   SearchStats,
}

/// A queue entry: a label to settle, or a projected destination arrival
/// (index into the pending candidates).  Arrivals sort first on equal cost.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Entry {
    Arrival(u32),
    Label(LabelId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Variant {
    Single(ModeId),
    Intermodal,
}

// ── SearchEngine ──────────────────────────────────────────────────────────────

/// One search worker.  Owns its queue, best-label table and label arena and
/// reuses them across origins; the network is only read.
pub struct SearchEngine<'a> {
    network:   &'a Network,
    modes:     &'a ModeRegistry,
    settings:  SearchSettings,
    variant:   Variant,
    scheduled: ModeSet,

    arena:   LabelArena,
    heap:    BinaryHeap<Reverse<(CostKey, Entry)>>,
    best:    FxHashMap<(NodeId, ModeId), LabelId>,
    pending: Vec<Candidate>,
    stats:   SearchStats,
}

impl<'a> SearchEngine<'a> {
    /// Validate `settings` against `modes` and pick the variant.
    pub fn new(
        network:  &'a Network,
        modes:    &'a ModeRegistry,
        settings: SearchSettings,
    ) -> SearchResult<Self> {
        settings.weight.validate()?;
        settings.bounds.validate()?;
        if let Some(bad) = settings.modes.iter().find(|m| m.index() >= modes.len()) {
            return Err(SearchError::UnregisteredMode(bad.0));
        }
        if !(settings.default_interchange >= 0.0) || !settings.default_interchange.is_finite() {
            return Err(SearchError::InvalidBound {
                name:   "default_interchange",
                reason: format!("{} is not a finite non-negative number", settings.default_interchange),
            });
        }

        let scheduled = modes.scheduled();
        let start     = settings.modes.iter().filter(|m| !scheduled.contains(*m)).collect::<ModeSet>();
        if start.is_empty() {
            return Err(SearchError::NoStartMode(settings.modes.0));
        }
        let variant = match (settings.modes.len(), start.first()) {
            (1, Some(m)) => Variant::Single(m),
            _ => Variant::Intermodal,
        };

        Ok(Self {
            network,
            modes,
            settings,
            variant,
            scheduled,
            arena:   LabelArena::new(),
            heap:    BinaryHeap::new(),
            best:    FxHashMap::default(),
            pending: Vec::new(),
            stats:   SearchStats::default(),
        })
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn is_intermodal(&self) -> bool {
        self.variant == Variant::Intermodal
    }

    /// Labels of the most recent search.
    pub fn arena(&self) -> &LabelArena {
        &self.arena
    }

    /// A fresh store matching the settings.
    pub fn new_store(&self) -> DestinationStore {
        match &self.settings.categories {
            Some(plan) => DestinationStore::multi(Arc::clone(plan)),
            None => DestinationStore::single(self.settings.bounds),
        }
    }

    /// Search from `origin` and drain a fresh store into records.
    pub fn search(&mut self, origin: &LocatedObject, destinations: &ObjectLayer) -> SearchOutcome {
        let store = self.new_store();
        self.search_with(origin, destinations, store)
    }

    /// Search from `origin` into `store`, then drain it.
    pub fn search_with(
        &mut self,
        origin:       &LocatedObject,
        destinations: &ObjectLayer,
        mut store:    DestinationStore,
    ) -> SearchOutcome {
        let started = Instant::now();
        self.reset();
        self.seed(origin, destinations);
        self.run(destinations, &mut store);

        let records        = store.collect_results(&self.arena, origin.id);
        self.stats.elapsed = started.elapsed();
        log::debug!(
            "origin {}: {} record(s), {} settled, {} relaxed, {} labels in {:?}",
            origin.id,
            records.len(),
            self.stats.nodes_settled,
            self.stats.edges_relaxed,
            self.stats.labels_created,
            self.stats.elapsed,
        );
        SearchOutcome { origin: origin.id, records, stats: self.stats }
    }

    fn reset(&mut self) {
        self.arena.clear();
        self.heap.clear();
        self.best.clear();
        self.pending.clear();
        self.stats = SearchStats::default();
    }

    // ── Main loop ─────────────────────────────────────────────────────────

    fn run(&mut self, destinations: &ObjectLayer, store: &mut DestinationStore) {
        let (mut tt_limit, dist_limit) = store.search_limits();
        let time_ordered = self.settings.weight.is_time_ordered();
        let mut extended = false;

        while let Some(Reverse((_, entry))) = self.heap.pop() {
            let (travel_time, distance) = match entry {
                Entry::Arrival(i) => {
                    let c = &self.pending[i as usize];
                    (c.travel_time, c.distance)
                }
                Entry::Label(id) => {
                    let l = self.arena.get(id);
                    (l.travel_time, l.distance)
                }
            };
            if tt_limit.is_some_and(|t| travel_time > t) {
                if time_ordered {
                    break;
                }
                continue;
            }
            if dist_limit.is_some_and(|d| distance > d) {
                continue;
            }

            match entry {
                Entry::Arrival(i) => {
                    store.add_result(self.pending[i as usize]);
                }
                Entry::Label(id) => {
                    let label = *self.arena.get(id);
                    if self.best.get(&(label.node, label.mode)) != Some(&id) {
                        continue;
                    }
                    self.stats.nodes_settled += 1;
                    self.expand(id, &label, destinations);
                }
            }

            if !extended && store.finished() {
                extended = true;
                self.stats.bound_extended = true;
                tt_limit = Some(travel_time * 2.0);
            }
        }
    }

    // ── Seeding ───────────────────────────────────────────────────────────

    fn seed(&mut self, origin: &LocatedObject, destinations: &ObjectLayer) {
        let net = self.network;
        let Some(edge) = net.get_edge(origin.edge) else {
            return;
        };
        let offset = origin.offset.clamp(0.0, edge.length);

        self.seed_edge(edge, offset, false, destinations);
        if let Some(opp) = edge.opposite.and_then(|o| net.get_edge(o)) {
            self.seed_edge(opp, (opp.length - offset).max(0.0), true, destinations);
        }
    }

    fn seed_edge(
        &mut self,
        edge:         &Edge,
        entry:        f64,
        via_opposite: bool,
        destinations: &ObjectLayer,
    ) {
        if edge.is_scheduled() {
            return;
        }
        let start = match self.variant {
            Variant::Single(m) => ModeSet::single(m),
            Variant::Intermodal => self.settings.modes,
        };
        let usable    = start.intersection(edge.modes);
        let partial   = (edge.length - entry).max(0.0);
        let scheduled = self.scheduled;
        let modes     = self.modes;

        for m in usable.iter().filter(|m| !scheduled.contains(*m)) {
            let mode = modes.get(m);
            let ride = edge.travel_time_over(partial, mode.max_speed, self.settings.start_time);
            if !ride.is_finite() {
                continue;
            }
            let step = Step {
                mode,
                distance:         partial,
                ride_time:        ride,
                wait_time:        0.0,
                interchange_time: 0.0,
                boarded:          None,
            };
            let measures = self.settings.weight.build_measures(&Measures::default(), &step);
            let label = PathLabel {
                prev:             None,
                node:             edge.to,
                edge:             edge.id,
                mode:             m,
                modes:            start,
                used_modes:       ModeSet::single(m),
                distance:         partial,
                travel_time:      ride,
                edge_time:        ride,
                ride_time:        ride,
                interchange_time: 0.0,
                wait_time:        0.0,
                via_opposite,
                start_offset:     entry,
                line:             None,
                trip:             None,
                switched:         false,
                measures,
            };
            self.offer(label, destinations);
        }
    }

    // ── Relaxation ────────────────────────────────────────────────────────

    fn expand(&mut self, id: LabelId, label: &PathLabel, destinations: &ObjectLayer) {
        let net       = self.network;
        let scheduled = self.scheduled;
        for &e in net.out_edges(label.node) {
            let edge = net.edge(e);
            match self.variant {
                Variant::Single(m) => {
                    if !edge.is_scheduled() && edge.modes.contains(m) {
                        self.relax_road(id, label, edge, m, destinations);
                    }
                }
                Variant::Intermodal => {
                    if edge.is_scheduled() {
                        let riders = edge.modes.intersection(label.modes).intersection(scheduled);
                        for m in riders.iter() {
                            self.relax_transit(id, label, edge, m, destinations);
                        }
                    } else if edge.modes.contains(label.mode) && !scheduled.contains(label.mode) {
                        self.relax_road(id, label, edge, label.mode, destinations);
                    } else {
                        let options = edge.modes.intersection(label.modes);
                        for m in options.iter().filter(|m| !scheduled.contains(*m)) {
                            self.relax_road(id, label, edge, m, destinations);
                        }
                    }
                }
            }
        }
    }

    /// Traverse an unscheduled edge in mode `m`.
    fn relax_road(
        &mut self,
        prev_id:      LabelId,
        prev:         &PathLabel,
        edge:         &Edge,
        m:            ModeId,
        destinations: &ObjectLayer,
    ) {
        let modes    = self.modes;
        let mode     = modes.get(m);
        let crossing = self.network.edge(prev.edge).crossing_time(edge.id);
        let entered  = self.settings.start_time + prev.travel_time + crossing;
        let ride     = edge.travel_time(mode.max_speed, entered);
        if !ride.is_finite() {
            return;
        }
        self.stats.edges_relaxed += 1;

        let step = Step {
            mode,
            distance:         edge.length,
            ride_time:        ride,
            wait_time:        0.0,
            interchange_time: 0.0,
            boarded:          None,
        };
        let label = PathLabel {
            prev:             Some(prev_id),
            node:             edge.to,
            edge:             edge.id,
            mode:             m,
            modes:            prev.modes,
            used_modes:       prev.used_modes.with(m),
            distance:         prev.distance + edge.length,
            travel_time:      prev.travel_time + crossing + ride,
            edge_time:        crossing + ride,
            ride_time:        ride,
            interchange_time: 0.0,
            wait_time:        0.0,
            via_opposite:     false,
            start_offset:     0.0,
            line:             None,
            trip:             None,
            switched:         false,
            measures:         self.settings.weight.build_measures(&prev.measures, &step),
        };
        self.offer(label, destinations);
    }

    /// Ride a scheduled edge in mode `m`, staying on the current trip when it
    /// serves the edge, else boarding the earliest reachable connection.
    fn relax_transit(
        &mut self,
        prev_id:      LabelId,
        prev:         &PathLabel,
        edge:         &Edge,
        m:            ModeId,
        destinations: &ObjectLayer,
    ) {
        let Some(timetable) = edge.timetable.as_ref() else {
            return;
        };
        let crossing = self.network.edge(prev.edge).crossing_time(edge.id);
        let arrived  = self.settings.start_time + prev.travel_time + crossing;

        let staying = prev.trip.and_then(|trip| timetable.connection_of(trip, arrived));
        let (conn, transfer) = match staying {
            Some(c) => (*c, 0.0),
            None => match self.board(prev, edge, timetable.departures_from(arrived), arrived) {
                Some(found) => found,
                None => return,
            },
        };
        self.stats.edges_relaxed += 1;

        let modes = self.modes;
        let mode  = modes.get(m);
        let ride  = conn.ride_time();
        let wait = (conn.departure - arrived - transfer).max(0.0);
        let step = Step {
            mode,
            distance:         edge.length,
            ride_time:        ride,
            wait_time:        wait,
            interchange_time: transfer,
            boarded:          Some((conn.line, conn.trip)),
        };
        let added = crossing + (conn.departure - arrived) + ride;
        let label = PathLabel {
            prev:             Some(prev_id),
            node:             edge.to,
            edge:             edge.id,
            mode:             m,
            modes:            prev.modes,
            used_modes:       prev.used_modes.with(m),
            distance:         prev.distance + edge.length,
            travel_time:      prev.travel_time + added,
            edge_time:        added,
            ride_time:        ride,
            interchange_time: transfer,
            wait_time:        wait,
            via_opposite:     false,
            start_offset:     0.0,
            line:             Some(conn.line),
            trip:             Some(conn.trip),
            switched:         false,
            measures:         self.settings.weight.build_measures(&prev.measures, &step),
        };
        self.offer(label, destinations);
    }

    /// Earliest connection in `departures` reachable after the transfer time
    /// from the previously ridden line.  Returns the connection and the
    /// transfer seconds.
    fn board(
        &self,
        prev:       &PathLabel,
        edge:       &Edge,
        departures: &[Connection],
        arrived:    f64,
    ) -> Option<(Connection, f64)> {
        let stop = self.network.node(edge.from);
        departures.iter().find_map(|c| {
            let transfer = match prev.measures.last_line {
                Some(line) if prev.measures.last_trip != Some(c.trip) => stop
                    .interchange_time(line, c.line)
                    .unwrap_or(self.settings.default_interchange),
                _ => 0.0,
            };
            (c.departure >= arrived + transfer).then_some((*c, transfer))
        })
    }

    // ── Acceptance ────────────────────────────────────────────────────────

    /// Insert `label` if it beats the table entry for its key, then branch
    /// configured mode switches.  Destinations on the label's edge are
    /// queued as arrivals whether or not the label wins its node: the store
    /// keeps the best path per destination on its own.
    fn offer(&mut self, label: PathLabel, destinations: &ObjectLayer) {
        let weight = self.settings.weight;
        let key    = weight.key(&label.cost());
        let slot   = (label.node, label.mode);

        let accepted = match self.best.get(&slot) {
            Some(&held) => key < weight.key(&self.arena.get(held).cost()),
            None => true,
        };
        let serves = !label.switched && self.serves_destinations(label.edge, destinations);
        if !accepted && !serves {
            return;
        }

        let id = self.arena.push(label);
        if serves {
            self.queue_arrivals(id, &label, destinations);
        }
        if !accepted {
            return;
        }
        self.best.insert(slot, id);
        self.heap.push(Reverse((key, Entry::Label(id))));
        self.stats.labels_created += 1;

        if self.variant == Variant::Intermodal {
            self.branch_switches(id, &label, destinations);
        }
    }

    fn serves_destinations(&self, edge: EdgeId, destinations: &ObjectLayer) -> bool {
        let e = self.network.edge(edge);
        destinations.has_objects_on(edge) || e.opposite.is_some_and(|o| destinations.has_objects_on(o))
    }

    fn queue_arrivals(&mut self, id: LabelId, label: &PathLabel, destinations: &ObjectLayer) {
        let net      = self.network;
        let edge     = net.edge(label.edge);
        let opposite = edge.opposite.into_iter();
        for on in std::iter::once(edge.id).chain(opposite) {
            for dest in destinations.on_edge(on) {
                let Some(pos) = projection::position_on(edge, dest) else {
                    continue;
                };
                let found = projection::project(
                    &self.arena,
                    id,
                    edge,
                    self.modes,
                    &self.settings.weight,
                    dest,
                    pos,
                );
                if let Some(candidate) = found {
                    let entry = Entry::Arrival(self.pending.len() as u32);
                    self.heap.push(Reverse((candidate.key, entry)));
                    self.pending.push(candidate);
                }
            }
        }
    }

    /// Zero-cost labels for each configured switch leaving the label's mode
    /// at its node.  The abandoned mode leaves the available set; targets
    /// outside the requested modes are ignored.
    fn branch_switches(&mut self, id: LabelId, label: &PathLabel, destinations: &ObjectLayer) {
        let net  = self.network;
        let node = net.node(label.node);
        for to in node.switches_from(label.mode) {
            if to == label.mode || !self.settings.modes.contains(to) {
                continue;
            }
            let switched = PathLabel {
                prev:             Some(id),
                mode:             to,
                modes:            label.modes.without(label.mode).with(to),
                edge_time:        0.0,
                ride_time:        0.0,
                interchange_time: 0.0,
                wait_time:        0.0,
                via_opposite:     false,
                line:             None,
                trip:             None,
                switched:         true,
                ..*label
            };
            self.offer(switched, destinations);
        }
    }
}
