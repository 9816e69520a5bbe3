//! Network arena and builder.
//!
//! # Data layout
//!
//! Nodes and edges are stored in two flat arenas indexed by `NodeId` and
//! `EdgeId`.  Edge IDs are assigned in insertion order and stay stable, so
//! the opposite-edge and crossing-time relations can refer to them before
//! `build()` runs.
//!
//! Adjacency is **Compressed Sparse Row (CSR)** in both directions.  The
//! outgoing edges of node `n` are
//!
//! ```text
//! out_edges[ out_start[n] .. out_start[n+1] ]
//! ```
//!
//! and likewise for `in_edges`/`in_start`.  Edges whose mode set is empty
//! are left out of both adjacency lists: they exist in the arena but can
//! never be reached.

use rustc_hash::FxHashMap;

use acc_core::{Coord, EdgeId, LineId, ModeId, ModeSet, NodeId};

use crate::{Edge, NetworkError, NetworkResult, SpeedInterval, Timetable};

// ── Node ──────────────────────────────────────────────────────────────────────

/// A configured change of vehicle at a node, e.g. `car → foot` at a car park.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSwitch {
    pub from: ModeId,
    pub to:   ModeId,
}

/// A network node.
#[derive(Clone, Debug)]
pub struct Node {
    pub id:            NodeId,
    pub pos:           Coord,
    /// Mode changes allowed at this node.
    pub mode_switches: Vec<ModeSwitch>,
    /// Transfer seconds between two lines at this stop.  Missing pairs fall
    /// back to the run's default interchange time.
    pub interchange:   FxHashMap<(LineId, LineId), f64>,
}

impl Node {
    #[inline]
    pub fn interchange_time(&self, from: LineId, to: LineId) -> Option<f64> {
        self.interchange.get(&(from, to)).copied()
    }

    /// Targets of the configured switches leaving `mode`.
    pub fn switches_from(&self, mode: ModeId) -> impl Iterator<Item = ModeId> + '_ {
        self.mode_switches
            .iter()
            .filter(move |s| s.from == mode)
            .map(|s| s.to)
    }
}

// ── Network ───────────────────────────────────────────────────────────────────

/// The immutable multimodal graph.
///
/// Do not construct directly; use [`NetworkBuilder`].  After `build()` the
/// network is read-only and `Sync`, so worker threads share it by reference.
#[derive(Debug)]
pub struct Network {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,

    out_start: Vec<u32>,
    out_edges: Vec<EdgeId>,
    in_start:  Vec<u32>,
    in_edges:  Vec<EdgeId>,
}

impl Network {
    /// A network with no nodes or edges.
    pub fn empty() -> Self {
        Self {
            nodes:     Vec::new(),
            edges:     Vec::new(),
            out_start: vec![0],
            out_edges: Vec::new(),
            in_start:  vec![0],
            in_edges:  Vec::new(),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Access ────────────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// Outgoing, non-pruned edges of `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        let start = self.out_start[node.index()] as usize;
        let end   = self.out_start[node.index() + 1] as usize;
        &self.out_edges[start..end]
    }

    /// Incoming, non-pruned edges of `node`.
    #[inline]
    pub fn in_edges(&self, node: NodeId) -> &[EdgeId] {
        let start = self.in_start[node.index()] as usize;
        let end   = self.in_start[node.index() + 1] as usize;
        &self.in_edges[start..end]
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node).len()
    }

    /// `true` if the edge was pruned (empty mode set) and is unreachable.
    #[inline]
    pub fn is_pruned(&self, edge: EdgeId) -> bool {
        self.edge(edge).modes.is_empty()
    }

    /// Position `offset` metres along `edge`, interpolated between its
    /// endpoints.
    pub fn point_on_edge(&self, edge: EdgeId, offset: f64) -> Coord {
        let e = self.edge(edge);
        let a = self.node(e.from).pos;
        let b = self.node(e.to).pos;
        let t = if e.length > 0.0 { offset / e.length } else { 0.0 };
        a.lerp(b, t)
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`Network`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use acc_core::{Coord, ModeRegistry, ModeSet};
/// use acc_network::NetworkBuilder;
///
/// let modes = ModeRegistry::standard();
/// let foot = ModeSet::single(modes.by_name("foot").unwrap().id);
///
/// let mut b = NetworkBuilder::new();
/// let a = b.add_node(Coord::new(0.0, 0.0));
/// let c = b.add_node(Coord::new(100.0, 0.0));
/// b.add_road(a, c, 100.0, 13.9, foot); // both directions, opposites linked
/// let net = b.build().unwrap();
/// assert_eq!(net.edge_count(), 2);
/// ```
#[derive(Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for bulk loads.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
        }
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Coord) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            pos,
            mode_switches: Vec::new(),
            interchange:   FxHashMap::default(),
        });
        id
    }

    pub fn node_pos(&self, id: NodeId) -> Option<Coord> {
        self.nodes.get(id.index()).map(|n| n.pos)
    }

    /// Add a **directed** edge.  Endpoints are validated in `build()`.
    pub fn add_edge(
        &mut self,
        from:      NodeId,
        to:        NodeId,
        length:    f64,
        max_speed: f64,
        modes:     ModeSet,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge {
            id,
            from,
            to,
            modes,
            max_speed,
            length,
            incline:        0.0,
            speed_profile:  Vec::new(),
            opposite:       None,
            crossing_times: Vec::new(),
            timetable:      None,
        });
        id
    }

    /// Add both directions of a two-way road and link them as opposites.
    pub fn add_road(
        &mut self,
        a:         NodeId,
        b:         NodeId,
        length:    f64,
        max_speed: f64,
        modes:     ModeSet,
    ) -> (EdgeId, EdgeId) {
        let ab = self.add_edge(a, b, length, max_speed, modes);
        let ba = self.add_edge(b, a, length, max_speed, modes);
        self.edges[ab.index()].opposite = Some(ba);
        self.edges[ba.index()].opposite = Some(ab);
        (ab, ba)
    }

    /// Like [`add_road`](Self::add_road) with the length taken from the
    /// straight line between the two nodes.
    pub fn add_straight_road(
        &mut self,
        a:         NodeId,
        b:         NodeId,
        max_speed: f64,
        modes:     ModeSet,
    ) -> NetworkResult<(EdgeId, EdgeId)> {
        let pa = self.node_pos(a).ok_or(NetworkError::NodeNotFound(a))?;
        let pb = self.node_pos(b).ok_or(NetworkError::NodeNotFound(b))?;
        Ok(self.add_road(a, b, pa.distance_to(pb), max_speed, modes))
    }

    /// Add a scheduled edge served by `timetable`.
    pub fn add_transit_edge(
        &mut self,
        from:      NodeId,
        to:        NodeId,
        length:    f64,
        modes:     ModeSet,
        timetable: Timetable,
    ) -> EdgeId {
        let id = self.add_edge(from, to, length, 0.0, modes);
        self.edges[id.index()].timetable = Some(timetable);
        id
    }

    fn edge_mut(&mut self, id: EdgeId) -> NetworkResult<&mut Edge> {
        self.edges
            .get_mut(id.index())
            .ok_or(NetworkError::EdgeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> NetworkResult<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(NetworkError::NodeNotFound(id))
    }

    /// Link two existing edges as each other's opposite.
    pub fn set_opposite(&mut self, a: EdgeId, b: EdgeId) -> NetworkResult<()> {
        self.edge_mut(b)?;
        self.edge_mut(a)?.opposite = Some(b);
        self.edge_mut(b)?.opposite = Some(a);
        Ok(())
    }

    pub fn set_incline(&mut self, edge: EdgeId, incline: f64) -> NetworkResult<()> {
        self.edge_mut(edge)?.incline = incline;
        Ok(())
    }

    /// Replace the speed overrides of `edge`.  Sorted by start in `build()`.
    pub fn set_speed_profile(
        &mut self,
        edge:      EdgeId,
        intervals: Vec<SpeedInterval>,
    ) -> NetworkResult<()> {
        self.edge_mut(edge)?.speed_profile = intervals;
        Ok(())
    }

    /// Extra delay for turning from `from` onto `to`.
    pub fn set_crossing_time(&mut self, from: EdgeId, to: EdgeId, secs: f64) -> NetworkResult<()> {
        self.edge_mut(to)?;
        let edge = self.edge_mut(from)?;
        match edge.crossing_times.iter_mut().find(|(e, _)| *e == to) {
            Some(slot) => slot.1 = secs,
            None => edge.crossing_times.push((to, secs)),
        }
        Ok(())
    }

    pub fn set_timetable(&mut self, edge: EdgeId, timetable: Timetable) -> NetworkResult<()> {
        self.edge_mut(edge)?.timetable = Some(timetable);
        Ok(())
    }

    /// Mutable access to a scheduled edge's timetable, for loaders that add
    /// connections one by one.
    pub fn timetable_mut(&mut self, edge: EdgeId) -> NetworkResult<&mut Timetable> {
        Ok(self.edge_mut(edge)?.timetable.get_or_insert_with(Timetable::default))
    }

    pub fn add_mode_switch(&mut self, node: NodeId, from: ModeId, to: ModeId) -> NetworkResult<()> {
        let switch = ModeSwitch { from, to };
        let n = self.node_mut(node)?;
        if !n.mode_switches.contains(&switch) {
            n.mode_switches.push(switch);
        }
        Ok(())
    }

    /// Transfer time at a stop between two lines.  May be called repeatedly
    /// while a timetable is loaded.
    pub fn set_interchange_time(
        &mut self,
        node: NodeId,
        from: LineId,
        to:   LineId,
        secs: f64,
    ) -> NetworkResult<()> {
        self.node_mut(node)?.interchange.insert((from, to), secs);
        Ok(())
    }

    /// Validate relations and produce the immutable [`Network`].
    ///
    /// Time complexity: O(N + E) plus the per-edge profile sorts.
    pub fn build(self) -> NetworkResult<Network> {
        let node_count = self.nodes.len();
        let mut edges  = self.edges;

        for e in &mut edges {
            e.speed_profile.sort_by(|a, b| a.start.total_cmp(&b.start));
        }
        for e in &edges {
            validate_edge(e, &edges, node_count)?;
        }

        // Build CSR row pointers, skipping pruned edges.
        let live: Vec<&Edge> = edges.iter().filter(|e| !e.modes.is_empty()).collect();
        let pruned = edges.len() - live.len();
        if pruned > 0 {
            log::warn!("pruned {pruned} edge(s) without any allowed mode");
        }

        let (out_start, out_edges) = csr(node_count, &live, |e| e.from);
        let (in_start, in_edges)   = csr(node_count, &live, |e| e.to);

        log::debug!(
            "network built: {} nodes, {} edges ({} scheduled)",
            node_count,
            edges.len(),
            edges.iter().filter(|e| e.is_scheduled()).count(),
        );

        Ok(Network {
            nodes: self.nodes,
            edges,
            out_start,
            out_edges,
            in_start,
            in_edges,
        })
    }
}

fn validate_edge(e: &Edge, edges: &[Edge], node_count: usize) -> NetworkResult<()> {
    let invalid = |reason: String| NetworkError::InvalidEdge { edge: e.id, reason };

    for n in [e.from, e.to] {
        if n.index() >= node_count {
            return Err(NetworkError::NodeNotFound(n));
        }
    }
    if !(e.length >= 0.0) || !e.length.is_finite() {
        return Err(invalid(format!("length {} is not a finite non-negative value", e.length)));
    }
    if let Some(o) = e.opposite {
        let opp = edges.get(o.index()).ok_or(NetworkError::EdgeNotFound(o))?;
        if opp.opposite != Some(e.id) || opp.from != e.to || opp.to != e.from {
            return Err(NetworkError::OppositeMismatch { edge: e.id, opposite: o });
        }
    }
    for &(next, secs) in &e.crossing_times {
        let target = edges.get(next.index()).ok_or(NetworkError::EdgeNotFound(next))?;
        if target.from != e.to {
            return Err(invalid(format!("crossing time targets {next}, which does not leave {}", e.to)));
        }
        if !(secs >= 0.0) {
            return Err(invalid(format!("negative crossing time {secs} onto {next}")));
        }
    }
    for iv in &e.speed_profile {
        if !(iv.start < iv.end) || !(iv.speed > 0.0) {
            return Err(invalid(format!(
                "speed interval [{}, {}) at {} m/s is empty or not positive",
                iv.start, iv.end, iv.speed
            )));
        }
    }
    if let Some(c) = e.timetable.as_ref().and_then(Timetable::first_inverted) {
        return Err(NetworkError::InvalidTimetable {
            edge:   e.id,
            reason: format!("trip {} arrives at {} before departing at {}", c.trip, c.arrival, c.departure),
        });
    }
    Ok(())
}

/// CSR row pointer + edge list keyed by `key(edge)`.
fn csr(node_count: usize, live: &[&Edge], key: impl Fn(&Edge) -> NodeId) -> (Vec<u32>, Vec<EdgeId>) {
    let mut start = vec![0u32; node_count + 1];
    for e in live {
        start[key(e).index() + 1] += 1;
    }
    for i in 1..=node_count {
        start[i] += start[i - 1];
    }

    let mut cursor = start.clone();
    let mut list   = vec![EdgeId(0); live.len()];
    for e in live {
        let slot = &mut cursor[key(e).index()];
        list[*slot as usize] = e.id;
        *slot += 1;
    }
    debug_assert_eq!(start[node_count] as usize, live.len());
    (start, list)
}
