//! Path labels and the per-search label arena.
//!
//! A label records "reached `node` via `edge` at this cost" and points at its
//! predecessor by [`LabelId`].  Labels are pushed into a [`LabelArena`] and
//! never mutated, so a replaced label stays valid for every path that already
//! extends it.

use acc_core::{EdgeId, LineId, ModeId, ModeSet, NodeId, TripId};

use crate::measures::Measures;
use crate::weight::LabelCost;

/// Index of a label in its search's [`LabelArena`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct LabelId(pub u32);

impl LabelId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Search state of one partial path.
#[derive(Copy, Clone, Debug)]
pub struct PathLabel {
    /// `None` for the seeds placed on the origin's edge.
    pub prev:             Option<LabelId>,
    /// End node of `edge`.
    pub node:             NodeId,
    pub edge:             EdgeId,
    /// Mode used on `edge`.
    pub mode:             ModeId,
    /// Modes still available to the path.
    pub modes:            ModeSet,
    /// Modes used so far.
    pub used_modes:       ModeSet,
    pub distance:         f64,
    pub travel_time:      f64,
    /// Seconds added by this label: crossing, transfer, waiting and riding.
    pub edge_time:        f64,
    /// Seconds in motion on the traversed part of `edge`.
    pub ride_time:        f64,
    /// Transfer seconds incurred at the predecessor node.
    pub interchange_time: f64,
    pub wait_time:        f64,
    /// Seeded on the opposite of the origin's edge.
    pub via_opposite:     bool,
    /// Where along `edge` the path entered it: the origin offset for seeds,
    /// `0` otherwise.
    pub start_offset:     f64,
    /// Line and trip ridden on `edge`, for scheduled edges only.
    pub line:             Option<LineId>,
    pub trip:             Option<TripId>,
    /// A zero-cost change of mode at `node` rather than a traversal.
    pub switched:         bool,
    pub measures:         Measures,
}

impl PathLabel {
    pub fn cost(&self) -> LabelCost {
        LabelCost {
            travel_time:     self.travel_time,
            distance:        self.distance,
            price:           self.measures.price,
            interchanges:    self.measures.interchanges,
            remaining_modes: self.modes.len(),
        }
    }

    #[inline]
    pub fn is_seed(&self) -> bool {
        self.prev.is_none()
    }
}

/// Append-only label storage for one search.  Cleared, not reallocated,
/// between origins.
#[derive(Default)]
pub struct LabelArena {
    labels: Vec<PathLabel>,
}

impl LabelArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: PathLabel) -> LabelId {
        let id = LabelId(self.labels.len() as u32);
        self.labels.push(label);
        id
    }

    #[inline]
    pub fn get(&self, id: LabelId) -> &PathLabel {
        &self.labels[id.index()]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (LabelId, &PathLabel)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (LabelId(i as u32), l))
    }

    /// Labels from `id` back to its seed, last first.
    pub fn chain(&self, id: LabelId) -> impl Iterator<Item = &PathLabel> + '_ {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let label = self.get(next?);
            next = label.prev;
            Some(label)
        })
    }

    /// Edges traversed by the path ending at `id`, origin first.
    pub fn path(&self, id: LabelId) -> Vec<EdgeId> {
        let mut edges: Vec<EdgeId> = self
            .chain(id)
            .filter(|l| !l.switched)
            .map(|l| l.edge)
            .collect();
        edges.reverse();
        edges
    }

    /// Lines ridden along the path, in boarding order, consecutive
    /// duplicates collapsed.
    pub fn lines(&self, id: LabelId) -> Vec<LineId> {
        let mut lines: Vec<LineId> = self.chain(id).filter_map(|l| l.line).collect();
        lines.reverse();
        lines.dedup();
        lines
    }
}
