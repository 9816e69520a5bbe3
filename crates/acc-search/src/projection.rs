//! Turning labels into origin → destination records.
//!
//! A label covers its whole edge, but the origin and the destination sit
//! part-way along the first and last edges.  Projection trims the
//! untravelled remainder off distance, time and distance-based costs.
//!
//! ```text
//!   edge.from ──────────── entry ──────── dest ──────── edge.to
//!                           │◄──────────────────────────►│  travelled
//!                                          │◄───────────►│  remainder
//! ```

use acc_core::{CategoryId, EdgeId, LineId, ModeRegistry, ModeSet, ObjectId};
use acc_network::{Edge, LocatedObject};

use crate::label::{LabelArena, LabelId};
use crate::measures::Measures;
use crate::weight::{CostKey, LabelCost, WeightFunction};

/// Slack for offsets that should coincide but went through float arithmetic.
const OFFSET_EPS: f64 = 1e-9;

/// A destination reached by some label, with corrected costs.  Held by the
/// destination store until the search ends.
#[derive(Copy, Clone, Debug)]
pub struct Candidate {
    pub destination: ObjectId,
    pub value:       f64,
    pub label:       LabelId,
    pub distance:    f64,
    pub travel_time: f64,
    pub measures:    Measures,
    pub key:         CostKey,
}

/// One normalized origin → destination result.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessRecord {
    pub origin:      ObjectId,
    pub destination: ObjectId,
    /// Set by multi-category stores.
    pub category:    Option<CategoryId>,
    pub distance:    f64,
    pub travel_time: f64,
    /// The destination's value.
    pub value:       f64,
    pub measures:    Measures,
    pub modes:       ModeSet,
    pub lines:       Vec<LineId>,
    pub path:        Vec<EdgeId>,
}

/// Position of `dest` measured from the start of `edge`, if `dest` sits on
/// `edge` or on its opposite.
pub fn position_on(edge: &Edge, dest: &LocatedObject) -> Option<f64> {
    if dest.edge == edge.id {
        Some(dest.offset)
    } else if edge.opposite == Some(dest.edge) {
        Some((edge.length - dest.offset).max(0.0))
    } else {
        None
    }
}

/// Project label `id` onto `dest` at `position` along the label's edge.
///
/// Returns `None` when the destination lies behind the point where the path
/// entered the edge.
pub fn project(
    arena:    &LabelArena,
    id:       LabelId,
    edge:     &Edge,
    modes:    &ModeRegistry,
    weight:   &WeightFunction,
    dest:     &LocatedObject,
    position: f64,
) -> Option<Candidate> {
    let label = arena.get(id);
    let entry = label.start_offset;
    if position + OFFSET_EPS < entry {
        return None;
    }

    let remainder = (edge.length - position).max(0.0);
    let travelled = edge.length - entry;
    let fraction  = if travelled > 0.0 { (remainder / travelled).min(1.0) } else { 0.0 };

    let distance    = (label.distance - remainder).max(0.0);
    let travel_time = (label.travel_time - label.ride_time * fraction).max(0.0);
    let measures    = label.measures.trimmed(modes.get(label.mode), remainder);

    let cost = LabelCost {
        travel_time,
        distance,
        price:           measures.price,
        interchanges:    measures.interchanges,
        remaining_modes: label.modes.len(),
    };

    Some(Candidate {
        destination: dest.id,
        value:       dest.weight,
        label:       id,
        distance,
        travel_time,
        measures,
        key:         weight.key(&cost),
    })
}

/// Build the final record for `candidate`, reconstructing its path.
pub fn finish(
    arena:     &LabelArena,
    candidate: &Candidate,
    origin:    ObjectId,
    category:  Option<CategoryId>,
) -> AccessRecord {
    let label = arena.get(candidate.label);
    AccessRecord {
        origin,
        destination: candidate.destination,
        category,
        distance:    candidate.distance,
        travel_time: candidate.travel_time,
        value:       candidate.value,
        measures:    candidate.measures,
        modes:       label.used_modes,
        lines:       arena.lines(candidate.label),
        path:        arena.path(candidate.label),
    }
}
