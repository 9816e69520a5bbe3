//! Directed edges and their time-dependent travel times.

use acc_core::{EdgeId, ModeSet, NodeId};

use crate::Timetable;

/// A speed override valid during `[start, end)` (seconds after midnight).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedInterval {
    pub start: f64,
    pub end:   f64,
    /// Speed in m/s.
    pub speed: f64,
}

impl SpeedInterval {
    #[inline]
    pub fn covers(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// A directed edge of the network.
///
/// Built once by [`NetworkBuilder`](crate::NetworkBuilder) and never mutated
/// afterwards.
#[derive(Clone, Debug)]
pub struct Edge {
    pub id:             EdgeId,
    pub from:           NodeId,
    pub to:             NodeId,
    /// Modes allowed on this edge.  Empty sets are pruned from adjacency.
    pub modes:          ModeSet,
    /// Free-flow speed in m/s.
    pub max_speed:      f64,
    /// Geometry length in metres.
    pub length:         f64,
    /// Rise over run; informational only.
    pub incline:        f64,
    /// Speed overrides sorted by `start`.  First covering interval wins.
    pub speed_profile:  Vec<SpeedInterval>,
    /// The edge running between the same nodes in the other direction.
    pub opposite:       Option<EdgeId>,
    /// Extra seconds spent turning from this edge onto the given successor.
    pub crossing_times: Vec<(EdgeId, f64)>,
    /// Present on scheduled (public-transport) edges only.
    pub timetable:      Option<Timetable>,
}

impl Edge {
    /// Speed in m/s at time `t`: the first covering override, else free flow.
    pub fn speed_at(&self, t: f64) -> f64 {
        self.speed_profile
            .iter()
            .find(|iv| iv.covers(t))
            .map_or(self.max_speed, |iv| iv.speed)
    }

    /// Seconds needed to traverse `length` metres of this edge entering at
    /// `t`, for a mode whose own top speed is `mode_speed`.
    ///
    /// Returns `f64::INFINITY` when the effective speed is not positive.
    pub fn travel_time_over(&self, length: f64, mode_speed: f64, t: f64) -> f64 {
        let speed = mode_speed.min(self.speed_at(t));
        if speed > 0.0 {
            length / speed
        } else {
            f64::INFINITY
        }
    }

    /// Seconds needed to traverse the whole edge entering at `t`.
    #[inline]
    pub fn travel_time(&self, mode_speed: f64, t: f64) -> f64 {
        self.travel_time_over(self.length, mode_speed, t)
    }

    /// Intersection delay for turning from this edge onto `next`.
    pub fn crossing_time(&self, next: EdgeId) -> f64 {
        self.crossing_times
            .iter()
            .find(|(e, _)| *e == next)
            .map_or(0.0, |&(_, secs)| secs)
    }

    #[inline]
    pub fn is_scheduled(&self) -> bool {
        self.timetable.is_some()
    }
}
