//! Scheduled connections on a public-transport edge.
//!
//! One [`Connection`] is one vehicle trip traversing the edge: it leaves the
//! edge's start node at `departure` and reaches the end node at `arrival`.
//! Connections are kept sorted by departure so "earliest departure at or
//! after `t`" is a binary search.

use acc_core::{LineId, TripId};

/// A single scheduled traversal of an edge.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    pub trip:      TripId,
    pub line:      LineId,
    /// Departure from the edge's start node, seconds after midnight.
    pub departure: f64,
    /// Arrival at the edge's end node, seconds after midnight.
    pub arrival:   f64,
}

impl Connection {
    #[inline]
    pub fn ride_time(&self) -> f64 {
        self.arrival - self.departure
    }
}

/// Connections of one edge, sorted by `(departure, trip)`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timetable {
    connections: Vec<Connection>,
}

impl Timetable {
    pub fn new(mut connections: Vec<Connection>) -> Self {
        connections.sort_by(|a, b| {
            a.departure
                .total_cmp(&b.departure)
                .then(a.trip.cmp(&b.trip))
        });
        Self { connections }
    }

    /// Add one connection, keeping the order.  Used by incremental loaders.
    pub fn insert(&mut self, connection: Connection) {
        let at = self.connections.partition_point(|c| {
            c.departure < connection.departure
                || (c.departure == connection.departure && c.trip <= connection.trip)
        });
        self.connections.insert(at, connection);
    }

    /// All connections departing at or after `t`, earliest first.
    pub fn departures_from(&self, t: f64) -> &[Connection] {
        let start = self.connections.partition_point(|c| c.departure < t);
        &self.connections[start..]
    }

    /// Earliest connection departing at or after `t`.
    #[inline]
    pub fn next_departure(&self, t: f64) -> Option<&Connection> {
        self.departures_from(t).first()
    }

    /// The connection of `trip` departing at or after `t`, if the trip
    /// serves this edge.
    pub fn connection_of(&self, trip: TripId, t: f64) -> Option<&Connection> {
        self.departures_from(t).iter().find(|c| c.trip == trip)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// First connection whose arrival precedes its departure.
    pub(crate) fn first_inverted(&self) -> Option<&Connection> {
        self.connections.iter().find(|c| !(c.arrival >= c.departure))
    }
}
