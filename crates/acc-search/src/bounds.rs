//! Per-search termination thresholds.

use crate::{SearchError, SearchResult};

/// Bound parameters of one search.  A value of `0` (or `false`) means
/// "not set".
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchBounds {
    /// Stop once this many distinct destinations are found.
    pub max_destinations: usize,
    /// Hard cap on travel time in seconds.
    pub max_travel_time:  f64,
    /// Hard cap on distance in metres.
    pub max_distance:     f64,
    /// Stop once the values of found destinations add up to this.
    pub max_value:        f64,
    /// Keep only the single best destination.
    pub shortest_only:    bool,
}

impl SearchBounds {
    /// No bounds at all: the search explores everything reachable.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_destinations(mut self, n: usize) -> Self {
        self.max_destinations = n;
        self
    }

    pub fn with_max_travel_time(mut self, secs: f64) -> Self {
        self.max_travel_time = secs;
        self
    }

    pub fn with_max_distance(mut self, metres: f64) -> Self {
        self.max_distance = metres;
        self
    }

    pub fn with_max_value(mut self, value: f64) -> Self {
        self.max_value = value;
        self
    }

    pub fn with_shortest_only(mut self, on: bool) -> Self {
        self.shortest_only = on;
        self
    }

    #[inline]
    pub fn travel_time_cap(&self) -> Option<f64> {
        (self.max_travel_time > 0.0).then_some(self.max_travel_time)
    }

    #[inline]
    pub fn distance_cap(&self) -> Option<f64> {
        (self.max_distance > 0.0).then_some(self.max_distance)
    }

    #[inline]
    pub fn value_cap(&self) -> Option<f64> {
        (self.max_value > 0.0).then_some(self.max_value)
    }

    #[inline]
    pub fn count_cap(&self) -> Option<usize> {
        (self.max_destinations > 0).then_some(self.max_destinations)
    }

    /// `true` if `travel_time` and `distance` are within the hard caps.
    pub fn admits(&self, travel_time: f64, distance: f64) -> bool {
        self.travel_time_cap().is_none_or(|cap| travel_time <= cap)
            && self.distance_cap().is_none_or(|cap| distance <= cap)
    }

    pub fn validate(&self) -> SearchResult<()> {
        for (name, v) in [
            ("max_travel_time", self.max_travel_time),
            ("max_distance", self.max_distance),
            ("max_value", self.max_value),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SearchError::InvalidBound {
                    name,
                    reason: format!("{v} is not a finite non-negative number"),
                });
            }
        }
        Ok(())
    }
}
