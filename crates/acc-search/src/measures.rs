//! Derived per-label measures.
//!
//! Measures are built once per label from the predecessor's measures and the
//! step just taken, so a label never needs to walk its chain to know how
//! many interchanges or how much money the path has cost so far.

use acc_core::{LineId, Mode, TripId};

/// Accumulated auxiliary measures of a partial path.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measures {
    /// Number of changes between transit lines.
    pub interchanges:     u32,
    /// Line of the most recently ridden trip, kept while walking between stops.
    pub last_line:        Option<LineId>,
    pub last_trip:        Option<TripId>,
    pub price:            f64,
    pub kcal:             f64,
    /// Grams of CO2.
    pub co2:              f64,
    /// Seconds spent waiting for a departure.
    pub waiting_time:     f64,
    /// Seconds spent aboard transit vehicles.
    pub transit_time:     f64,
    /// Seconds of transfer time at stops.
    pub interchange_time: f64,
}

/// One hop of a path as seen by the measure builder.
#[derive(Copy, Clone, Debug)]
pub struct Step<'a> {
    pub mode:             &'a Mode,
    /// Metres covered on this hop.
    pub distance:         f64,
    /// Seconds in motion on this hop.
    pub ride_time:        f64,
    pub wait_time:        f64,
    pub interchange_time: f64,
    /// The boarded `(line, trip)` on scheduled hops.
    pub boarded:          Option<(LineId, TripId)>,
}

impl Measures {
    /// Measures after taking `step` from a path whose measures are `self`.
    pub fn after(&self, step: &Step<'_>) -> Self {
        let km   = step.distance / 1000.0;
        let mut m = Self {
            price:            self.price + km * step.mode.price_per_km,
            kcal:             self.kcal + km * step.mode.kcal_per_km,
            co2:              self.co2 + km * step.mode.co2_per_km,
            waiting_time:     self.waiting_time + step.wait_time,
            interchange_time: self.interchange_time + step.interchange_time,
            ..*self
        };
        if let Some((line, trip)) = step.boarded {
            if self.last_line.is_some_and(|prev| prev != line) {
                m.interchanges += 1;
            }
            m.last_line     = Some(line);
            m.last_trip     = Some(trip);
            m.transit_time += step.ride_time;
        }
        m
    }

    /// Remove the distance-proportional costs of `metres` not travelled in
    /// `mode`.  Used when a path ends part-way along its last edge.
    pub(crate) fn trimmed(&self, mode: &Mode, metres: f64) -> Self {
        let km = metres / 1000.0;
        Self {
            price: (self.price - km * mode.price_per_km).max(0.0),
            kcal:  (self.kcal - km * mode.kcal_per_km).max(0.0),
            co2:   (self.co2 - km * mode.co2_per_km).max(0.0),
            ..*self
        }
    }
}
