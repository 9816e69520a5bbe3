//! Route weight functions.
//!
//! A weight function defines the total order in which labels are settled
//! and the "strictly better" test used during relaxation.  Every ordering
//! here is lexicographic over a few derived numbers, so each function maps a
//! [`LabelCost`] onto a [`CostKey`] and keys compare with `f64::total_cmp`.
//! That makes every comparator total, anti-symmetric and transitive by
//! construction, NaNs included.
//!
//! | Variant              | Key                                                    |
//! |----------------------|--------------------------------------------------------|
//! | `TravelTimeModes`    | travel time, then more remaining modes first           |
//! | `PriceTravelTime`    | price, then travel time                                |
//! | `InterchangePenalty` | `tt · factor^interchanges`, then travel time           |
//! | `MaxInterchanges`    | over the interchange ceiling last, then travel time    |
//!
//! Distance is the final tie-break of every key.

use std::cmp::Ordering;

use acc_core::ModeSet;

use crate::measures::{Measures, Step};
use crate::{SearchError, SearchResult};

// ── LabelCost / CostKey ───────────────────────────────────────────────────────

/// The numbers a weight function may look at.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LabelCost {
    pub travel_time:     f64,
    pub distance:        f64,
    pub price:           f64,
    pub interchanges:    u32,
    /// Size of the label's available mode set.
    pub remaining_modes: u32,
}

/// Lexicographic sort key produced by [`WeightFunction::key`].
#[derive(Copy, Clone, Debug)]
pub struct CostKey([f64; 3]);

impl CostKey {
    pub fn parts(&self) -> [f64; 3] {
        self.0
    }
}

impl Ord for CostKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0[0]
            .total_cmp(&other.0[0])
            .then_with(|| self.0[1].total_cmp(&other.0[1]))
            .then_with(|| self.0[2].total_cmp(&other.0[2]))
    }
}

impl PartialOrd for CostKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CostKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CostKey {}

// ── WeightFunction ────────────────────────────────────────────────────────────

/// The active route weighting of a run.  Chosen once and shared by all
/// workers.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum WeightFunction {
    #[default]
    TravelTimeModes,
    PriceTravelTime,
    /// Travel time multiplied by `factor` once per interchange.
    InterchangePenalty { factor: f64 },
    /// Travel time, with any path above `max` interchanges ranked after
    /// every path at or below it.
    MaxInterchanges { max: u32 },
}

impl WeightFunction {
    pub fn key(&self, c: &LabelCost) -> CostKey {
        match *self {
            WeightFunction::TravelTimeModes => CostKey([
                c.travel_time,
                f64::from(ModeSet::CAPACITY as u32 - c.remaining_modes.min(ModeSet::CAPACITY as u32)),
                c.distance,
            ]),
            WeightFunction::PriceTravelTime => CostKey([c.price, c.travel_time, c.distance]),
            WeightFunction::InterchangePenalty { factor } => CostKey([
                c.travel_time * factor.powi(c.interchanges.min(i32::MAX as u32) as i32),
                c.travel_time,
                c.distance,
            ]),
            WeightFunction::MaxInterchanges { max } => CostKey([
                if c.interchanges > max { 1.0 } else { 0.0 },
                c.travel_time,
                c.distance,
            ]),
        }
    }

    /// Total order over two label costs.
    #[inline]
    pub fn compare(&self, a: &LabelCost, b: &LabelCost) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }

    /// `true` when keys are ordered by travel time first, so a popped label
    /// over the time bound means every remaining label is over it too.
    pub fn is_time_ordered(&self) -> bool {
        matches!(self, WeightFunction::TravelTimeModes)
    }

    /// Measures of a new label built from its predecessor's.
    ///
    /// All variants share one measure set; the interchange counter is the
    /// only one that depends on predecessor state (the last trip ridden).
    pub fn build_measures(&self, prev: &Measures, step: &Step<'_>) -> Measures {
        prev.after(step)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeightFunction::TravelTimeModes => "travel_time",
            WeightFunction::PriceTravelTime => "price",
            WeightFunction::InterchangePenalty { .. } => "interchange_penalty",
            WeightFunction::MaxInterchanges { .. } => "max_interchanges",
        }
    }

    pub fn validate(&self) -> SearchResult<()> {
        if let WeightFunction::InterchangePenalty { factor } = *self {
            if !factor.is_finite() || factor < 1.0 {
                return Err(SearchError::InvalidWeight(format!(
                    "interchange penalty factor must be finite and >= 1, got {factor}"
                )));
            }
        }
        Ok(())
    }
}

// ── WeightConfig ──────────────────────────────────────────────────────────────

/// Weight-function selector as it appears in a configuration file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeightKind {
    #[default]
    TravelTime,
    Price,
    InterchangePenalty,
    MaxInterchanges,
}

/// Flat, file-friendly form of a [`WeightFunction`].  Parameters that the
/// chosen kind needs must be present.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeightConfig {
    pub kind:             WeightKind,
    pub factor:           Option<f64>,
    pub max_interchanges: Option<u32>,
}

impl WeightConfig {
    pub fn new(kind: WeightKind) -> Self {
        Self { kind, ..Self::default() }
    }

    pub fn to_function(&self) -> SearchResult<WeightFunction> {
        let f = match self.kind {
            WeightKind::TravelTime => WeightFunction::TravelTimeModes,
            WeightKind::Price => WeightFunction::PriceTravelTime,
            WeightKind::InterchangePenalty => WeightFunction::InterchangePenalty {
                factor: self.factor.ok_or_else(|| {
                    SearchError::InvalidWeight("interchange_penalty needs 'factor'".into())
                })?,
            },
            WeightKind::MaxInterchanges => WeightFunction::MaxInterchanges {
                max: self.max_interchanges.ok_or_else(|| {
                    SearchError::InvalidWeight("max_interchanges needs 'max_interchanges'".into())
                })?,
            },
        };
        f.validate()?;
        Ok(f)
    }
}
