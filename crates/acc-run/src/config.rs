//! Run configuration.
//!
//! Typically deserialized from a file by the application (with the `serde`
//! feature) and handed to [`RunBuilder`](crate::RunBuilder), which resolves
//! and validates it before any worker starts.

use acc_core::{parse_clock, CategoryId, ObjectId};
use acc_search::{SearchBounds, WeightConfig};

use crate::RunResult;

/// One destination category: its bounds and its members.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryConfig {
    pub id:      CategoryId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bounds:  SearchBounds,
    pub members: Vec<ObjectId>,
}

/// Parameters shared by every origin search of a run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    pub weight:              WeightConfig,
    /// Bounds of the single result set.  Ignored when `categories` is
    /// non-empty.
    pub bounds:              SearchBounds,
    /// Seconds after midnight.
    pub start_time:          f64,
    /// Mode names resolved against the run's registry.
    pub modes:               Vec<String>,
    /// Worker count.  `None` uses all logical cores.
    pub threads:             Option<usize>,
    /// Transfer seconds where a stop has no specific entry.
    pub default_interchange: f64,
    pub categories:          Vec<CategoryConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            weight:              WeightConfig::default(),
            bounds:              SearchBounds::default(),
            start_time:          0.0,
            modes:               vec!["foot".to_owned()],
            threads:             None,
            default_interchange: 120.0,
            categories:          Vec::new(),
        }
    }
}

impl RunConfig {
    /// Set the start time from an `HH:MM[:SS]` string.
    pub fn with_start_clock(mut self, clock: &str) -> RunResult<Self> {
        self.start_time = parse_clock(clock)?;
        Ok(self)
    }

    pub fn with_modes<S: Into<String>>(mut self, modes: impl IntoIterator<Item = S>) -> Self {
        self.modes = modes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_bounds(mut self, bounds: SearchBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_weight(mut self, weight: WeightConfig) -> Self {
        self.weight = weight;
        self
    }
}
