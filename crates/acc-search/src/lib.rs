//! `acc-search` — the routing core of the accessibility engine.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`weight`]     | `WeightFunction`, `WeightConfig`, `LabelCost`, `CostKey`        |
//! | [`measures`]   | `Measures`, `Step` — derived per-label quantities               |
//! | [`label`]      | `PathLabel`, `LabelId`, `LabelArena`                            |
//! | [`bounds`]     | `SearchBounds`                                                  |
//! | [`store`]      | `DestinationStore` (single / multi-category), `DestinationCategories` |
//! | [`projection`] | `AccessRecord`, partial-edge correction                         |
//! | [`search`]     | `SearchEngine`, `SearchSettings`, `SearchOutcome`, `SearchStats` |
//! | [`error`]      | `SearchError`, `SearchResult<T>`                                |
//!
//! # Usage
//!
//! One [`SearchEngine`] per worker thread.  The engine borrows the network
//! and mode registry immutably and keeps its own queue, table and arena,
//! which it reuses between origins:
//!
//! ```ignore
//! let mut engine = SearchEngine::new(&network, &modes, settings)?;
//! for origin in origins.iter() {
//!     let outcome = engine.search(origin, &destinations);
//!     sink(outcome.records);
//! }
//! ```
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on config and result types |

pub mod bounds;
pub mod error;
pub mod label;
pub mod measures;
pub mod projection;
pub mod search;
pub mod store;
pub mod weight;

#[cfg(test)]
mod tests;

pub use bounds::SearchBounds;
pub use error::{SearchError, SearchResult};
pub use label::{LabelArena, LabelId, PathLabel};
pub use measures::{Measures, Step};
pub use projection::{AccessRecord, Candidate};
pub use search::{SearchEngine, SearchOutcome, SearchSettings, SearchStats};
pub use store::{DestinationCategories, DestinationStore, MultiStore, SingleStore};
pub use weight::{CostKey, LabelCost, WeightConfig, WeightFunction, WeightKind};
