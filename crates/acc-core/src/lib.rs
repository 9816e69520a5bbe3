//! `acc-core` — foundational types for the accessibility engine.
//!
//! Every other `acc-*` crate depends on this one.  It has no `acc-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module    | Contents                                                    |
//! |-----------|-------------------------------------------------------------|
//! | [`ids`]   | `NodeId`, `EdgeId`, `ObjectId`, `LineId`, `TripId`, `CategoryId` |
//! | [`geo`]   | `Coord` (projected metres)                                  |
//! | [`time`]  | Seconds-of-day helpers, `parse_clock`                       |
//! | [`mode`]  | `ModeId`, `ModeSet`, `Mode`, `ModeRegistry`                 |
//! | [`error`] | `CoreError`, `CoreResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::Coord;
pub use ids::{CategoryId, EdgeId, LineId, NodeId, ObjectId, TripId};
pub use mode::{Mode, ModeId, ModeRegistry, ModeSet};
pub use time::{format_clock, parse_clock, SECONDS_PER_DAY};
