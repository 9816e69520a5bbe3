//! `acc-network` — the immutable multimodal graph searched by the engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`network`]   | `Network` (node/edge arena + CSR adjacency), `NetworkBuilder`, `Node` |
//! | [`edge`]      | `Edge`, `SpeedInterval`, time-dependent travel times       |
//! | [`timetable`] | `Timetable`, `Connection` — scheduled connections per edge |
//! | [`objects`]   | `LocatedObject`, `ObjectLayer` — origins/destinations on edges |
//! | [`error`]     | `NetworkError`, `NetworkResult<T>`                         |
//!
//! Nodes and edges live in flat `Vec`s addressed by `NodeId`/`EdgeId`;
//! relations between them (endpoints, opposite edge, crossing times) are
//! stored as indices, so the graph has no owning cycles and can be shared
//! read-only across worker threads.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on plain data types.       |

pub mod edge;
pub mod error;
pub mod network;
pub mod objects;
pub mod timetable;


pub use edge::{Edge, SpeedInterval};
pub use error::{NetworkError, NetworkResult};
pub use network::{ModeSwitch, Network, NetworkBuilder, Node};
pub use objects::{LocatedObject, ObjectLayer};
pub use timetable::{Connection, Timetable};
