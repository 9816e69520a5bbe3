//! `acc-run` — runs one search per origin across a worker pool.
//!
//! # Run lifecycle
//!
//! [`RunBuilder::build`]:
//!
//! 1. Resolves mode names to a `ModeSet`, the weight config to a
//!    `WeightFunction` and categories to `DestinationCategories`.
//! 2. Locates origins and destinations on the network as `ObjectLayer`s.
//! 3. Builds one `SearchEngine` to reject bad settings up front.
//!
//! [`AccessRun::run`]:
//!
//! 1. Starts a rayon pool with `threads` workers.
//! 2. Each worker claims the next origin index from a shared cursor and
//!    searches it with its own engine.
//! 3. Each `OriginReport` goes to the `ResultSink` behind a mutex.
//! 4. `ResultSink::on_run_end` receives the `RunSummary`.
//!
//! A panic inside one origin's search marks that origin failed.  A sink
//! error aborts the run.
//!
//! # Cargo features
//!
//! | Feature | Effect                                                   |
//! |---------|----------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on config and reports. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use acc_core::ModeRegistry;
//! use acc_run::{CollectingSink, RunBuilder, RunConfig};
//!
//! let run = RunBuilder::new(network, ModeRegistry::standard(), origins, destinations)
//!     .config(RunConfig::default().with_threads(4))
//!     .build()?;
//! let mut sink = CollectingSink::new();
//! let summary = run.run(&mut sink)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod runner;
pub mod sink;


pub use builder::RunBuilder;
pub use config::{CategoryConfig, RunConfig};
pub use error::{RunError, RunResult};
pub use runner::{AccessRun, RunStatus, RunSummary};
pub use sink::{CollectingSink, NoopSink, OriginReport, OriginStatus, ResultSink, SinkError};
