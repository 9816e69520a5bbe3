//! Fluent builder for an [`AccessRun`].

use std::sync::Arc;

use acc_core::ModeRegistry;
use acc_network::{LocatedObject, Network, ObjectLayer};
use acc_search::{DestinationCategories, SearchEngine, SearchSettings};

use crate::{AccessRun, RunConfig, RunError, RunResult};

/// Fluent builder for [`AccessRun`].
///
/// # Required inputs
///
/// - [`Network`] — built with [`acc_network::NetworkBuilder`]
/// - [`ModeRegistry`] — the modes the network was built against
/// - origins and destinations, each located on a network edge
///
/// # Optional inputs (have defaults)
///
/// | Method         | Default                 |
/// |----------------|-------------------------|
/// | `.config(c)`   | `RunConfig::default()`  |
///
/// # Example
///
/// ```rust,ignore
/// let run = RunBuilder::new(network, ModeRegistry::standard(), origins, destinations)
///     .config(RunConfig::default().with_modes(["foot", "transit"]))
///     .build()?;
/// let summary = run.run(&mut CsvSink::new(writer))?;
/// ```
pub struct RunBuilder {
    network:      Network,
    modes:        ModeRegistry,
    origins:      Vec<LocatedObject>,
    destinations: Vec<LocatedObject>,
    config:       RunConfig,
}

impl RunBuilder {
    pub fn new(
        network:      Network,
        modes:        ModeRegistry,
        origins:      Vec<LocatedObject>,
        destinations: Vec<LocatedObject>,
    ) -> Self {
        Self {
            network,
            modes,
            origins,
            destinations,
            config: RunConfig::default(),
        }
    }

    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate every input and assemble the run.
    ///
    /// # Errors
    ///
    /// - [`RunError::Config`] for a zero thread count or a category member
    ///   that is not among the destinations.
    /// - [`RunError::Core`] for unknown mode names.
    /// - [`RunError::Network`] for objects on unknown edges.
    /// - [`RunError::Search`] for invalid weights, bounds or categories.
    pub fn build(self) -> RunResult<AccessRun> {
        let cfg = self.config;

        let threads = match cfg.threads {
            Some(0) => return Err(RunError::Config("threads must be at least 1".into())),
            Some(n) => n,
            None => rayon::current_num_threads(),
        };

        let modes = self.modes.resolve(&cfg.modes)?;
        let mut settings = SearchSettings::new(modes)
            .with_weight(cfg.weight.to_function()?)
            .with_bounds(cfg.bounds)
            .with_start_time(cfg.start_time)
            .with_default_interchange(cfg.default_interchange);

        let origins      = ObjectLayer::new(&self.network, self.origins)?;
        let destinations = ObjectLayer::new(&self.network, self.destinations)?;

        if !cfg.categories.is_empty() {
            let mut plan = DestinationCategories::new();
            for cat in &cfg.categories {
                plan.add_category(cat.id, cat.bounds)?;
                for &member in &cat.members {
                    if !destinations.iter().any(|d| d.id == member) {
                        return Err(RunError::Config(format!(
                            "category {} lists unknown destination {member}",
                            cat.id
                        )));
                    }
                    plan.assign(member, cat.id)?;
                }
            }
            settings = settings.with_categories(Arc::new(plan));
        }

        // Probe once here; each worker builds its own engine later.
        let intermodal = SearchEngine::new(&self.network, &self.modes, settings.clone())?
            .is_intermodal();

        log::debug!(
            "run built: {} origins, {} destinations, modes [{}], {} threads, {}",
            origins.len(),
            destinations.len(),
            self.modes.names(modes),
            threads,
            if intermodal { "intermodal" } else { "single-mode" },
        );

        Ok(AccessRun {
            network: self.network,
            modes: self.modes,
            origins,
            destinations,
            settings,
            threads,
        })
    }
}
