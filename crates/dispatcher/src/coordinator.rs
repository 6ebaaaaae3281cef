//! Coordinator - owns the routes and runs one chain per incoming batch

use tracing::{debug, info, instrument, warn};

use contracts::{
    ContractError, Destination, EventBatch, FanoutConfig, OutputChain, TagFilter,
};

use crate::chain::{CopyMode, DispatchChain};
use crate::error::DispatcherError;
use crate::metrics::MetricsSnapshot;
use crate::registry::DestinationRegistry;
use crate::route::Route;
use crate::tag_rule::TagRule;

/// Fan-out group: ordered destinations with their tag rules
#[derive(Debug, Default)]
pub struct Coordinator {
    routes: Vec<Route>,
    copy_mode: CopyMode,
}

impl Coordinator {
    /// Create an empty coordinator
    pub fn new(copy_mode: CopyMode) -> Self {
        Self {
            routes: Vec::new(),
            copy_mode,
        }
    }

    /// Build the routes described by `config`
    ///
    /// # Errors
    /// - `MissingStoreType` if a store has no type identifier
    /// - `UnknownDestinationType` if no factory is registered for it
    /// - `DestinationCreation` if the factory rejects the store settings
    #[instrument(
        name = "coordinator_configure",
        skip(config, registry),
        fields(stores = config.stores.len(), deep_copy = config.deep_copy)
    )]
    pub fn configure(
        config: &FanoutConfig,
        registry: &DestinationRegistry,
    ) -> Result<Self, DispatcherError> {
        let mut coordinator = Self::new(CopyMode::from_deep_copy(config.deep_copy));

        for (index, store) in config.stores.iter().enumerate() {
            let store_type = store
                .store_type
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .ok_or(ContractError::MissingStoreType { index })?;
            debug!(store_type = ?store_type, index, "adding store");

            let rule = TagRule::from_filter(store.filter.as_ref());
            let destination = registry.create(index, store)?;
            coordinator.add_route(destination, rule);
        }

        info!(
            destinations = coordinator.len(),
            copy_mode = ?coordinator.copy_mode,
            "Coordinator configured"
        );
        Ok(coordinator)
    }

    /// Append a destination with an already compiled rule
    pub fn add_route(&mut self, destination: Box<dyn Destination>, rule: TagRule) {
        self.routes.push(Route::new(destination, rule));
    }

    /// Append a destination, compiling its optional filter block
    pub fn with_destination<D>(mut self, destination: D, filter: Option<&TagFilter>) -> Self
    where
        D: Destination + 'static,
    {
        self.add_route(Box::new(destination), TagRule::from_filter(filter));
        self
    }

    pub fn copy_mode(&self) -> CopyMode {
        self.copy_mode
    }

    pub fn set_copy_mode(&mut self, copy_mode: CopyMode) {
        self.copy_mode = copy_mode;
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Fan one batch out to every destination
    ///
    /// A streaming batch is drained first; a source failure is returned
    /// before any destination runs. Errors raised by a destination or by
    /// `terminal` are returned unchanged.
    #[instrument(name = "coordinator_emit", skip(self, batch, terminal), fields(tag = %tag))]
    pub fn emit(
        &self,
        tag: &str,
        batch: impl Into<EventBatch>,
        terminal: &mut dyn OutputChain,
    ) -> Result<(), ContractError> {
        let batch = batch.into().ensure_repeatable()?;
        observability::record_batch_received(batch.len());

        let mut chain = DispatchChain::new(&self.routes, tag, batch, self.copy_mode, terminal);
        let result = chain.advance();

        match &result {
            Ok(()) if !chain.is_exhausted() => {
                debug!(
                    reached = chain.offset(),
                    destinations = self.routes.len(),
                    "Destination did not continue the chain"
                );
                observability::record_chain_truncated();
            }
            Ok(()) => {}
            Err(e) => {
                warn!(step = chain.offset(), error = %e, "Emit failed");
                observability::record_emit_failure();
            }
        }
        result
    }

    /// Flush every destination in order
    ///
    /// Stops at the first failing destination.
    #[instrument(name = "coordinator_flush", skip(self))]
    pub fn flush(&self) -> Result<(), ContractError> {
        for route in &self.routes {
            route.destination().flush()?;
        }
        Ok(())
    }

    /// Get metrics for all destinations
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.routes
            .iter()
            .map(|r| (r.name().to_string(), r.metrics().snapshot()))
            .collect()
    }
}
