//! DestinationRegistry - maps store types to destination factories

use std::collections::HashMap;
use std::fmt;

use tracing::instrument;

use contracts::{ContractError, Destination, StoreConfig};

use crate::destinations::{
    FileDestination, LogDestination, MemoryDestination, NetworkDestination, NullDestination,
    StdoutDestination,
};
use crate::error::DispatcherError;

/// Builds a destination from its display name and store block
pub type DestinationFactory =
    Box<dyn Fn(&str, &StoreConfig) -> Result<Box<dyn Destination>, ContractError>>;

/// Store type -> factory
#[derive(Default)]
pub struct DestinationRegistry {
    factories: HashMap<String, DestinationFactory>,
}

impl DestinationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `null`, `log`, `stdout`, `file`, `network` and `memory`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("null", |name, _| Ok(Box::new(NullDestination::new(name))))
            .register("log", |name, _| Ok(Box::new(LogDestination::new(name))))
            .register("stdout", |name, store| {
                Ok(Box::new(StdoutDestination::from_params(name, &store.params)?))
            })
            .register("file", |name, store| {
                Ok(Box::new(FileDestination::from_params(name, &store.params)?))
            })
            .register("network", |name, store| {
                Ok(Box::new(NetworkDestination::from_params(name, &store.params)?))
            })
            .register("memory", |name, _| Ok(Box::new(MemoryDestination::new(name))));
        registry
    }

    /// Register (or replace) the factory for `store_type`
    pub fn register<F>(&mut self, store_type: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&str, &StoreConfig) -> Result<Box<dyn Destination>, ContractError> + 'static,
    {
        self.factories.insert(store_type.into(), Box::new(factory));
        self
    }

    /// Registered store types, sorted
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<_> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn contains(&self, store_type: &str) -> bool {
        self.factories.contains_key(store_type)
    }

    /// Instantiate the destination for the store at `index`
    #[instrument(
        name = "registry_create_destination",
        skip(self, store),
        fields(store_type = ?store.store_type)
    )]
    pub fn create(
        &self,
        index: usize,
        store: &StoreConfig,
    ) -> Result<Box<dyn Destination>, DispatcherError> {
        let store_type = store
            .store_type
            .as_deref()
            .ok_or(ContractError::MissingStoreType { index })?;
        let factory =
            self.factories
                .get(store_type)
                .ok_or_else(|| DispatcherError::UnknownDestinationType {
                    index,
                    store_type: store_type.to_string(),
                })?;

        let name = store.display_name(index);
        factory(&name, store).map_err(|e| DispatcherError::destination_creation(&name, e.to_string()))
    }
}

impl fmt::Debug for DestinationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationRegistry")
            .field("types", &self.types())
            .finish()
    }
}
