//! # Dispatcher
//!
//! Tag-rewriting fan-out stage.
//!
//! Responsibilities:
//! - Compile per-destination filter blocks into `TagRule`s
//! - Turn each incoming batch into a repeatable one
//! - Run it through a `DispatchChain`, sharing or deep-copying the records
//! - Hand control to the terminal continuation once every destination ran

pub mod chain;
pub mod coordinator;
pub mod destinations;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod route;
pub mod tag_rule;

pub use chain::{ChainState, CopyMode, DispatchChain};
pub use contracts::{Destination, OutputChain};
pub use coordinator::Coordinator;
pub use destinations::{
    FileDestination, LogDestination, MemoryDestination, MemoryRecorder, NetworkDestination,
    NullDestination, StdoutDestination, TimeFormat,
};
pub use error::DispatcherError;
pub use metrics::{DestinationMetrics, MetricsSnapshot};
pub use registry::{DestinationFactory, DestinationRegistry};
pub use route::Route;
pub use tag_rule::TagRule;
