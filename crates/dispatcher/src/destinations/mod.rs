//! Destination implementations
//!
//! Contains NullDestination, LogDestination, StdoutDestination,
//! FileDestination, NetworkDestination and MemoryDestination.

mod file;
mod line;
mod log;
mod memory;
mod network;
mod null;
mod stdout;

pub use self::file::{FileDestination, FileDestinationConfig};
pub use self::line::TimeFormat;
pub use self::log::LogDestination;
pub use self::memory::{Emission, MemoryDestination, MemoryRecorder};
pub use self::network::{NetworkDestination, NetworkDestinationConfig, NetworkFormat};
pub use self::null::NullDestination;
pub use self::stdout::StdoutDestination;
