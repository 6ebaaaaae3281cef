//! # Contracts
//!
//! Frozen interface contracts, defining the data structures and traits shared
//! by the fan-out stage. All business crates can only depend on this crate,
//! reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Event time is an integer number of seconds since the Unix epoch
//! - Ordering inside a batch is preserved end to end

mod batch;
mod config;
mod destination;
mod error;
mod event;

pub use batch::*;
pub use config::*;
pub use destination::*;
pub use error::*;
pub use event::*;
