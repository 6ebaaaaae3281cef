//! Batch pipeline: JSON-line input -> coordinator -> run statistics.

mod input;
mod stats;

pub use input::JsonLineReader;
pub use stats::RunStats;
