//! uniqip: distinct-IPv4 counting over very large line-oriented files
//!
//! - `parse`: allocation-free dotted-quad parser
//! - `bitset`: lock-free two-level membership bitmap with a unique counter
//! - `processor`: shard planner, parallel scanners, progress reporting
//!
//! The binary wires these to a clap CLI and a signal handler; everything
//! else lives here so the engine is testable end to end.

pub mod bitset;
pub mod cli;
pub mod error;
pub mod parse;
pub mod processor;

pub use error::{CounterError, Result};
